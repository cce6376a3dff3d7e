//! Bootstrap and the periodic cycles
//!
//! Startup order matters: the reporting cycle must never run against an
//! uncalibrated sensor, so calibration finishes before any cycle starts.
//!
//! 1. "Calibrating..." banner, 2 s warm-up
//! 2. Clean-air calibration (blocking, on the blocking pool)
//! 3. "System ready" banner for 1 s
//! 4. Arm consumer, stdin button, sampling thread, reporting task
//!
//! The sampler gets its own OS thread because every pass sleeps through
//! its read bursts. So does the stdin button: a blocking read cannot be
//! cancelled, and on the runtime's blocking pool it would hold shutdown
//! until the next Enter. Reporting and arm handling are tokio tasks.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use aqmon_core::constants::buffers::ARM_QUEUE_CAPACITY;
use aqmon_core::constants::time::{
    BUZZER_POLL_INTERVAL_MS, CALIBRATION_WARMUP_MS, READY_BANNER_MS,
};
use aqmon_core::time::{MonotonicTime, TimeSource};
use aqmon_core::{
    ArmCommand, ArmController, ArmEvent, ArmedFlag, Reporter, Sampler, Samples,
};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::NodeConfig;
use crate::shadow::{LogShadow, NodeShadow};
use crate::sim::{LogDisplay, LogPin, LogPwm, SimAdc, StdDelay};
use crate::{NodeError, NodeResult};

/// Rows of the character display
const DISPLAY_ROWS: usize = 2;

pub type NodeSampler = Sampler<SimAdc, SimAdc, LogPin, StdDelay>;
pub type NodeReporter = Reporter<LogPwm, LogPin, LogDisplay, NodeShadow>;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Map one line of stdin to a button action
///
/// An empty line (just Enter) or `t` is a press; `on` / `off` force the
/// state like a remote write.
pub fn parse_button_line(line: &str) -> Option<ArmCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "t" | "toggle" => Some(ArmCommand::Toggle),
        "on" => Some(ArmCommand::Set(true)),
        "off" => Some(ArmCommand::Set(false)),
        _ => None,
    }
}

/// Run the node until Ctrl-C
pub async fn run(config: NodeConfig) -> NodeResult<()> {
    config.validate()?;

    let clock = MonotonicTime::new();
    let monitor = config.monitor.clone();
    let samples = Arc::new(Samples::new());
    let armed = Arc::new(ArmedFlag::new(false));
    let (arm_tx, arm_rx) = mpsc::channel(ARM_QUEUE_CAPACITY);

    let shadow = build_shadow(&config, arm_tx.clone(), clock.clone()).await?;
    let mut reporter = Reporter::new(
        monitor.clone(),
        LogPwm::new("alert LED"),
        LogPin::new("buzzer"),
        LogDisplay::new(DISPLAY_ROWS, monitor.display_columns),
        shadow,
    )?;
    let mut sampler = Sampler::new(
        SimAdc::new(config.sim.co_raw, config.sim.jitter, 0x5EED_0001),
        SimAdc::new(config.sim.dust_raw, config.sim.jitter, 0x5EED_0002),
        LogPin::new("dust LED").quiet(),
        StdDelay,
    );

    reporter.show_banner("Calibrating...");
    tokio::time::sleep(ms(CALIBRATION_WARMUP_MS)).await;

    let sampler = tokio::task::spawn_blocking(move || {
        sampler.calibrate();
        sampler
    })
    .await?;
    if let Err(e) = sampler.calibration().check() {
        log::warn!("{}; continuing with CO at 0 ppm", e);
    }

    reporter.show_banner("System ready");
    tokio::time::sleep(ms(READY_BANNER_MS)).await;

    let arm = ArmController::new(LogPin::new("mode LED"), &armed, &monitor);
    tokio::spawn(consume_arm_events(arm, arm_rx, armed.clone()));
    // Detached: the thread ends with the process
    spawn_button(arm_tx, clock.clone())?;

    let stop = Arc::new(AtomicBool::new(false));
    let sampling = spawn_sampler(sampler, samples.clone(), monitor.sample_interval_ms, stop.clone())?;
    let reporting = tokio::spawn(report_loop(
        reporter,
        samples,
        armed,
        clock,
        monitor.report_interval_ms,
    ));

    log::info!("Monitor running (Enter toggles alert mode, 'on'/'off' set it, Ctrl-C quits)");

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C: {}", e);
    }
    log::info!("Shutting down");

    reporting.abort();
    stop.store(true, Ordering::Relaxed);
    let joined = tokio::task::spawn_blocking(move || sampling.join()).await?;
    if joined.is_err() {
        log::error!("Sampler thread panicked");
    }

    Ok(())
}

#[cfg(feature = "mqtt")]
async fn build_shadow(
    config: &NodeConfig,
    arm_tx: mpsc::Sender<ArmEvent>,
    clock: MonotonicTime,
) -> NodeResult<NodeShadow> {
    use crate::shadow::{drive_mqtt, MqttShadow};

    let Some(settings) = &config.mqtt else {
        log::info!("No MQTT broker configured, shadow updates go to the log");
        return Ok(NodeShadow::Log(LogShadow::default()));
    };

    let (shadow, eventloop) = MqttShadow::connect(settings);
    shadow.subscribe_remote().await?;
    tokio::spawn(drive_mqtt(eventloop, shadow.topics().remote.clone(), arm_tx, clock));

    log::info!(
        "Reporting to {}:{} as {}",
        settings.host,
        settings.port,
        settings.node_id
    );
    Ok(NodeShadow::Mqtt(shadow))
}

#[cfg(not(feature = "mqtt"))]
async fn build_shadow(
    config: &NodeConfig,
    _arm_tx: mpsc::Sender<ArmEvent>,
    _clock: MonotonicTime,
) -> NodeResult<NodeShadow> {
    if config.mqtt.is_some() {
        log::warn!("MQTT configured but support not compiled in, shadow updates go to the log");
    }
    Ok(NodeShadow::Log(LogShadow::default()))
}

/// Single writer of the armed flag
async fn consume_arm_events(
    mut arm: ArmController<LogPin>,
    mut events: mpsc::Receiver<ArmEvent>,
    flag: Arc<ArmedFlag>,
) {
    while let Some(event) = events.recv().await {
        arm.handle(event, &flag);
    }
}

fn spawn_button(events: mpsc::Sender<ArmEvent>, clock: MonotonicTime) -> NodeResult<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("button".into())
        .spawn(move || forward_button_lines(std::io::stdin().lock(), &events, &clock))
        .map_err(NodeError::Thread)
}

/// Turn input lines into arm events until the input closes
fn forward_button_lines<R: BufRead, T: TimeSource>(
    input: R,
    events: &mpsc::Sender<ArmEvent>,
    clock: &T,
) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("stdin read failed, button disabled: {}", e);
                return;
            }
        };

        let Some(command) = parse_button_line(&line) else {
            log::warn!("Unknown input {:?} (Enter toggles, 'on'/'off' set)", line);
            continue;
        };

        let event = ArmEvent {
            command,
            at: clock.now(),
        };
        if events.try_send(event).is_err() {
            log::warn!("Arm queue full, button press dropped");
        }
    }

    log::info!("stdin closed, button disabled");
}

fn spawn_sampler(
    mut sampler: NodeSampler,
    samples: Arc<Samples>,
    interval_ms: u64,
    stop: Arc<AtomicBool>,
) -> NodeResult<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("sampler".into())
        .spawn(move || {
            let period = ms(interval_ms);
            while !stop.load(Ordering::Relaxed) {
                let started = Instant::now();
                sampler.sample(&samples);
                if let Some(rest) = period.checked_sub(started.elapsed()) {
                    std::thread::sleep(rest);
                }
            }
        })
        .map_err(NodeError::Thread)
}

async fn report_loop<T: TimeSource>(
    mut reporter: NodeReporter,
    samples: Arc<Samples>,
    armed: Arc<ArmedFlag>,
    clock: T,
    report_interval_ms: u64,
) {
    let mut report_tick = interval(ms(report_interval_ms));
    report_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut buzzer_tick = interval(ms(BUZZER_POLL_INTERVAL_MS));
    buzzer_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = report_tick.tick() => {
                let Some(cycle) = reporter.report(&samples, armed.is_armed(), clock.now()) else {
                    continue;
                };
                log::info!(
                    "CO {:.2} ppm L{}, PM2.5 {:.3} L{}, danger L{} ({}), LED {}",
                    cycle.assessment.co_ppm,
                    cycle.assessment.co.level(),
                    cycle.assessment.pm25_ug_m3,
                    cycle.assessment.pm25.level(),
                    cycle.assessment.danger.level(),
                    cycle.assessment.worst.label(),
                    cycle.decision.duty,
                );
            }
            _ = buzzer_tick.tick() => {
                reporter.poll_buzzer(clock.now());
            }
        }
    }
}
