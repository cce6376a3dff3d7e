//! Integration tests for the sampling and reporting cycles
//!
//! Drive `Sampler` and `Reporter` against mock hardware and check what
//! reaches the pins, the display and the shadow sink.

mod common;

use aqmon_core::{
    ArmController, ArmEvent, ArmedFlag, Calibration, MonitorConfig, Pollutant, Sampler, Samples, Severity,
    ShadowParam,
};

use common::{reporter, reporter_with, MockPin, NoDelay, Recorded, ScriptedAdc};

fn fill(samples: &Samples, co: &[f32], pm25: &[f32]) {
    for &value in co {
        samples.record_co(value, 2.5);
    }
    for &value in pm25 {
        samples.record_pm25(value);
    }
}

#[test]
fn moderate_pm_drives_dim_led() {
    let (mut reporter, pwm, buzzer) = reporter();
    let samples = Samples::new();
    fill(&samples, &[2.0, 3.0, 4.0, 5.0, 6.0], &[40.0]);

    let cycle = reporter.report(&samples, true, 1000).expect("samples present");

    assert_eq!(cycle.assessment.co_ppm, 4.0);
    assert_eq!(cycle.assessment.co, Severity::Good);
    assert_eq!(cycle.assessment.co_status(), "CO tốt.");
    assert_eq!(cycle.assessment.pm25, Severity::Moderate);
    assert_eq!(cycle.assessment.pm25_status(), "PM2.5 trung bình.");
    assert_eq!(cycle.assessment.danger, Severity::Moderate);
    assert_eq!(cycle.assessment.worst, Pollutant::Pm25);
    assert_eq!(cycle.decision.duty, 31);
    assert!(!cycle.decision.buzz);
    assert!(!cycle.decision.raise_alert);
    assert!(cycle.pushed);

    assert_eq!(pwm.duty(), 31);
    assert!(!buzzer.is_high());

    let sink = reporter.sink();
    assert!(sink.alerts.is_empty());
    assert_eq!(sink.last(ShadowParam::Power), Some(&Recorded::Bool(true)));
    assert_eq!(sink.last(ShadowParam::CoPpm), Some(&Recorded::Float(4.0)));
    assert_eq!(sink.last(ShadowParam::Ratio), Some(&Recorded::Float(2.5)));
    assert_eq!(
        sink.last(ShadowParam::MostPolluted),
        Some(&Recorded::Str("PM2.5".to_string()))
    );
    assert_eq!(
        sink.last(ShadowParam::CoStatus),
        Some(&Recorded::Str("CO tốt.".to_string()))
    );

    assert_eq!(reporter.display().row(0), "CO: 4.00        ");
    assert_eq!(reporter.display().row(1), "PM2.5: 40.000   ");
}

#[test]
fn nothing_happens_before_first_sample() {
    let (mut reporter, pwm, buzzer) = reporter();
    let samples = Samples::new();
    samples.record_pm25(500.0);

    assert!(reporter.report(&samples, true, 0).is_none());
    assert!(reporter.sink().updates.is_empty());
    assert_eq!(reporter.display().row(0), "");
    assert_eq!(pwm.duty(), 0);
    assert!(!buzzer.is_high());
}

#[test]
fn disarmed_outputs_stay_off() {
    let (mut reporter, pwm, buzzer) = reporter();
    let samples = Samples::new();
    fill(&samples, &[40.0], &[400.0]);

    for now in [0, 1000, 6000] {
        let cycle = reporter.report(&samples, false, now).expect("samples present");
        assert_eq!(cycle.assessment.danger, Severity::Hazardous);
        assert_eq!(cycle.decision.duty, 0);
    }

    assert_eq!(pwm.duty(), 0);
    assert_eq!(buzzer.rises(), 0);
    assert!(reporter.sink().alerts.is_empty());
    assert_eq!(
        reporter.sink().last(ShadowParam::Power),
        Some(&Recorded::Bool(false))
    );
}

#[test]
fn sustained_danger_alerts_once_per_cooldown() {
    let (mut reporter, pwm, _) = reporter();
    let samples = Samples::new();
    fill(&samples, &[13.0], &[10.0]);

    for second in 0..=10u64 {
        reporter.report(&samples, true, second * 1000);
    }

    // t = 0, 5000, 10000
    let alerts = &reporter.sink().alerts;
    assert_eq!(alerts.len(), 3);
    assert!(alerts[0].contains("CO xấu. Cẩn thận!"));
    assert_eq!(pwm.duty(), 63);
}

#[test]
fn buzzer_pulse_ends_on_time() {
    let (mut reporter, _, buzzer) = reporter();
    let samples = Samples::new();
    fill(&samples, &[20.0], &[0.0]);

    let cycle = reporter.report(&samples, true, 0).expect("samples present");
    assert!(cycle.buzzer_started);
    assert!(buzzer.is_high());

    assert!(!reporter.poll_buzzer(450));
    assert!(buzzer.is_high());
    assert!(reporter.poll_buzzer(500));
    assert!(!buzzer.is_high());
    assert!(!reporter.poll_buzzer(550));

    // Still dangerous on the next cycle: a fresh pulse
    let cycle = reporter.report(&samples, true, 1000).expect("samples present");
    assert!(cycle.buzzer_started);
    assert_eq!(buzzer.rises(), 2);
}

#[test]
fn retrigger_during_pulse_is_ignored() {
    let config = MonitorConfig::default()
        .with_buzzer_pulse_ms(1500)
        .with_report_interval_ms(1000);
    let (mut reporter, _, buzzer) = reporter_with(config);
    let samples = Samples::new();
    fill(&samples, &[20.0], &[0.0]);

    assert!(reporter.report(&samples, true, 0).unwrap().buzzer_started);
    assert!(!reporter.report(&samples, true, 1000).unwrap().buzzer_started);
    assert_eq!(buzzer.rises(), 1);

    // The pulse still ends at its original deadline
    assert!(reporter.poll_buzzer(1500));
}

#[test]
fn disarming_silences_and_rearming_alerts_again() {
    let (mut reporter, pwm, buzzer) = reporter();
    let samples = Samples::new();
    fill(&samples, &[13.0], &[0.0]);

    reporter.report(&samples, true, 0);
    assert!(buzzer.is_high());
    assert_eq!(reporter.sink().alerts.len(), 1);

    reporter.report(&samples, false, 100);
    assert!(!buzzer.is_high());
    assert_eq!(pwm.duty(), 0);
    assert!(!reporter.buzzer_sounding());

    // Well inside the cooldown, but danger is entered afresh
    reporter.report(&samples, true, 200);
    assert_eq!(reporter.sink().alerts.len(), 2);
}

#[test]
fn unchanged_report_is_suppressed() {
    let (mut reporter, _, _) = reporter();
    let samples = Samples::new();
    fill(&samples, &[4.0], &[40.0]);

    assert!(reporter.report(&samples, true, 0).unwrap().pushed);
    assert!(!reporter.report(&samples, true, 1000).unwrap().pushed);

    let sink = reporter.sink();
    assert_eq!(sink.count(ShadowParam::Power), 2);
    assert_eq!(sink.count(ShadowParam::CoPpm), 1);
    assert_eq!(sink.count(ShadowParam::Pm25Status), 1);

    // A ratio move alone is enough
    samples.record_co(4.0, 2.6);
    assert!(reporter.report(&samples, true, 2000).unwrap().pushed);
}

#[test]
fn dead_channel_reads_zero() {
    let led = MockPin::default();
    let mut sampler = Sampler::new(
        ScriptedAdc::constant(0),
        ScriptedAdc::constant(0),
        led.clone(),
        NoDelay::default(),
    );

    let calibration = sampler.calibrate();
    assert!(!calibration.is_calibrated());

    let samples = Samples::new();
    let reading = sampler.sample(&samples);
    assert_eq!(reading.co.ppm, 0.0);
    assert_eq!(reading.co.ratio, 0.0);
    assert_eq!(reading.pm25, 0.0);
    assert_eq!(samples.co.average(), 0.0);
    assert_eq!(samples.co.len(), 1);

    let (mut reporter, _, _) = reporter();
    let cycle = reporter.report(&samples, true, 0).expect("samples present");
    assert_eq!(cycle.assessment.danger, Severity::Good);
}

#[test]
fn saturated_gas_sensor_alarms() {
    let mut sampler = Sampler::new(
        ScriptedAdc::constant(4095),
        ScriptedAdc::constant(0),
        MockPin::default(),
        NoDelay::default(),
    )
    .with_calibration(Calibration::from_raw(2048));

    let samples = Samples::new();
    let reading = sampler.sample(&samples);
    assert_eq!(reading.co.ratio, 0.0);
    assert!(reading.co.ppm.is_infinite());

    let (mut reporter, pwm, buzzer) = reporter();
    let cycle = reporter.report(&samples, true, 0).expect("samples present");

    assert_eq!(cycle.assessment.co, Severity::Hazardous);
    assert_eq!(cycle.assessment.worst, Pollutant::Co);
    assert!(cycle.decision.raise_alert);
    assert_eq!(pwm.duty(), 255);
    assert!(buzzer.is_high());
    assert_eq!(reporter.sink().alerts.len(), 1);
}

#[test]
fn sampler_reads_both_sensors() {
    let gas = ScriptedAdc::constant(2048);
    let gas_reads = gas.reads();
    let dust = ScriptedAdc::constant(620);
    let dust_reads = dust.reads();
    let led = MockPin::default();
    let delay = NoDelay::default();

    let mut sampler = Sampler::new(gas, dust, led.clone(), delay.clone());
    sampler.calibrate();
    assert_eq!(gas_reads.get(), 50);

    let samples = Samples::new();
    let reading = sampler.sample(&samples);

    // Same code as calibration: Rs/R0 equals the clean-air ratio
    assert!((reading.co.ratio - 3.0).abs() < 1e-3);
    assert!(reading.co.ppm > 4.0 && reading.co.ppm < 4.5);
    assert!((samples.latest_ratio() - reading.co.ratio).abs() < f32::EPSILON);

    // 620 / 4095 * 3.3 V ≈ 0.4996 V → ≈ 84.9 µg/m³
    assert!((reading.pm25 - 84.9).abs() < 0.2);
    assert_eq!(gas_reads.get(), 60);
    assert_eq!(dust_reads.get(), 10);

    // LED lit for the burst only
    assert_eq!(led.rises(), 1);
    assert!(!led.is_high());
    assert!(delay.total_ns() > 0);
}

#[test]
fn button_arms_the_reporter() {
    let flag = ArmedFlag::new(false);
    let mode_led = MockPin::default();
    let mut arm = ArmController::new(mode_led.clone(), &flag, &MonitorConfig::default());
    let (mut reporter, pwm, _) = reporter();
    let samples = Samples::new();
    fill(&samples, &[10.0], &[0.0]);

    reporter.report(&samples, flag.is_armed(), 0);
    assert_eq!(pwm.duty(), 0);

    arm.handle(ArmEvent::toggle(100), &flag);
    arm.handle(ArmEvent::toggle(120), &flag);
    assert!(flag.is_armed());
    assert!(mode_led.is_high());

    reporter.report(&samples, flag.is_armed(), 1000);
    assert_eq!(pwm.duty(), 31);
    assert_eq!(
        reporter.sink().last(ShadowParam::Power),
        Some(&Recorded::Bool(true))
    );
}

#[test]
fn banner_replaces_display() {
    let (mut reporter, _, _) = reporter();
    reporter.show_banner("Calibrating...");

    assert_eq!(reporter.display().clears, 1);
    assert_eq!(reporter.display().row(0), "Calibrating...");
    assert_eq!(reporter.display().row(1), "");
}
