//! Cloud shadow sinks
//!
//! [`MqttShadow`] mirrors parameters to a broker; [`LogShadow`] only logs
//! them. Both are fire and forget, so a slow or absent broker never stalls
//! the reporting cycle.

use aqmon_core::{ShadowParam, ShadowSink, ShadowValue};
use serde_json::{json, Value};

/// Topic names for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub local: String,
    pub alert: String,
    pub remote: String,
}

impl Topics {
    pub fn new(node_id: &str) -> Self {
        Self {
            local: format!("node/{}/params/local", node_id),
            alert: format!("node/{}/alert", node_id),
            remote: format!("node/{}/params/remote", node_id),
        }
    }
}

fn value_json(value: ShadowValue<'_>) -> Value {
    match value {
        ShadowValue::Float(v) => json!(v),
        ShadowValue::Bool(v) => json!(v),
        ShadowValue::Str(v) => json!(v),
    }
}

/// `{"<param>": value}`
pub fn param_payload(param: ShadowParam, value: ShadowValue<'_>) -> Vec<u8> {
    json!({ (param.key()): value_json(value) }).to_string().into_bytes()
}

/// `{"alert": "<message>"}`
pub fn alert_payload(message: &str) -> Vec<u8> {
    json!({ "alert": message }).to_string().into_bytes()
}

/// Armed value from a remote parameter write, if it carries one
///
/// Other parameters in the same document are ignored.
pub fn parse_remote(payload: &[u8]) -> Option<bool> {
    let document: Value = serde_json::from_slice(payload).ok()?;
    document.get(ShadowParam::Power.key())?.as_bool()
}

/// Sink that only writes to the log
#[derive(Debug, Default)]
pub struct LogShadow {
    pub updates: u64,
    pub alerts: u64,
}

impl ShadowSink for LogShadow {
    fn update(&mut self, param: ShadowParam, value: ShadowValue<'_>) {
        self.updates += 1;
        log::debug!("shadow {} = {}", param.key(), value_json(value));
    }

    fn raise_alert(&mut self, message: &str) {
        self.alerts += 1;
        log::warn!("ALERT: {}", message);
    }
}

#[cfg(feature = "mqtt")]
pub use mqtt::MqttShadow;

#[cfg(feature = "mqtt")]
mod mqtt {
    use std::time::Duration;

    use aqmon_core::time::TimeSource;
    use aqmon_core::{ArmEvent, ShadowParam, ShadowSink, ShadowValue};
    use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
    use tokio::sync::mpsc;

    use super::{alert_payload, param_payload, parse_remote, Topics};
    use crate::config::MqttSettings;
    use crate::NodeResult;

    /// Requests the client may hold before `try_publish` starts dropping
    const CLIENT_QUEUE: usize = 32;

    /// Pause after a connection error before polling again
    const RECONNECT_DELAY: Duration = Duration::from_secs(2);

    /// Sink publishing to an MQTT broker
    pub struct MqttShadow {
        client: AsyncClient,
        topics: Topics,
        dropped: u64,
    }

    impl MqttShadow {
        /// Create the client; the returned event loop must be driven with
        /// [`drive`] for anything to reach the broker
        pub fn connect(settings: &MqttSettings) -> (Self, EventLoop) {
            let mut options = MqttOptions::new(&settings.node_id, &settings.host, settings.port);
            options.set_keep_alive(Duration::from_secs(settings.keep_alive_secs));

            let (client, eventloop) = AsyncClient::new(options, CLIENT_QUEUE);
            let shadow = Self {
                client,
                topics: Topics::new(&settings.node_id),
                dropped: 0,
            };
            (shadow, eventloop)
        }

        /// Subscribe to remote parameter writes
        pub async fn subscribe_remote(&self) -> NodeResult<()> {
            self.client
                .subscribe(&self.topics.remote, QoS::AtLeastOnce)
                .await?;
            Ok(())
        }

        pub fn topics(&self) -> &Topics {
            &self.topics
        }

        /// Publishes lost to a full client queue
        pub fn dropped(&self) -> u64 {
            self.dropped
        }

        fn publish(&mut self, topic: &str, payload: Vec<u8>) {
            if let Err(e) = self.client.try_publish(topic, QoS::AtMostOnce, false, payload) {
                self.dropped += 1;
                log::warn!("MQTT publish to {} dropped: {}", topic, e);
            }
        }
    }

    impl ShadowSink for MqttShadow {
        fn update(&mut self, param: ShadowParam, value: ShadowValue<'_>) {
            let topic = self.topics.local.clone();
            self.publish(&topic, param_payload(param, value));
        }

        fn raise_alert(&mut self, message: &str) {
            let topic = self.topics.alert.clone();
            self.publish(&topic, alert_payload(message));
        }
    }

    /// Run the client event loop forever, forwarding remote power writes as
    /// arm events
    pub async fn drive<T: TimeSource>(
        mut eventloop: EventLoop,
        remote_topic: String,
        arm_events: mpsc::Sender<ArmEvent>,
        clock: T,
    ) {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == remote_topic => {
                    match parse_remote(&publish.payload) {
                        Some(armed) => {
                            if arm_events.try_send(ArmEvent::set(armed, clock.now())).is_err() {
                                log::warn!("Arm queue full, remote write dropped");
                            }
                        }
                        None => log::debug!("Remote write without power ignored"),
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => log::info!("MQTT connected"),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("MQTT connection error: {}", e);
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}

#[cfg(feature = "mqtt")]
pub use mqtt::drive as drive_mqtt;

/// The sink the node actually reports to
pub enum NodeShadow {
    Log(LogShadow),
    #[cfg(feature = "mqtt")]
    Mqtt(MqttShadow),
}

impl ShadowSink for NodeShadow {
    fn update(&mut self, param: ShadowParam, value: ShadowValue<'_>) {
        match self {
            NodeShadow::Log(sink) => sink.update(param, value),
            #[cfg(feature = "mqtt")]
            NodeShadow::Mqtt(sink) => sink.update(param, value),
        }
    }

    fn raise_alert(&mut self, message: &str) {
        match self {
            NodeShadow::Log(sink) => sink.raise_alert(message),
            #[cfg(feature = "mqtt")]
            NodeShadow::Mqtt(sink) => {
                log::warn!("ALERT: {}", message);
                sink.raise_alert(message)
            }
        }
    }
}
