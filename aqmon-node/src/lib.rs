//! Host runtime for the air-quality monitor
//!
//! ## Overview
//!
//! Runs the `aqmon-core` cycles on a regular machine: sensors, pins, PWM and
//! the character display are simulated, the cloud shadow is an MQTT broker
//! (or just the log), and the arm button is stdin.
//!
//! ```text
//!   stdin ──Toggle/Set──┐
//!                       ├──► mpsc(10) ──► ArmController ──► ArmedFlag
//!   MQTT params/remote ─┘                                       │
//!                                                               ▼
//!   sampler thread ──► Samples ──► reporting task ──► LED, buzzer, LCD
//!     (200 ms)                       (1000 ms)    └─► MqttShadow / LogShadow
//! ```
//!
//! ## Topics
//!
//! | Topic                       | Direction | Payload                  |
//! |-----------------------------|-----------|--------------------------|
//! | `node/<id>/params/local`    | out       | `{"<param>": value}`     |
//! | `node/<id>/alert`           | out       | `{"alert": "<message>"}` |
//! | `node/<id>/params/remote`   | in        | `{"power": true}`        |
//!
//! Publishing is fire and forget: a full client queue or a dropped broker
//! connection loses that update and is logged, never retried.

pub mod config;
pub mod runtime;
pub mod shadow;
pub mod sim;

pub use config::{MqttSettings, NodeConfig, SimSettings};
pub use shadow::{LogShadow, NodeShadow, Topics};

#[cfg(feature = "mqtt")]
pub use shadow::MqttShadow;

use aqmon_core::MonitorError;
use thiserror::Error;

/// Runtime errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Cannot read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("Invalid monitor config: {0}")]
    Monitor(#[from] MonitorError),

    #[cfg(feature = "mqtt")]
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Sampler thread could not start: {0}")]
    Thread(#[source] std::io::Error),
}

pub type NodeResult<T> = Result<T, NodeError>;
