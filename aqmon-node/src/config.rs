//! Node configuration file
//!
//! One JSON document, every section optional:
//!
//! ```json
//! {
//!   "monitor": { "report_interval_ms": 1000, "alert_cooldown_ms": 5000 },
//!   "mqtt": { "host": "localhost", "port": 1883, "node_id": "aqmon-01" },
//!   "sim": { "co_raw": 2048, "dust_raw": 300, "jitter": 8 }
//! }
//! ```
//!
//! Without an `mqtt` section shadow updates only go to the log.

use std::path::Path;

use aqmon_core::MonitorConfig;
use serde::{Deserialize, Serialize};

use crate::{NodeError, NodeResult};

/// Everything the node reads at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub monitor: MonitorConfig,
    pub mqtt: Option<MqttSettings>,
    pub sim: SimSettings,
}

/// Broker connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Used as client id and in every topic
    pub node_id: String,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive() -> u64 {
    30
}

/// What the simulated sensors report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// MQ-2 raw code; the first reads double as clean-air calibration
    pub co_raw: u16,
    /// GP2Y1010 raw code
    pub dust_raw: u16,
    /// Peak deviation added to every read
    pub jitter: u16,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            co_raw: 2048,
            dust_raw: 300,
            jitter: 8,
        }
    }
}

impl NodeConfig {
    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> NodeResult<Self> {
        let config: NodeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or use the defaults when no path is given
    pub fn load(path: Option<&Path>) -> NodeResult<Self> {
        let Some(path) = path else {
            log::info!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| NodeError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> NodeResult<()> {
        self.monitor.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = NodeConfig::from_json("{}").unwrap();
        assert_eq!(config, NodeConfig::default());
        assert!(config.mqtt.is_none());
        assert_eq!(config.monitor.report_interval_ms, 1000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = NodeConfig::from_json(
            r#"{
                "monitor": { "alert_cooldown_ms": 10000 },
                "mqtt": { "host": "broker.local", "node_id": "kitchen" },
                "sim": { "co_raw": 3000 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.monitor.alert_cooldown_ms, 10000);
        assert_eq!(config.monitor.sample_interval_ms, 200);

        let mqtt = config.mqtt.unwrap();
        assert_eq!(mqtt.port, 1883);
        assert_eq!(mqtt.keep_alive_secs, 30);
        assert_eq!(mqtt.node_id, "kitchen");

        assert_eq!(config.sim.co_raw, 3000);
        assert_eq!(config.sim.jitter, 8);
    }

    #[test]
    fn invalid_monitor_values_are_rejected() {
        let err = NodeConfig::from_json(r#"{ "monitor": { "sample_interval_ms": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, NodeError::Monitor(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = NodeConfig::from_json("{ monitor: }").unwrap_err();
        assert!(matches!(err, NodeError::ConfigJson(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = NodeConfig::load(Some(Path::new("/nonexistent/aqmon.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/aqmon.json"));
    }
}
