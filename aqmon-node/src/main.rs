//! `aqmon-node [config.json]`
//!
//! Verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::Context;
use aqmon_node::{runtime, NodeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = NodeConfig::load(path.as_deref()).context("loading configuration")?;

    log::info!("aqmon-node {} starting", aqmon_core::VERSION);
    runtime::run(config).await.context("monitor runtime")?;

    Ok(())
}
