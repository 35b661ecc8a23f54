use std::str::FromStr;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Crates whose events are shown at the requested level.
const TARGETS: [&str; 5] = ["yao", "yao_protocol", "garble_core", "ot_core", "yao_circuits"];

pub fn init_tracing(level: &str) -> Result<()> {
    let level = Level::from_str(level)?;
    let directives = TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter_layer = EnvFilter::builder().parse(directives)?;

    Registry::default()
        .with(filter_layer)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
