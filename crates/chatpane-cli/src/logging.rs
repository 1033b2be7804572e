use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use chatpane_core::WidgetConfig;
use tracing_subscriber::EnvFilter;

/// Sends `tracing` output to `~/.chatpane/chatpane.log`; stdout belongs to the
/// terminal UI. `CHATPANE_LOG` overrides the configured filter.
pub fn init(config: &WidgetConfig) -> Result<()> {
    let path = WidgetConfig::resolve_path("chatpane.log");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env("CHATPANE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
