mod chat;
mod logging;

use std::sync::Arc;

use anyhow::Result;
use chatpane_core::{AnthropicEndpoint, ChatWidget, FileStore, WidgetConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = WidgetConfig::load()?;
    logging::init(&config)?;

    let endpoint = AnthropicEndpoint::from_config(&config)?;
    let widget = ChatWidget::mount(
        &config,
        FileStore::new(&config.store_path),
        Arc::new(endpoint),
    );
    tracing::info!(model = %config.model, "chatpane started");
    chat::run(widget, &config).await
}
