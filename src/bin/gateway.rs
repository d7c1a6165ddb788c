//! Headless gateway: serves `/api/auth` and `/api/sendMessages` without the GTK frontend.

use whatzapp::config::{GatewayConfig, Settings};
use whatzapp::error::ServeError;

#[tokio::main]
async fn main() -> Result<(), ServeError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load()?;
    let config = GatewayConfig::from_settings(&settings)?;
    whatzapp::gateway::run(config).await
}
