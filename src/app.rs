use adw::Application;
use tokio::net::TcpListener;
use whatzapp::api::client::GatewayClient;
use whatzapp::config::{GatewayConfig, Settings};
use whatzapp::error::ServeError;
use whatzapp::gateway::{self, GatewayState};

/// Starts the gateways on the shared runtime so this process serves `/api/*` itself.
/// Binding happens before returning, so the first lead fetch cannot race it.
pub fn start_embedded_gateway(settings: &Settings) -> Result<(), ServeError> {
    let config = GatewayConfig::from_settings(settings)?;
    let listener = crate::runtime::RUNTIME
        .block_on(TcpListener::bind(config.listen))
        .map_err(|source| ServeError::Bind {
            addr: config.listen,
            source,
        })?;
    log::info!("embedded gateway listening on {}", listener.local_addr()?);

    let state = GatewayState::new(&config);
    crate::runtime::spawn(async move {
        if let Err(e) = gateway::serve(listener, state, std::future::pending::<()>()).await {
            log::error!("embedded gateway stopped: {e}");
        }
    });
    Ok(())
}

pub fn build_ui(app: &Application, client: GatewayClient) {
    crate::ui::main_window::show_main_window(app, client);
}
