//! HTTP gateways the UI talks to: `GET /api/auth` and `POST /api/sendMessages`.

pub mod crm;
pub mod messaging;

use axum::Router;
use axum::routing::{get, post};
use reqwest::Client as HttpClient;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::error::ServeError;

pub use crm::CrmGateway;
pub use messaging::MessagingGateway;

/// Shared by every request. Holds only immutable configuration and the connection pool.
#[derive(Clone)]
pub struct GatewayState {
    pub crm: CrmGateway,
    pub messaging: MessagingGateway,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig) -> Self {
        let http = HttpClient::new();
        Self {
            crm: CrmGateway::new(http.clone(), config.crm.clone()),
            messaging: MessagingGateway::new(http, config.messaging.clone()),
        }
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/auth", get(crm::leads))
        .route("/api/sendMessages", post(messaging::send_message))
        .with_state(state)
}

/// Serves the gateways on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: GatewayState, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run(config: GatewayConfig) -> Result<(), ServeError> {
    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.listen,
            source,
        })?;
    log::info!("gateway listening on {}", listener.local_addr()?);
    serve(listener, GatewayState::new(&config), shutdown_signal()).await
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("gateway shutting down");
}
