use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use tracing::info;

use crate::domain::DomainError;

use super::handlers::{chat_api, history_api, quit_api, WebState};

pub fn router(state: Arc<WebState>) -> axum::Router {
    axum::Router::new()
        .route("/api/chat", post(chat_api))
        .route("/api/history", get(history_api))
        .route("/api/quit", post(quit_api))
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn serve(state: Arc<WebState>, addr: SocketAddr) -> Result<(), DomainError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chat backend listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down chat backend");
        })
        .await?;

    Ok(())
}
