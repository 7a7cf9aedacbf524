use anyhow::Result;
use tokio::sync::watch;
use std::sync::Arc;
use tracing::info;

use super::routes::create_router;
use super::state::AppState;

pub async fn start_server(state: Arc<AppState>, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
    let bind = state.config.bind.clone();

    let app = create_router()
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Shelfwise API server listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    Ok(())
}

async fn shutdown_signal(mut shutdown_rx: watch::Receiver<bool>) {
    while !*shutdown_rx.borrow() {
        if shutdown_rx.changed().await.is_err() {
            break;
        }
    }
    info!("Shutting down API server...");
}
