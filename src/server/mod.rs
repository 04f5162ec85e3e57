//! HTTP front end

pub mod api;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::core::service::NavService;

pub use api::{build_router, ApiDoc};

/// Bind `listen` and serve until the process is stopped
pub async fn run_server(service: Arc<NavService>, listen: &str) -> anyhow::Result<()> {
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!(addr = %listen, "Server listening");
    info!("API docs available at http://{listen}/api-docs/openapi.json");

    axum::serve(listener, app).await?;

    Ok(())
}
