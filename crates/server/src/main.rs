use anyhow::Context;
use deployment::Deployment;
use server::{DeploymentImpl, routes};
use tracing::info;
use utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let deployment = DeploymentImpl::new()
        .await
        .context("failed to initialise deployment")?;
    let addr = deployment.config().socket_addr();

    let app = routes::router(deployment);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("SLP dashboard API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
