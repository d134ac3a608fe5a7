//! Environment-independent view of a running dashboard backend.
//!
//! Route handlers only see the [`Deployment`] trait; the concrete wiring lives
//! in the `local-deployment` crate.

use async_trait::async_trait;
use db::DBService;
use serde_json::Value;
use services::services::activity::ActivityLogger;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub mod config;

pub use config::DeploymentConfig;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    /// Build a deployment from the process environment
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &DeploymentConfig;

    fn db(&self) -> &DBService;

    fn activity(&self) -> &ActivityLogger;

    /// Queue an activity entry; never blocks the caller and never fails
    fn log_activity(
        &self,
        action: &str,
        resource: &str,
        resource_id: Option<Uuid>,
        details: Value,
    ) {
        debug!(action, resource, "Queueing activity");
        self.activity().log(action, resource, resource_id, details);
    }
}
