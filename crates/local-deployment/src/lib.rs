use std::path::Path;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentConfig, DeploymentError};
use services::services::{
    activity::{ActivityLogService, ActivityLogger},
    health::HealthService,
};
use tracing::{info, warn};

/// Single-process deployment backed by a local SQLite file
#[derive(Clone)]
pub struct LocalDeployment {
    config: DeploymentConfig,
    db: DBService,
    activity: ActivityLogger,
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = DeploymentConfig::from_env()?;
        ensure_database_dir(&config.database_url)?;

        let db = DBService::new(&config.database_url).await?;
        match HealthService::check(&db.pool).await {
            Ok(report) if report.is_ok() => info!("{}", report.summary()),
            Ok(report) => warn!("{}", report.summary()),
            Err(e) => warn!("Database health check failed: {}", e),
        }

        Ok(Self::from_parts(config, db))
    }

    fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn activity(&self) -> &ActivityLogger {
        &self.activity
    }
}

impl LocalDeployment {
    /// Wire an already opened database; spawns the activity writer, so a Tokio
    /// runtime must be running
    pub fn from_parts(config: DeploymentConfig, db: DBService) -> Self {
        let (activity, _writer) = ActivityLogService::spawn(db.clone());
        Self {
            config,
            db,
            activity,
        }
    }

    /// Fresh in-memory deployment with default settings
    pub async fn in_memory() -> Result<Self, DeploymentError> {
        let db = DBService::new_in_memory().await?;
        let config = DeploymentConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "sqlite::memory:".to_string())
        })?;
        Ok(Self::from_parts(config, db))
    }
}

/// Create the parent directory of a file-backed SQLite URL
fn ensure_database_dir(database_url: &str) -> Result<(), DeploymentError> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use db::models::activity_log::{ActivityLog, ActivityLogFilter};

    use super::*;

    #[test]
    fn creates_parent_dir_for_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("slp.sqlite");
        ensure_database_dir(&format!("sqlite://{}?mode=rwc", db_path.display())).unwrap();
        assert!(dir.path().join("nested").is_dir());

        ensure_database_dir("sqlite::memory:").unwrap();
    }

    #[tokio::test]
    async fn activity_bursts_are_not_dropped() {
        let deployment = LocalDeployment::in_memory().await.unwrap();
        for _ in 0..400 {
            deployment.log_activity("view", "ratings", None, serde_json::Value::Null);
        }

        let filter = ActivityLogFilter {
            action: None,
            resource: Some("ratings".to_string()),
            limit: 1000,
        };
        let mut logged = 0;
        for _ in 0..200 {
            logged = ActivityLog::find_filtered(&deployment.db().pool, &filter)
                .await
                .unwrap()
                .len();
            if logged == 400 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        assert_eq!(logged, 400);
    }
}
