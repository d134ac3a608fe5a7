//! Background writer for the user activity log.
//!
//! Handlers record mutations through [`ActivityLogger`], which never blocks or
//! fails the request; entries are persisted in order by a spawned task. Only a
//! failed insert loses an entry.

use db::{
    DBService,
    models::activity_log::{ActivityLog, ActivityLogFilter, CreateActivityLog},
};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ActivityLogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("action and resource are required")]
    MissingField,
}

/// Cloneable handle that queues activity entries for the background writer
#[derive(Clone)]
pub struct ActivityLogger {
    tx: mpsc::UnboundedSender<CreateActivityLog>,
}

impl ActivityLogger {
    pub fn log(
        &self,
        action: impl Into<String>,
        resource: impl Into<String>,
        resource_id: Option<Uuid>,
        details: Value,
    ) {
        let entry = CreateActivityLog {
            action: action.into(),
            resource: resource.into(),
            resource_id,
            details,
            user_name: None,
        };
        if let Err(e) = self.tx.send(entry) {
            warn!(action = %e.0.action, "Activity log writer has stopped; entry dropped");
        }
    }
}

/// Background service that drains queued entries into the activity_logs table
pub struct ActivityLogService {
    db: DBService,
    rx: mpsc::UnboundedReceiver<CreateActivityLog>,
}

impl ActivityLogService {
    /// Spawn the writer and return the handle used to feed it
    pub fn spawn(db: DBService) -> (ActivityLogger, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self { db, rx };
        let handle = tokio::spawn(async move {
            service.start().await;
        });
        (ActivityLogger { tx }, handle)
    }

    async fn start(mut self) {
        info!("Starting activity log writer");

        while let Some(entry) = self.rx.recv().await {
            match ActivityLog::create(&self.db.pool, &entry).await {
                Ok(log) => debug!(
                    action = %log.action,
                    resource = %log.resource,
                    "Activity recorded"
                ),
                Err(e) => warn!(
                    action = %entry.action,
                    resource = %entry.resource,
                    "Failed to record activity: {}",
                    e
                ),
            }
        }

        info!("Activity log writer stopped");
    }

    /// Direct insert used by the activity endpoint, which reports failures to the caller
    pub async fn record(
        db: &DBService,
        data: &CreateActivityLog,
    ) -> Result<ActivityLog, ActivityLogError> {
        if data.action.trim().is_empty() || data.resource.trim().is_empty() {
            return Err(ActivityLogError::MissingField);
        }
        Ok(ActivityLog::create(&db.pool, data).await?)
    }

    pub async fn list(
        db: &DBService,
        filter: &ActivityLogFilter,
    ) -> Result<Vec<ActivityLog>, ActivityLogError> {
        Ok(ActivityLog::find_filtered(&db.pool, filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn queued_entries_are_persisted() {
        let db = DBService::new_in_memory().await.unwrap();
        let (logger, _handle) = ActivityLogService::spawn(db.clone());
        let pig_id = Uuid::new_v4();

        logger.log("create", "pigs", Some(pig_id), serde_json::json!({"weight": 42.5}));

        let filter = ActivityLogFilter {
            action: None,
            resource: Some("pigs".to_string()),
            limit: 1,
        };
        let mut found = Vec::new();
        for _ in 0..50 {
            found = ActivityLog::find_filtered(&db.pool, &filter).await.unwrap();
            if !found.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let log = found.pop().expect("entry should be written");
        assert_eq!(log.action, "create");
        assert_eq!(log.resource_id, Some(pig_id));
        assert_eq!(log.details["weight"], 42.5);
    }

    #[tokio::test]
    async fn bursts_are_persisted_in_full() {
        let db = DBService::new_in_memory().await.unwrap();
        let (logger, _handle) = ActivityLogService::spawn(db.clone());

        for i in 0..400 {
            logger.log("view", "ratings", None, serde_json::json!({ "page": i }));
        }

        let filter = ActivityLogFilter {
            action: Some("view".to_string()),
            resource: None,
            limit: 1000,
        };
        let mut persisted = 0;
        for _ in 0..200 {
            persisted = ActivityLog::find_filtered(&db.pool, &filter).await.unwrap().len();
            if persisted == 400 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        assert_eq!(persisted, 400);
    }

    #[tokio::test]
    async fn record_requires_action_and_resource() {
        let db = DBService::new_in_memory().await.unwrap();
        let err = ActivityLogService::record(
            &db,
            &CreateActivityLog {
                action: " ".to_string(),
                resource: "pigs".to_string(),
                resource_id: None,
                details: Value::Null,
                user_name: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ActivityLogError::MissingField));
    }
}
