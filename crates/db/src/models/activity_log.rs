use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

/// Log entry for a user action in the dashboard
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<Uuid>,
    #[sqlx(json)]
    pub details: serde_json::Value,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityLog {
    pub action: String,
    pub resource: String,
    pub resource_id: Option<Uuid>,
    #[serde(default)]
    pub details: serde_json::Value,
    pub user_name: Option<String>,
}

/// Narrowing applied when listing the activity log
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub action: Option<String>,
    pub resource: Option<String>,
    pub limit: i64,
}

impl ActivityLog {
    pub async fn create(pool: &SqlitePool, data: &CreateActivityLog) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let details = if data.details.is_null() {
            serde_json::json!({})
        } else {
            data.details.clone()
        };
        sqlx::query_as::<_, ActivityLog>(
            r#"INSERT INTO activity_logs (id, action, resource, resource_id, details, user_name, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.action)
        .bind(&data.resource)
        .bind(data.resource_id)
        .bind(Json(details))
        .bind(&data.user_name)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_filtered(
        pool: &SqlitePool,
        filter: &ActivityLogFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM activity_logs WHERE 1 = 1");
        if let Some(action) = &filter.action {
            query.push(" AND action = ").push_bind(action);
        }
        if let Some(resource) = &filter.resource {
            query.push(" AND resource = ").push_bind(resource);
        }
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit);

        query.build_query_as::<ActivityLog>().fetch_all(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn entry(action: &str, resource: &str) -> CreateActivityLog {
        CreateActivityLog {
            action: action.to_string(),
            resource: resource.to_string(),
            resource_id: None,
            details: serde_json::Value::Null,
            user_name: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn filter_by_action_and_limit() {
        let db = DBService::new_in_memory().await.unwrap();
        for _ in 0..3 {
            ActivityLog::create(&db.pool, &entry("export", "ratings")).await.unwrap();
        }
        ActivityLog::create(&db.pool, &entry("view", "caretakers")).await.unwrap();

        let exports = ActivityLog::find_filtered(
            &db.pool,
            &ActivityLogFilter {
                action: Some("export".to_string()),
                resource: None,
                limit: 2,
            },
        )
        .await
        .unwrap();
        assert_eq!(exports.len(), 2);
        assert!(exports.iter().all(|log| log.action == "export"));
        assert_eq!(exports[0].details, serde_json::json!({}));

        let views = ActivityLog::find_filtered(
            &db.pool,
            &ActivityLogFilter {
                action: None,
                resource: Some("caretakers".to_string()),
                limit: 10,
            },
        )
        .await
        .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].action, "view");
    }
}
