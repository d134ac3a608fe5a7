use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::patch_nullable;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "issue_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "issue_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

/// Problem raised against a project during monitoring
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub reported_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssue {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<IssueSeverity>,
    pub status: Option<IssueStatus>,
    pub reported_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssue {
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub description: Option<Option<String>>,
    pub severity: Option<IssueSeverity>,
    pub status: Option<IssueStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub reported_by: Option<Option<String>>,
}

impl Issue {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Issue>(
            "SELECT * FROM issues WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateIssue, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Issue>(
            r#"INSERT INTO issues
                (id, project_id, title, description, severity, status, reported_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.severity.unwrap_or_default())
        .bind(data.status.unwrap_or_default())
        .bind(&data.reported_by)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateIssue,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        sqlx::query_as::<_, Issue>(
            r#"UPDATE issues
               SET title = $2, description = $3, severity = $4, status = $5, reported_by = $6,
                   updated_at = $7
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.title.as_ref().unwrap_or(&existing.title))
        .bind(patch_nullable(&data.description, &existing.description))
        .bind(data.severity.unwrap_or(existing.severity))
        .bind(data.status.unwrap_or(existing.status))
        .bind(patch_nullable(&data.reported_by, &existing.reported_by))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
