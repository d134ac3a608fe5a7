use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::patch_nullable;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Ongoing,
    Completed,
    Suspended,
}

/// Livelihood project run by (or for) an association
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub association_id: Option<Uuid>,
    pub status: ProjectStatus,
    pub budget: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub association_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<Uuid>>")]
    pub association_id: Option<Option<Uuid>>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<NaiveDate>>")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<NaiveDate>>")]
    pub end_date: Option<Option<NaiveDate>>,
}

impl Project {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProject,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Project>(
            r#"INSERT INTO projects
                (id, name, description, association_id, status, budget, start_date, end_date, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.association_id)
        .bind(data.status.unwrap_or_default())
        .bind(data.budget.unwrap_or(0.0))
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        sqlx::query_as::<_, Project>(
            r#"UPDATE projects
               SET name = $2, description = $3, association_id = $4, status = $5, budget = $6,
                   start_date = $7, end_date = $8, updated_at = $9
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.name.as_ref().unwrap_or(&existing.name))
        .bind(patch_nullable(&data.description, &existing.description))
        .bind(patch_nullable(&data.association_id, &existing.association_id))
        .bind(data.status.unwrap_or(existing.status))
        .bind(data.budget.unwrap_or(existing.budget))
        .bind(patch_nullable(&data.start_date, &existing.start_date))
        .bind(patch_nullable(&data.end_date, &existing.end_date))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
