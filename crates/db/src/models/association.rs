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
#[sqlx(type_name = "association_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssociationStatus {
    #[default]
    Active,
    Inactive,
}

/// A farmer/beneficiary group enrolled in the program
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub total_members: i64,
    pub active_members: i64,
    pub status: AssociationStatus,
    pub archived: bool,
    pub date_formulated: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssociation {
    pub name: String,
    pub location: String,
    pub total_members: Option<i64>,
    pub active_members: Option<i64>,
    pub status: Option<AssociationStatus>,
    pub date_formulated: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssociation {
    pub name: Option<String>,
    pub location: Option<String>,
    pub total_members: Option<i64>,
    pub active_members: Option<i64>,
    pub status: Option<AssociationStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<NaiveDate>>")]
    pub date_formulated: Option<Option<NaiveDate>>,
}

impl Association {
    pub fn is_active(&self) -> bool {
        self.status == AssociationStatus::Active && !self.archived
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Association>("SELECT * FROM associations ORDER BY name ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_unarchived(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Association>(
            "SELECT * FROM associations WHERE archived = 0 ORDER BY name ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Association>("SELECT * FROM associations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateAssociation,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Association>(
            r#"INSERT INTO associations
                (id, name, location, total_members, active_members, status, archived, date_formulated, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.location)
        .bind(data.total_members.unwrap_or(0))
        .bind(data.active_members.unwrap_or(0))
        .bind(data.status.unwrap_or_default())
        .bind(data.date_formulated)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Apply the provided fields on top of the stored row. Returns `None` when the row is gone.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateAssociation,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        sqlx::query_as::<_, Association>(
            r#"UPDATE associations
               SET name = $2, location = $3, total_members = $4, active_members = $5,
                   status = $6, date_formulated = $7, updated_at = $8
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.name.as_ref().unwrap_or(&existing.name))
        .bind(data.location.as_ref().unwrap_or(&existing.location))
        .bind(data.total_members.unwrap_or(existing.total_members))
        .bind(data.active_members.unwrap_or(existing.active_members))
        .bind(data.status.unwrap_or(existing.status))
        .bind(patch_nullable(&data.date_formulated, &existing.date_formulated))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn set_archived(
        pool: &SqlitePool,
        id: Uuid,
        archived: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Association>(
            "UPDATE associations SET archived = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(archived)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM associations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
