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
#[sqlx(type_name = "caretaker_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CaretakerStatus {
    #[default]
    Active,
    OnLeave,
    Inactive,
}

/// Program participant responsible for livestock
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Caretaker {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub barangay: String,
    pub municipality: String,
    pub province: String,
    pub contact_number: Option<String>,
    pub slp_association: Option<Uuid>, // Foreign key to Association, loosely enforced
    pub status: CaretakerStatus,
    pub modality: String,
    pub participant_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaretaker {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub barangay: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub contact_number: Option<String>,
    pub slp_association: Option<Uuid>,
    pub status: Option<CaretakerStatus>,
    pub modality: Option<String>,
    pub participant_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaretaker {
    pub first_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub middle_name: Option<Option<String>>,
    pub last_name: Option<String>,
    pub barangay: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub contact_number: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<Uuid>>")]
    pub slp_association: Option<Option<Uuid>>,
    pub status: Option<CaretakerStatus>,
    pub modality: Option<String>,
    pub participant_type: Option<String>,
}

impl Caretaker {
    /// "First M. Last" when a middle name is present, "First Last" otherwise
    pub fn full_name(&self) -> String {
        match self
            .middle_name
            .as_deref()
            .and_then(|m| m.trim().chars().next())
        {
            Some(initial) => format!("{} {}. {}", self.first_name, initial, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Caretaker>(
            "SELECT * FROM caretakers ORDER BY last_name ASC, first_name ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Caretaker>("SELECT * FROM caretakers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_association_id(
        pool: &SqlitePool,
        association_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Caretaker>(
            "SELECT * FROM caretakers WHERE slp_association = $1 ORDER BY last_name ASC",
        )
        .bind(association_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCaretaker,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Caretaker>(
            r#"INSERT INTO caretakers
                (id, first_name, middle_name, last_name, barangay, municipality, province,
                 contact_number, slp_association, status, modality, participant_type, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.middle_name)
        .bind(&data.last_name)
        .bind(data.barangay.as_deref().unwrap_or_default())
        .bind(data.municipality.as_deref().unwrap_or_default())
        .bind(data.province.as_deref().unwrap_or_default())
        .bind(&data.contact_number)
        .bind(data.slp_association)
        .bind(data.status.unwrap_or_default())
        .bind(data.modality.as_deref().unwrap_or_default())
        .bind(data.participant_type.as_deref().unwrap_or_default())
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCaretaker,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        sqlx::query_as::<_, Caretaker>(
            r#"UPDATE caretakers
               SET first_name = $2, middle_name = $3, last_name = $4, barangay = $5,
                   municipality = $6, province = $7, contact_number = $8, slp_association = $9,
                   status = $10, modality = $11, participant_type = $12, updated_at = $13
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.first_name.as_ref().unwrap_or(&existing.first_name))
        .bind(patch_nullable(&data.middle_name, &existing.middle_name))
        .bind(data.last_name.as_ref().unwrap_or(&existing.last_name))
        .bind(data.barangay.as_ref().unwrap_or(&existing.barangay))
        .bind(data.municipality.as_ref().unwrap_or(&existing.municipality))
        .bind(data.province.as_ref().unwrap_or(&existing.province))
        .bind(patch_nullable(&data.contact_number, &existing.contact_number))
        .bind(patch_nullable(&data.slp_association, &existing.slp_association))
        .bind(data.status.unwrap_or(existing.status))
        .bind(data.modality.as_ref().unwrap_or(&existing.modality))
        .bind(data.participant_type.as_ref().unwrap_or(&existing.participant_type))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM caretakers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
