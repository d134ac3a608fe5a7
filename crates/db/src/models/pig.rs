use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::patch_nullable;

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[sqlx(type_name = "health_status")]
pub enum HealthStatus {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthStatus {
    /// Excellent and Good count toward a caretaker's health rate
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Excellent | HealthStatus::Good)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[sqlx(type_name = "breeding_status")]
pub enum BreedingStatus {
    #[default]
    #[sqlx(rename = "Not Ready")]
    #[serde(rename = "Not Ready")]
    #[strum(serialize = "Not Ready")]
    NotReady,
    Ready,
    Breeding,
    Pregnant,
    Farrowed,
    Weaned,
}

impl BreedingStatus {
    /// Pigs past the "ready" stage are in an active breeding cycle
    pub fn is_in_breeding_cycle(&self) -> bool {
        matches!(
            self,
            BreedingStatus::Breeding
                | BreedingStatus::Pregnant
                | BreedingStatus::Farrowed
                | BreedingStatus::Weaned
        )
    }
}

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "pig_sex", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PigSex {
    Male,
    Female,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Pig {
    pub id: Uuid,
    pub caretaker_id: Option<Uuid>, // Foreign key to Caretaker, loosely enforced
    pub caretaker_name: String,     // Denormalized for listings
    pub health_status: HealthStatus,
    pub breeding_status: BreedingStatus,
    pub weight: f64,
    pub sex: Option<PigSex>,
    pub breed: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreatePig {
    pub caretaker_id: Option<Uuid>,
    pub caretaker_name: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub breeding_status: Option<BreedingStatus>,
    pub weight: f64,
    pub sex: Option<PigSex>,
    pub breed: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<Uuid>>")]
    pub caretaker_id: Option<Option<Uuid>>,
    pub caretaker_name: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub breeding_status: Option<BreedingStatus>,
    pub weight: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<PigSex>>")]
    pub sex: Option<Option<PigSex>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub breed: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<NaiveDate>>")]
    pub date_of_birth: Option<Option<NaiveDate>>,
}

impl Pig {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Pig>("SELECT * FROM pigs ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Pig>("SELECT * FROM pigs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_caretaker_id(
        pool: &SqlitePool,
        caretaker_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Pig>(
            "SELECT * FROM pigs WHERE caretaker_id = $1 ORDER BY created_at DESC",
        )
        .bind(caretaker_id)
        .fetch_all(pool)
        .await
    }

    /// `caretaker_name` is the display name resolved by the caller; it falls back to
    /// the name carried in the payload.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreatePig,
        caretaker_name: Option<&str>,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let caretaker_name = caretaker_name
            .or(data.caretaker_name.as_deref())
            .unwrap_or_default();
        sqlx::query_as::<_, Pig>(
            r#"INSERT INTO pigs
                (id, caretaker_id, caretaker_name, health_status, breeding_status, weight, sex, breed,
                 date_of_birth, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.caretaker_id)
        .bind(caretaker_name)
        .bind(data.health_status.unwrap_or_default())
        .bind(data.breeding_status.unwrap_or_default())
        .bind(data.weight)
        .bind(data.sex)
        .bind(&data.breed)
        .bind(data.date_of_birth)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdatePig,
        caretaker_name: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let caretaker_name = caretaker_name
            .or(data.caretaker_name.as_deref())
            .unwrap_or(&existing.caretaker_name);
        sqlx::query_as::<_, Pig>(
            r#"UPDATE pigs
               SET caretaker_id = $2, caretaker_name = $3, health_status = $4, breeding_status = $5,
                   weight = $6, sex = $7, breed = $8, date_of_birth = $9, updated_at = $10
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(patch_nullable(&data.caretaker_id, &existing.caretaker_id))
        .bind(caretaker_name)
        .bind(data.health_status.unwrap_or(existing.health_status))
        .bind(data.breeding_status.unwrap_or(existing.breeding_status))
        .bind(data.weight.unwrap_or(existing.weight))
        .bind(patch_nullable(&data.sex, &existing.sex))
        .bind(patch_nullable(&data.breed, &existing.breed))
        .bind(patch_nullable(&data.date_of_birth, &existing.date_of_birth))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pigs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
