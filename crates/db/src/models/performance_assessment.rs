use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Manual performance assessment of a caretaker, one rating (1-5) per category
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAssessment {
    pub id: Uuid,
    pub caretaker_id: Uuid,
    pub punctuality: f64,
    pub communication: f64,
    pub patient_care: f64,
    pub professionalism: f64,
    pub technical_skills: f64,
    pub overall_rating: f64, // Weighted average of the five categories
    pub comments: Option<String>,
    pub assessed_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformanceAssessment {
    pub caretaker_id: Uuid,
    pub punctuality: f64,
    pub communication: f64,
    pub patient_care: f64,
    pub professionalism: f64,
    pub technical_skills: f64,
    pub comments: Option<String>,
    pub assessed_by: String,
}

impl PerformanceAssessment {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceAssessment>(
            "SELECT * FROM performance_assessments ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceAssessment>(
            "SELECT * FROM performance_assessments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_caretaker_id(
        pool: &SqlitePool,
        caretaker_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceAssessment>(
            r#"SELECT * FROM performance_assessments
               WHERE caretaker_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(caretaker_id)
        .fetch_all(pool)
        .await
    }

    /// `overall_rating` is computed by the caller from the category ratings.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreatePerformanceAssessment,
        overall_rating: f64,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PerformanceAssessment>(
            r#"INSERT INTO performance_assessments
                (id, caretaker_id, punctuality, communication, patient_care, professionalism,
                 technical_skills, overall_rating, comments, assessed_by, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.caretaker_id)
        .bind(data.punctuality)
        .bind(data.communication)
        .bind(data.patient_care)
        .bind(data.professionalism)
        .bind(data.technical_skills)
        .bind(overall_rating)
        .bind(&data.comments)
        .bind(&data.assessed_by)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM performance_assessments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
