use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::patch_nullable;

/// Buyer of a project's produce (e.g. a trader purchasing fattened hogs)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBuyer {
    pub id: Uuid,
    pub project_id: Uuid,
    pub buyer_name: String,
    pub contact_number: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_amount: f64, // quantity * unit_price
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBuyer {
    pub project_id: Uuid,
    pub buyer_name: String,
    pub contact_number: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectBuyer {
    pub buyer_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub contact_number: Option<Option<String>>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
}

fn total_amount(quantity: i64, unit_price: f64) -> f64 {
    (quantity as f64 * unit_price * 100.0).round() / 100.0
}

impl ProjectBuyer {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectBuyer>("SELECT * FROM project_buyers ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectBuyer>(
            "SELECT * FROM project_buyers WHERE project_id = $1 ORDER BY buyer_name ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectBuyer>("SELECT * FROM project_buyers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProjectBuyer,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, ProjectBuyer>(
            r#"INSERT INTO project_buyers
                (id, project_id, buyer_name, contact_number, quantity, unit_price, total_amount, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(&data.buyer_name)
        .bind(&data.contact_number)
        .bind(data.quantity)
        .bind(data.unit_price)
        .bind(total_amount(data.quantity, data.unit_price))
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProjectBuyer,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let quantity = data.quantity.unwrap_or(existing.quantity);
        let unit_price = data.unit_price.unwrap_or(existing.unit_price);
        sqlx::query_as::<_, ProjectBuyer>(
            r#"UPDATE project_buyers
               SET buyer_name = $2, contact_number = $3, quantity = $4, unit_price = $5,
                   total_amount = $6, updated_at = $7
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.buyer_name.as_ref().unwrap_or(&existing.buyer_name))
        .bind(patch_nullable(&data.contact_number, &existing.contact_number))
        .bind(quantity)
        .bind(unit_price)
        .bind(total_amount(quantity, unit_price))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_buyers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
