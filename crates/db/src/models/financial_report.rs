use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Default portion of net profit that goes to the caretaker
pub const DEFAULT_CARETAKER_SHARE_RATE: f64 = 0.5;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub id: Uuid,
    pub association_id: Uuid,
    pub caretaker_id: Option<Uuid>,
    pub reporting_period: String,
    pub total_sales: f64,
    pub production_cost: f64,
    pub operating_expenses: f64,
    pub caretaker_share_rate: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub caretaker_share: f64,
    pub association_share: f64,
    pub profit_margin: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw inputs entered by the user
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateFinancialReport {
    pub association_id: Uuid,
    pub caretaker_id: Option<Uuid>,
    pub reporting_period: String,
    pub total_sales: f64,
    pub production_cost: f64,
    pub operating_expenses: f64,
    pub caretaker_share_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFinancialReport {
    pub association_id: Option<Uuid>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<Uuid>>")]
    pub caretaker_id: Option<Option<Uuid>>,
    pub reporting_period: Option<String>,
    pub total_sales: Option<f64>,
    pub production_cost: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub caretaker_share_rate: Option<f64>,
}

/// Figures derived from the raw inputs; computed outside the model layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FinancialFigures {
    pub total_sales: f64,
    pub production_cost: f64,
    pub operating_expenses: f64,
    pub caretaker_share_rate: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub caretaker_share: f64,
    pub association_share: f64,
    pub profit_margin: f64,
}

impl FinancialReport {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FinancialReport>(
            "SELECT * FROM financial_reports ORDER BY reporting_period DESC, created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FinancialReport>("SELECT * FROM financial_reports WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        association_id: Uuid,
        caretaker_id: Option<Uuid>,
        reporting_period: &str,
        figures: &FinancialFigures,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, FinancialReport>(
            r#"INSERT INTO financial_reports
                (id, association_id, caretaker_id, reporting_period, total_sales, production_cost,
                 operating_expenses, caretaker_share_rate, gross_profit, net_profit, caretaker_share,
                 association_share, profit_margin, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
               RETURNING *"#,
        )
        .bind(id)
        .bind(association_id)
        .bind(caretaker_id)
        .bind(reporting_period)
        .bind(figures.total_sales)
        .bind(figures.production_cost)
        .bind(figures.operating_expenses)
        .bind(figures.caretaker_share_rate)
        .bind(figures.gross_profit)
        .bind(figures.net_profit)
        .bind(figures.caretaker_share)
        .bind(figures.association_share)
        .bind(figures.profit_margin)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        association_id: Uuid,
        caretaker_id: Option<Uuid>,
        reporting_period: &str,
        figures: &FinancialFigures,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FinancialReport>(
            r#"UPDATE financial_reports
               SET association_id = $2, caretaker_id = $3, reporting_period = $4, total_sales = $5,
                   production_cost = $6, operating_expenses = $7, caretaker_share_rate = $8,
                   gross_profit = $9, net_profit = $10, caretaker_share = $11,
                   association_share = $12, profit_margin = $13, updated_at = $14
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(association_id)
        .bind(caretaker_id)
        .bind(reporting_period)
        .bind(figures.total_sales)
        .bind(figures.production_cost)
        .bind(figures.operating_expenses)
        .bind(figures.caretaker_share_rate)
        .bind(figures.gross_profit)
        .bind(figures.net_profit)
        .bind(figures.caretaker_share)
        .bind(figures.association_share)
        .bind(figures.profit_margin)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM financial_reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
