use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::patch_nullable;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "monitoring_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MonitoringType {
    #[default]
    Monthly,
    Quarterly,
    Annual,
    Special,
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
    Display,
    Default,
)]
#[sqlx(type_name = "monitoring_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MonitoringStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
}

/// Periodic financial/operational snapshot of a project
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    #[sqlx(json)]
    #[ts(type = "Array<string>")]
    pub association_ids: Vec<Uuid>, // JSON-serialized in storage
    pub gross_sales: f64,
    pub net_income: f64,
    pub monitoring_type: MonitoringType,
    pub status: MonitoringStatus,
    pub monitoring_date: NaiveDate,
    pub remarks: Option<String>,
    pub monitored_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateMonitoringRecord {
    pub project_id: Uuid,
    pub association_ids: Vec<Uuid>,
    pub gross_sales: f64,
    pub net_income: f64,
    pub monitoring_type: Option<MonitoringType>,
    pub status: Option<MonitoringStatus>,
    pub monitoring_date: NaiveDate,
    pub remarks: Option<String>,
    pub monitored_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMonitoringRecord {
    pub project_id: Option<Uuid>,
    pub association_ids: Option<Vec<Uuid>>,
    pub gross_sales: Option<f64>,
    pub net_income: Option<f64>,
    pub monitoring_type: Option<MonitoringType>,
    pub status: Option<MonitoringStatus>,
    pub monitoring_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub remarks: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub monitored_by: Option<Option<String>>,
}

impl MonitoringRecord {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MonitoringRecord>(
            "SELECT * FROM monitoring_records ORDER BY monitoring_date DESC, created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MonitoringRecord>("SELECT * FROM monitoring_records WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MonitoringRecord>(
            r#"SELECT * FROM monitoring_records
               WHERE project_id = $1
               ORDER BY monitoring_date DESC"#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateMonitoringRecord,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, MonitoringRecord>(
            r#"INSERT INTO monitoring_records
                (id, project_id, association_ids, gross_sales, net_income, monitoring_type, status,
                 monitoring_date, remarks, monitored_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(Json(&data.association_ids))
        .bind(data.gross_sales)
        .bind(data.net_income)
        .bind(data.monitoring_type.unwrap_or_default())
        .bind(data.status.unwrap_or_default())
        .bind(data.monitoring_date)
        .bind(&data.remarks)
        .bind(&data.monitored_by)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateMonitoringRecord,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let association_ids = data
            .association_ids
            .as_ref()
            .unwrap_or(&existing.association_ids);
        sqlx::query_as::<_, MonitoringRecord>(
            r#"UPDATE monitoring_records
               SET project_id = $2, association_ids = $3, gross_sales = $4, net_income = $5,
                   monitoring_type = $6, status = $7, monitoring_date = $8, remarks = $9,
                   monitored_by = $10, updated_at = $11
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.project_id.unwrap_or(existing.project_id))
        .bind(Json(association_ids))
        .bind(data.gross_sales.unwrap_or(existing.gross_sales))
        .bind(data.net_income.unwrap_or(existing.net_income))
        .bind(data.monitoring_type.unwrap_or(existing.monitoring_type))
        .bind(data.status.unwrap_or(existing.status))
        .bind(data.monitoring_date.unwrap_or(existing.monitoring_date))
        .bind(patch_nullable(&data.remarks, &existing.remarks))
        .bind(patch_nullable(&data.monitored_by, &existing.monitored_by))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM monitoring_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn association_ids_survive_storage() {
        let db = DBService::new_in_memory().await.unwrap();
        let project_id = Uuid::new_v4();
        let associations = vec![Uuid::new_v4(), Uuid::new_v4()];
        let record = MonitoringRecord::create(
            &db.pool,
            &CreateMonitoringRecord {
                project_id,
                association_ids: associations.clone(),
                gross_sales: 125_000.0,
                net_income: 38_500.0,
                monitoring_type: Some(MonitoringType::Quarterly),
                status: None,
                monitoring_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                remarks: None,
                monitored_by: Some("PDO II".to_string()),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        assert_eq!(record.association_ids, associations);
        assert_eq!(record.status, MonitoringStatus::Draft);

        let by_project = MonitoringRecord::find_by_project_id(&db.pool, project_id)
            .await
            .unwrap();
        assert_eq!(by_project.len(), 1);
        assert_eq!(by_project[0].association_ids, associations);
    }
}
