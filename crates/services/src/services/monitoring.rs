//! Project monitoring records and their per-project roll-up.

use std::collections::HashMap;

use chrono::NaiveDate;
use db::models::{
    monitoring_record::{
        CreateMonitoringRecord, MonitoringRecord, MonitoringStatus, UpdateMonitoringRecord,
    },
    project::Project,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use utils::text::round2;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("monitoring record not found")]
    NotFound,
    #[error("at least one association is required")]
    NoAssociations,
    #[error("grossSales cannot be negative")]
    NegativeGrossSales,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMonitoringSummary {
    pub project: Project,
    #[ts(type = "number")]
    pub record_count: usize,
    pub total_gross_sales: f64,
    pub total_net_income: f64,
    pub latest_monitoring_date: Option<NaiveDate>,
    #[ts(type = "number")]
    pub draft_count: usize,
    #[ts(type = "number")]
    pub submitted_count: usize,
    #[ts(type = "number")]
    pub approved_count: usize,
}

fn validate(association_ids: &[Uuid], gross_sales: f64) -> Result<(), MonitoringError> {
    if association_ids.is_empty() {
        return Err(MonitoringError::NoAssociations);
    }
    if !(gross_sales >= 0.0) {
        return Err(MonitoringError::NegativeGrossSales);
    }
    Ok(())
}

pub struct MonitoringService;

impl MonitoringService {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateMonitoringRecord,
    ) -> Result<MonitoringRecord, MonitoringError> {
        validate(&data.association_ids, data.gross_sales)?;
        let record = MonitoringRecord::create(pool, data, Uuid::new_v4()).await?;
        info!(
            record_id = %record.id,
            project_id = %record.project_id,
            monitoring_type = %record.monitoring_type,
            "Monitoring record created"
        );
        Ok(record)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateMonitoringRecord,
    ) -> Result<MonitoringRecord, MonitoringError> {
        let existing = MonitoringRecord::find_by_id(pool, id)
            .await?
            .ok_or(MonitoringError::NotFound)?;
        validate(
            data.association_ids
                .as_deref()
                .unwrap_or(&existing.association_ids),
            data.gross_sales.unwrap_or(existing.gross_sales),
        )?;
        MonitoringRecord::update(pool, id, data)
            .await?
            .ok_or(MonitoringError::NotFound)
    }

    /// Roll records up per project; projects without records still appear with zeroes
    pub fn summarize(
        projects: &[Project],
        records: &[MonitoringRecord],
    ) -> Vec<ProjectMonitoringSummary> {
        let mut by_project: HashMap<Uuid, Vec<&MonitoringRecord>> = HashMap::new();
        for record in records {
            by_project.entry(record.project_id).or_default().push(record);
        }

        projects
            .iter()
            .map(|project| {
                let records = by_project.remove(&project.id).unwrap_or_default();
                let count_status = |status: MonitoringStatus| {
                    records.iter().filter(|r| r.status == status).count()
                };
                ProjectMonitoringSummary {
                    record_count: records.len(),
                    total_gross_sales: round2(records.iter().map(|r| r.gross_sales).sum()),
                    total_net_income: round2(records.iter().map(|r| r.net_income).sum()),
                    latest_monitoring_date: records.iter().map(|r| r.monitoring_date).max(),
                    draft_count: count_status(MonitoringStatus::Draft),
                    submitted_count: count_status(MonitoringStatus::Submitted),
                    approved_count: count_status(MonitoringStatus::Approved),
                    project: project.clone(),
                }
            })
            .collect()
    }

    pub async fn project_summaries(
        pool: &SqlitePool,
    ) -> Result<Vec<ProjectMonitoringSummary>, MonitoringError> {
        let (projects, records) =
            tokio::try_join!(Project::find_all(pool), MonitoringRecord::find_all(pool))?;
        Ok(Self::summarize(&projects, &records))
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{monitoring_record::MonitoringType, project::CreateProject},
    };

    use super::*;

    fn record(project_id: Uuid, day: u32, status: MonitoringStatus) -> CreateMonitoringRecord {
        CreateMonitoringRecord {
            project_id,
            association_ids: vec![Uuid::new_v4()],
            gross_sales: 10_000.0,
            net_income: 2_500.5,
            monitoring_type: Some(MonitoringType::Monthly),
            status: Some(status),
            monitoring_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            remarks: None,
            monitored_by: None,
        }
    }

    #[tokio::test]
    async fn rejects_records_without_associations() {
        let db = DBService::new_in_memory().await.unwrap();
        let mut data = record(Uuid::new_v4(), 1, MonitoringStatus::Draft);
        data.association_ids.clear();
        let err = MonitoringService::create(&db.pool, &data).await.unwrap_err();
        assert!(matches!(err, MonitoringError::NoAssociations));
    }

    #[tokio::test]
    async fn summary_rolls_up_per_project() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = Project::create(
            &db.pool,
            &CreateProject {
                name: "Swine Fattening 2024".to_string(),
                description: None,
                association_id: None,
                status: None,
                budget: Some(250_000.0),
                start_date: None,
                end_date: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let idle = Project::create(
            &db.pool,
            &CreateProject {
                name: "Goat Dispersal".to_string(),
                description: None,
                association_id: None,
                status: None,
                budget: None,
                start_date: None,
                end_date: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        MonitoringService::create(&db.pool, &record(project.id, 3, MonitoringStatus::Draft))
            .await
            .unwrap();
        MonitoringService::create(&db.pool, &record(project.id, 20, MonitoringStatus::Approved))
            .await
            .unwrap();

        let summaries = MonitoringService::project_summaries(&db.pool).await.unwrap();
        assert_eq!(summaries.len(), 2);

        let busy = summaries.iter().find(|s| s.project.id == project.id).unwrap();
        assert_eq!(busy.record_count, 2);
        assert_eq!(busy.total_gross_sales, 20_000.0);
        assert_eq!(busy.total_net_income, 5_001.0);
        assert_eq!(busy.latest_monitoring_date, NaiveDate::from_ymd_opt(2024, 5, 20));
        assert_eq!(busy.draft_count, 1);
        assert_eq!(busy.approved_count, 1);

        let quiet = summaries.iter().find(|s| s.project.id == idle.id).unwrap();
        assert_eq!(quiet.record_count, 0);
        assert_eq!(quiet.latest_monitoring_date, None);
    }
}
