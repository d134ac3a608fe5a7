//! Database readiness check backing the health endpoint.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

/// Tables the dashboard cannot serve without
pub const REQUIRED_TABLES: &[&str] = &[
    "associations",
    "caretakers",
    "pigs",
    "projects",
    "monitoring_records",
    "performance_assessments",
    "financial_reports",
    "issues",
    "project_buyers",
    "activity_logs",
    "user_profiles",
];

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database_initialized: bool,
    #[ts(type = "number")]
    pub migrations_applied: usize,
    pub latest_migration: Option<String>,
    pub missing_tables: Vec<String>,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.database_initialized && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.database_initialized {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("Missing tables: {}", self.missing_tables.join(", "))
        } else {
            format!("Database OK - {} migrations applied", self.migrations_applied)
        }
    }
}

pub struct HealthService;

impl HealthService {
    pub async fn check(pool: &SqlitePool) -> Result<HealthReport, HealthError> {
        let initialized = table_exists(pool, "_sqlx_migrations").await?;
        if !initialized {
            warn!("Database not initialized - _sqlx_migrations table does not exist");
            return Ok(HealthReport {
                database_initialized: false,
                migrations_applied: 0,
                latest_migration: None,
                missing_tables: REQUIRED_TABLES.iter().map(|t| t.to_string()).collect(),
            });
        }

        let migrations_applied =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(pool)
                .await?;
        let latest_migration = sqlx::query_scalar::<_, String>(
            "SELECT description FROM _sqlx_migrations WHERE success = 1 ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await?;

        let mut missing_tables = Vec::new();
        for table in REQUIRED_TABLES {
            if !table_exists(pool, table).await? {
                missing_tables.push(table.to_string());
            }
        }

        let report = HealthReport {
            database_initialized: true,
            migrations_applied: migrations_applied as usize,
            latest_migration,
            missing_tables,
        };
        if report.is_ok() {
            info!(migrations_applied, "Database health check passed");
        } else {
            warn!("{}", report.summary());
        }
        Ok(report)
    }
}

async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = $1",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}
