//! Profit and share derivation for association financial reports.

use std::collections::HashMap;

use db::models::{
    association::Association,
    financial_report::{
        CreateFinancialReport, DEFAULT_CARETAKER_SHARE_RATE, FinancialFigures, FinancialReport,
        UpdateFinancialReport,
    },
    patch_nullable,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use utils::text::round2;
use uuid::Uuid;

use super::performance::UNKNOWN_ASSOCIATION;

#[derive(Debug, Error)]
pub enum FinancialError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("financial report not found")]
    NotFound,
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),
    #[error("caretakerShareRate must be between 0 and 1")]
    InvalidShareRate,
    #[error("reportingPeriod is required")]
    MissingReportingPeriod,
}

/// Compute profit, shares, and margin from the raw inputs.
///
/// Shares are only distributed out of a positive net profit; a loss leaves both at zero.
pub fn derive_figures(
    total_sales: f64,
    production_cost: f64,
    operating_expenses: f64,
    caretaker_share_rate: f64,
) -> Result<FinancialFigures, FinancialError> {
    for (name, value) in [
        ("totalSales", total_sales),
        ("productionCost", production_cost),
        ("operatingExpenses", operating_expenses),
    ] {
        if !(value >= 0.0) {
            return Err(FinancialError::NegativeAmount(name));
        }
    }
    if !(0.0..=1.0).contains(&caretaker_share_rate) {
        return Err(FinancialError::InvalidShareRate);
    }

    let gross_profit = round2(total_sales - production_cost);
    let net_profit = round2(gross_profit - operating_expenses);
    let distributable = net_profit.max(0.0);
    let caretaker_share = round2(distributable * caretaker_share_rate);
    let association_share = round2(distributable - caretaker_share);
    let profit_margin = if total_sales > 0.0 {
        round2(net_profit / total_sales * 100.0)
    } else {
        0.0
    };

    Ok(FinancialFigures {
        total_sales: round2(total_sales),
        production_cost: round2(production_cost),
        operating_expenses: round2(operating_expenses),
        caretaker_share_rate,
        gross_profit,
        net_profit,
        caretaker_share,
        association_share,
        profit_margin,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AssociationFinancialSummary {
    pub association_id: Uuid,
    pub association_name: String,
    #[ts(type = "number")]
    pub report_count: usize,
    pub total_sales: f64,
    pub total_net_profit: f64,
    pub total_caretaker_share: f64,
    pub total_association_share: f64,
}

pub struct FinancialService;

impl FinancialService {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateFinancialReport,
    ) -> Result<FinancialReport, FinancialError> {
        if data.reporting_period.trim().is_empty() {
            return Err(FinancialError::MissingReportingPeriod);
        }
        let figures = derive_figures(
            data.total_sales,
            data.production_cost,
            data.operating_expenses,
            data.caretaker_share_rate
                .unwrap_or(DEFAULT_CARETAKER_SHARE_RATE),
        )?;
        let report = FinancialReport::create(
            pool,
            data.association_id,
            data.caretaker_id,
            data.reporting_period.trim(),
            &figures,
            Uuid::new_v4(),
        )
        .await?;

        info!(
            report_id = %report.id,
            association_id = %report.association_id,
            net_profit = report.net_profit,
            "Financial report created"
        );
        Ok(report)
    }

    /// Merge the update over the stored inputs and re-derive every computed field
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateFinancialReport,
    ) -> Result<FinancialReport, FinancialError> {
        let existing = FinancialReport::find_by_id(pool, id)
            .await?
            .ok_or(FinancialError::NotFound)?;

        let reporting_period = data
            .reporting_period
            .as_deref()
            .unwrap_or(&existing.reporting_period)
            .trim();
        if reporting_period.is_empty() {
            return Err(FinancialError::MissingReportingPeriod);
        }
        let figures = derive_figures(
            data.total_sales.unwrap_or(existing.total_sales),
            data.production_cost.unwrap_or(existing.production_cost),
            data.operating_expenses.unwrap_or(existing.operating_expenses),
            data.caretaker_share_rate
                .unwrap_or(existing.caretaker_share_rate),
        )?;

        FinancialReport::update(
            pool,
            id,
            data.association_id.unwrap_or(existing.association_id),
            patch_nullable(&data.caretaker_id, &existing.caretaker_id).copied(),
            reporting_period,
            &figures,
        )
        .await?
        .ok_or(FinancialError::NotFound)
    }

    pub fn summarize(
        reports: &[FinancialReport],
        associations: &[Association],
    ) -> Vec<AssociationFinancialSummary> {
        let names: HashMap<Uuid, &str> = associations
            .iter()
            .map(|a| (a.id, a.name.as_str()))
            .collect();

        let mut by_association: HashMap<Uuid, AssociationFinancialSummary> = HashMap::new();
        for report in reports {
            let entry = by_association
                .entry(report.association_id)
                .or_insert_with(|| AssociationFinancialSummary {
                    association_id: report.association_id,
                    association_name: names
                        .get(&report.association_id)
                        .copied()
                        .unwrap_or(UNKNOWN_ASSOCIATION)
                        .to_string(),
                    report_count: 0,
                    total_sales: 0.0,
                    total_net_profit: 0.0,
                    total_caretaker_share: 0.0,
                    total_association_share: 0.0,
                });
            entry.report_count += 1;
            entry.total_sales = round2(entry.total_sales + report.total_sales);
            entry.total_net_profit = round2(entry.total_net_profit + report.net_profit);
            entry.total_caretaker_share =
                round2(entry.total_caretaker_share + report.caretaker_share);
            entry.total_association_share =
                round2(entry.total_association_share + report.association_share);
        }

        let mut summaries: Vec<_> = by_association.into_values().collect();
        summaries.sort_by(|a, b| a.association_name.cmp(&b.association_name));
        summaries
    }

    pub async fn summary(
        pool: &SqlitePool,
    ) -> Result<Vec<AssociationFinancialSummary>, FinancialError> {
        let (reports, associations) =
            tokio::try_join!(FinancialReport::find_all(pool), Association::find_all(pool))?;
        Ok(Self::summarize(&reports, &associations))
    }
}

#[cfg(test)]
mod tests {
    use db::DBService;

    use super::*;

    #[test]
    fn test_profit_and_shares() {
        let figures = derive_figures(150_000.0, 90_000.0, 12_500.0, 0.6).unwrap();
        assert_eq!(figures.gross_profit, 60_000.0);
        assert_eq!(figures.net_profit, 47_500.0);
        assert_eq!(figures.caretaker_share, 28_500.0);
        assert_eq!(figures.association_share, 19_000.0);
        assert_eq!(figures.profit_margin, 31.67);
        assert_eq!(
            figures.caretaker_share + figures.association_share,
            figures.net_profit
        );
    }

    #[test]
    fn test_loss_distributes_nothing() {
        let figures = derive_figures(20_000.0, 25_000.0, 1_000.0, 0.5).unwrap();
        assert_eq!(figures.net_profit, -6_000.0);
        assert_eq!(figures.caretaker_share, 0.0);
        assert_eq!(figures.association_share, 0.0);
        assert_eq!(figures.profit_margin, -30.0);
    }

    #[test]
    fn test_no_sales_has_zero_margin() {
        let figures = derive_figures(0.0, 0.0, 0.0, 0.5).unwrap();
        assert_eq!(figures.profit_margin, 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            derive_figures(-1.0, 0.0, 0.0, 0.5),
            Err(FinancialError::NegativeAmount("totalSales"))
        ));
        assert!(matches!(
            derive_figures(1.0, 0.0, f64::NAN, 0.5),
            Err(FinancialError::NegativeAmount("operatingExpenses"))
        ));
        assert!(matches!(
            derive_figures(1.0, 0.0, 0.0, 1.5),
            Err(FinancialError::InvalidShareRate)
        ));
    }

    #[tokio::test]
    async fn update_rederives_figures_and_summary_totals() {
        let db = DBService::new_in_memory().await.unwrap();
        let association_id = Uuid::new_v4();
        let report = FinancialService::create(
            &db.pool,
            &CreateFinancialReport {
                association_id,
                caretaker_id: None,
                reporting_period: "2024-Q1".to_string(),
                total_sales: 100_000.0,
                production_cost: 60_000.0,
                operating_expenses: 10_000.0,
                caretaker_share_rate: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(report.net_profit, 30_000.0);
        assert_eq!(report.caretaker_share, 15_000.0);

        let updated = FinancialService::update(
            &db.pool,
            report.id,
            &UpdateFinancialReport {
                operating_expenses: Some(20_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.net_profit, 20_000.0);
        assert_eq!(updated.association_share, 10_000.0);

        let summary = FinancialService::summary(&db.pool).await.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].association_name, UNKNOWN_ASSOCIATION);
        assert_eq!(summary[0].total_net_profit, 20_000.0);
        assert_eq!(summary[0].report_count, 1);
    }
}
