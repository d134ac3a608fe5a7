//! Routes for association financial reports.

use std::collections::HashMap;

use axum::{
    Router,
    extract::State,
    response::{Json as ResponseJson, Response},
    routing::get,
};
use chrono::Utc;
use db::models::{
    association::Association,
    financial_report::{CreateFinancialReport, FinancialReport, UpdateFinancialReport},
};
use deployment::Deployment;
use serde_json::json;
use services::services::{
    export::{financial_report, financial_reports_table},
    filters::FinancialFilter,
    financial::{AssociationFinancialSummary, FinancialError, FinancialService},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use super::{csv_attachment, html_document};
use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

struct FilteredReports {
    reports: Vec<FinancialReport>,
    associations: Vec<Association>,
}

impl FilteredReports {
    fn names(&self) -> HashMap<Uuid, String> {
        self.associations
            .iter()
            .map(|a| (a.id, a.name.clone()))
            .collect()
    }
}

async fn filtered_reports(
    deployment: &DeploymentImpl,
    filter: &FinancialFilter,
) -> Result<FilteredReports, ApiError> {
    let pool = &deployment.db().pool;
    let (reports, associations) =
        tokio::try_join!(FinancialReport::find_all(pool), Association::find_all(pool))?;
    Ok(FilteredReports {
        reports: reports.into_iter().filter(|r| filter.matches(r)).collect(),
        associations,
    })
}

/// GET /api/financial-reports
/// List reports matching the filters
pub async fn get_reports(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<FinancialFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<FinancialReport>>>, ApiError> {
    let filtered = filtered_reports(&deployment, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(filtered.reports)))
}

/// GET /api/financial-reports/summary
/// Totals per association
pub async fn get_summary(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<AssociationFinancialSummary>>>, ApiError> {
    let summary = FinancialService::summary(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

/// GET /api/financial-reports/export.csv
pub async fn export_reports(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<FinancialFilter>,
) -> Result<Response, ApiError> {
    let filtered = filtered_reports(&deployment, &filter).await?;
    let csv = financial_reports_table(&filtered.reports, &filtered.names()).to_csv();
    deployment.log_activity(
        "export",
        "financial_reports",
        None,
        json!({ "format": "csv", "rows": filtered.reports.len() }),
    );
    Ok(csv_attachment("financial-reports", csv))
}

/// GET /api/financial-reports/report.html
/// Printable report with totals
pub async fn print_reports(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<FinancialFilter>,
) -> Result<Response, ApiError> {
    let filtered = filtered_reports(&deployment, &filter).await?;
    let totals = FinancialService::summarize(&filtered.reports, &filtered.associations);
    let html = financial_report(&filtered.reports, &totals, &filtered.names(), Utc::now()).render();
    deployment.log_activity(
        "export",
        "financial_reports",
        None,
        json!({ "format": "print", "rows": filtered.reports.len() }),
    );
    Ok(html_document(html))
}

/// GET /api/financial-reports/{id}
pub async fn get_report(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FinancialReport>>, ApiError> {
    let report = FinancialReport::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(FinancialError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// POST /api/financial-reports
/// Create a report; profit and shares are derived server-side
pub async fn create_report(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateFinancialReport>,
) -> Result<ResponseJson<ApiResponse<FinancialReport>>, ApiError> {
    let report = FinancialService::create(&deployment.db().pool, &payload).await?;
    deployment.log_activity(
        "create",
        "financial_reports",
        Some(report.id),
        json!({
            "associationId": report.association_id,
            "reportingPeriod": report.reporting_period,
        }),
    );
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// PUT /api/financial-reports/{id}
/// Update inputs and re-derive the computed figures
pub async fn update_report(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFinancialReport>,
) -> Result<ResponseJson<ApiResponse<FinancialReport>>, ApiError> {
    let report = FinancialService::update(&deployment.db().pool, id, &payload).await?;
    deployment.log_activity("update", "financial_reports", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// DELETE /api/financial-reports/{id}
pub async fn delete_report(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if FinancialReport::delete(&deployment.db().pool, id).await? == 0 {
        return Err(FinancialError::NotFound.into());
    }
    deployment.log_activity("delete", "financial_reports", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/financial-reports",
        Router::new()
            .route("/", get(get_reports).post(create_report))
            .route("/summary", get(get_summary))
            .route("/export.csv", get(export_reports))
            .route("/report.html", get(print_reports))
            .route(
                "/{id}",
                get(get_report).put(update_report).delete(delete_report),
            ),
    )
}
