//! Computed caretaker ratings and their exports.

use axum::{
    Router,
    extract::State,
    response::{Json as ResponseJson, Response},
    routing::get,
};
use chrono::Utc;
use deployment::Deployment;
use serde_json::json;
use services::services::{
    export::{ratings_report, ratings_table},
    filters::RatingFilter,
    performance::{CaretakerRating, PerformanceService, RatingsSummary},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use super::{csv_attachment, html_document};
use crate::{DeploymentImpl, error::ApiError, extract::{Path, Query}};

async fn filtered_ratings(
    deployment: &DeploymentImpl,
    filter: &RatingFilter,
) -> Result<Vec<CaretakerRating>, ApiError> {
    Ok(PerformanceService::list_ratings(&deployment.db().pool)
        .await?
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect())
}

/// GET /api/ratings
/// Score every caretaker and apply the search and rating filters
pub async fn get_ratings(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<RatingFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<CaretakerRating>>>, ApiError> {
    let ratings = filtered_ratings(&deployment, &filter).await?;
    if filter.search_term().is_some() || filter.rating.is_some() {
        deployment.log_activity(
            "filter",
            "ratings",
            None,
            json!({
                "search": filter.search_term(),
                "rating": filter.rating.map(|r| r.to_string()),
            }),
        );
    }
    Ok(ResponseJson(ApiResponse::success(ratings)))
}

/// GET /api/ratings/{caretaker_id}
pub async fn get_rating(
    State(deployment): State<DeploymentImpl>,
    Path(caretaker_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CaretakerRating>>, ApiError> {
    let rating = PerformanceService::rating_for(&deployment.db().pool, caretaker_id).await?;
    Ok(ResponseJson(ApiResponse::success(rating)))
}

/// GET /api/ratings/summary
/// Count, average and distribution across all caretakers
pub async fn get_ratings_summary(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<RatingFilter>,
) -> Result<ResponseJson<ApiResponse<RatingsSummary>>, ApiError> {
    let ratings = filtered_ratings(&deployment, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(
        PerformanceService::summarize(&ratings),
    )))
}

/// GET /api/ratings/export.csv
pub async fn export_ratings(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<RatingFilter>,
) -> Result<Response, ApiError> {
    let ratings = filtered_ratings(&deployment, &filter).await?;
    let csv = ratings_table(&ratings).to_csv();
    deployment.log_activity(
        "export",
        "ratings",
        None,
        json!({ "format": "csv", "rows": ratings.len() }),
    );
    Ok(csv_attachment("caretaker-ratings", csv))
}

/// GET /api/ratings/report.html
/// Printable ratings report
pub async fn print_ratings(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<RatingFilter>,
) -> Result<Response, ApiError> {
    let ratings = filtered_ratings(&deployment, &filter).await?;
    let summary = PerformanceService::summarize(&ratings);
    let html = ratings_report(&ratings, &summary, Utc::now()).render();
    deployment.log_activity(
        "export",
        "ratings",
        None,
        json!({ "format": "print", "rows": ratings.len() }),
    );
    Ok(html_document(html))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/ratings",
        Router::new()
            .route("/", get(get_ratings))
            .route("/summary", get(get_ratings_summary))
            .route("/export.csv", get(export_ratings))
            .route("/report.html", get(print_ratings))
            .route("/{caretaker_id}", get(get_rating)),
    )
}
