//! Database health endpoint.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use services::services::health::{HealthReport, HealthService};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

/// Migration and table status of the registry database
pub async fn health_check(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<HealthReport>>, ApiError> {
    let report = HealthService::check(&deployment.db().pool).await?;
    let summary = report.summary();
    Ok(ResponseJson(ApiResponse::success_with_message(report, summary)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn health_reports_migrated_database() {
        let (app, _) = app().await;
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["databaseInitialized"], true);
        assert_eq!(body["data"]["missingTables"], serde_json::json!([]));
    }
}
