//! Routes for the user activity log.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::activity_log::{ActivityLog, CreateActivityLog};
use deployment::Deployment;
use services::services::{activity::ActivityLogService, filters::ActivityLogQuery};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, extract::{Json, Query}};

/// Recent activity, newest first, filtered by action and resource
pub async fn get_activity_logs(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ActivityLog>>>, ApiError> {
    let logs = ActivityLogService::list(deployment.db(), &query.into()).await?;
    Ok(ResponseJson(ApiResponse::success(logs)))
}

/// Entries reported by the console itself, e.g. page views
pub async fn create_activity_log(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateActivityLog>,
) -> Result<ResponseJson<ApiResponse<ActivityLog>>, ApiError> {
    let log = ActivityLogService::record(deployment.db(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(log)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/activity-logs",
        get(get_activity_logs).post(create_activity_log),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn console_entries_are_listed_with_filters() {
        let (app, _) = app().await;
        for action in ["view", "view", "print"] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/activity-logs",
                Some(json!({"action": action, "resource": "dashboard", "userName": "admin"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, views) = send(&app, Method::GET, "/api/activity-logs?action=view&limit=1", None).await;
        let views = views["data"].as_array().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0]["action"], "view");
        assert_eq!(views[0]["details"], json!({}));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/activity-logs",
            Some(json!({"action": "", "resource": "dashboard"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
