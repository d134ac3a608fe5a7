//! Routes for project issues.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::issue::{CreateIssue, Issue, UpdateIssue};
use deployment::Deployment;
use serde::Deserialize;
use serde_json::json;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueQuery {
    pub project_id: Option<Uuid>,
}

/// List issues, optionally for one project
pub async fn get_issues(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<IssueQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Issue>>>, ApiError> {
    let pool = &deployment.db().pool;
    let issues = match query.project_id {
        Some(project_id) => Issue::find_by_project_id(pool, project_id).await?,
        None => Issue::find_all(pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(issues)))
}

pub async fn get_issue(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Issue>>, ApiError> {
    let issue = Issue::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Issue"))?;
    Ok(ResponseJson(ApiResponse::success(issue)))
}

pub async fn create_issue(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateIssue>,
) -> Result<ResponseJson<ApiResponse<Issue>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    let issue = Issue::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    deployment.log_activity(
        "create",
        "issues",
        Some(issue.id),
        json!({ "projectId": issue.project_id, "severity": issue.severity.to_string() }),
    );
    Ok(ResponseJson(ApiResponse::success(issue)))
}

pub async fn update_issue(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIssue>,
) -> Result<ResponseJson<ApiResponse<Issue>>, ApiError> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("title cannot be blank".to_string()));
    }
    let issue = Issue::update(&deployment.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Issue"))?;
    deployment.log_activity(
        "update",
        "issues",
        Some(id),
        json!({ "status": issue.status.to_string() }),
    );
    Ok(ResponseJson(ApiResponse::success(issue)))
}

pub async fn delete_issue(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Issue::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Issue"));
    }
    deployment.log_activity("delete", "issues", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/issues",
        Router::new()
            .route("/", get(get_issues).post(create_issue))
            .route(
                "/{id}",
                get(get_issue).put(update_issue).delete(delete_issue),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn issues_are_scoped_by_project() {
        let (app, _) = app().await;
        let project_id = uuid::Uuid::new_v4();
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/issues",
            Some(json!({"projectId": project_id, "title": "Feed delivery delayed", "severity": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["data"]["status"], "open");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (_, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/issues/{id}"),
            Some(json!({"status": "in-progress"})),
        )
        .await;
        assert_eq!(updated["data"]["status"], "in-progress");
        assert_eq!(updated["data"]["severity"], "high");

        let (_, scoped) = send(
            &app,
            Method::GET,
            &format!("/api/issues?projectId={}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(scoped["data"], json!([]));
    }
}
