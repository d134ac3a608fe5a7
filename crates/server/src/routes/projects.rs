//! Routes for livelihood projects.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project::{CreateProject, Project, UpdateProject};
use deployment::Deployment;
use serde_json::json;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path}};

fn validate(name: Option<&str>, budget: Option<f64>) -> Result<(), ApiError> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    if budget.is_some_and(|b| !(b >= 0.0)) {
        return Err(ApiError::BadRequest("budget cannot be negative".to_string()));
    }
    Ok(())
}

/// List all projects
pub async fn get_projects(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = Project::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn get_project(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = Project::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// Create a project
pub async fn create_project(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    validate(Some(&payload.name), payload.budget)?;
    let project = Project::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    deployment.log_activity(
        "create",
        "projects",
        Some(project.id),
        json!({ "name": project.name }),
    );
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// Update a project
pub async fn update_project(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    validate(payload.name.as_deref(), payload.budget)?;
    let project = Project::update(&deployment.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    deployment.log_activity("update", "projects", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn delete_project(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Project::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Project"));
    }
    deployment.log_activity("delete", "projects", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/projects",
        Router::new()
            .route("/", get(get_projects).post(create_project))
            .route(
                "/{id}",
                get(get_project).put(update_project).delete(delete_project),
            ),
    )
}
