//! Routes for SLP associations, including archiving.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::association::{Association, CreateAssociation, UpdateAssociation};
use deployment::Deployment;
use serde_json::json;
use services::services::filters::AssociationFilter;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

/// Member counts must be non-negative and active cannot exceed total
fn validate_members(total: i64, active: i64) -> Result<(), ApiError> {
    if total < 0 || active < 0 {
        return Err(ApiError::BadRequest(
            "member counts cannot be negative".to_string(),
        ));
    }
    if active > total {
        return Err(ApiError::BadRequest(
            "activeMembers cannot exceed totalMembers".to_string(),
        ));
    }
    Ok(())
}

/// List associations; archived ones only with `includeArchived`
pub async fn get_associations(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<AssociationFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Association>>>, ApiError> {
    let associations: Vec<Association> = Association::find_all(&deployment.db().pool)
        .await?
        .into_iter()
        .filter(|a| filter.matches(a))
        .collect();

    if let Some(term) = filter.search_term() {
        deployment.log_activity("search", "associations", None, json!({ "query": term }));
    }
    Ok(ResponseJson(ApiResponse::success(associations)))
}

/// Get a single association
pub async fn get_association(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Association>>, ApiError> {
    let association = Association::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Association"))?;
    Ok(ResponseJson(ApiResponse::success(association)))
}

/// Create an association
pub async fn create_association(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateAssociation>,
) -> Result<ResponseJson<ApiResponse<Association>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    validate_members(
        payload.total_members.unwrap_or(0),
        payload.active_members.unwrap_or(0),
    )?;

    let association = Association::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    deployment.log_activity(
        "create",
        "associations",
        Some(association.id),
        json!({ "name": association.name }),
    );
    Ok(ResponseJson(ApiResponse::success(association)))
}

/// Update an association
pub async fn update_association(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssociation>,
) -> Result<ResponseJson<ApiResponse<Association>>, ApiError> {
    let pool = &deployment.db().pool;
    let existing = Association::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound("Association"))?;
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("name cannot be blank".to_string()));
    }
    validate_members(
        payload.total_members.unwrap_or(existing.total_members),
        payload.active_members.unwrap_or(existing.active_members),
    )?;

    let association = Association::update(pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Association"))?;
    deployment.log_activity("update", "associations", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(association)))
}

async fn set_archived(
    deployment: &DeploymentImpl,
    id: Uuid,
    archived: bool,
) -> Result<Association, ApiError> {
    let association = Association::set_archived(&deployment.db().pool, id, archived)
        .await?
        .ok_or(ApiError::NotFound("Association"))?;
    deployment.log_activity(
        if archived { "archive" } else { "unarchive" },
        "associations",
        Some(id),
        json!({ "name": association.name }),
    );
    Ok(association)
}

/// Archive an association, hiding it from default listings
pub async fn archive_association(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Association>>, ApiError> {
    let association = set_archived(&deployment, id, true).await?;
    Ok(ResponseJson(ApiResponse::success(association)))
}

/// Restore an archived association
pub async fn unarchive_association(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Association>>, ApiError> {
    let association = set_archived(&deployment, id, false).await?;
    Ok(ResponseJson(ApiResponse::success(association)))
}

/// Delete an association
pub async fn delete_association(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Association::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Association"));
    }
    deployment.log_activity("delete", "associations", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/associations",
        Router::new()
            .route("/", get(get_associations).post(create_association))
            .route(
                "/{id}",
                get(get_association)
                    .put(update_association)
                    .delete(delete_association),
            )
            .route("/{id}/archive", post(archive_association))
            .route("/{id}/unarchive", post(unarchive_association)),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn archived_associations_are_hidden_unless_requested() {
        let (app, _) = app().await;
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/associations",
            Some(json!({"name": "Kapatiran SLPA", "location": "Carmen", "totalMembers": 25, "activeMembers": 20})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::POST, &format!("/api/associations/{id}/archive"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) = send(&app, Method::GET, "/api/associations", None).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 0);

        let (_, listed) = send(&app, Method::GET, "/api/associations?includeArchived=true", None).await;
        assert_eq!(listed["data"][0]["archived"], true);
    }

    #[tokio::test]
    async fn rejects_more_active_than_total_members() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/associations",
            Some(json!({"name": "Bayanihan", "location": "Tagum", "totalMembers": 2, "activeMembers": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "activeMembers cannot exceed totalMembers");
    }

    #[tokio::test]
    async fn missing_association_is_not_found() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/associations/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Association not found");
    }
}
