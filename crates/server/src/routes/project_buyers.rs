//! Routes for project buyers.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project_buyer::{CreateProjectBuyer, ProjectBuyer, UpdateProjectBuyer};
use deployment::Deployment;
use serde::Deserialize;
use serde_json::json;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerQuery {
    pub project_id: Option<Uuid>,
}

fn validate(
    buyer_name: Option<&str>,
    quantity: Option<i64>,
    unit_price: Option<f64>,
) -> Result<(), ApiError> {
    if buyer_name.is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("buyerName is required".to_string()));
    }
    if quantity.is_some_and(|q| q < 0) || unit_price.is_some_and(|p| !(p >= 0.0)) {
        return Err(ApiError::BadRequest(
            "quantity and unitPrice cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_buyers(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<BuyerQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectBuyer>>>, ApiError> {
    let pool = &deployment.db().pool;
    let buyers = match query.project_id {
        Some(project_id) => ProjectBuyer::find_by_project_id(pool, project_id).await?,
        None => ProjectBuyer::find_all(pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(buyers)))
}

pub async fn get_buyer(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ProjectBuyer>>, ApiError> {
    let buyer = ProjectBuyer::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Project buyer"))?;
    Ok(ResponseJson(ApiResponse::success(buyer)))
}

pub async fn create_buyer(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateProjectBuyer>,
) -> Result<ResponseJson<ApiResponse<ProjectBuyer>>, ApiError> {
    validate(
        Some(&payload.buyer_name),
        Some(payload.quantity),
        Some(payload.unit_price),
    )?;
    let buyer = ProjectBuyer::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    deployment.log_activity(
        "create",
        "project_buyers",
        Some(buyer.id),
        json!({ "projectId": buyer.project_id, "totalAmount": buyer.total_amount }),
    );
    Ok(ResponseJson(ApiResponse::success(buyer)))
}

pub async fn update_buyer(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectBuyer>,
) -> Result<ResponseJson<ApiResponse<ProjectBuyer>>, ApiError> {
    validate(
        payload.buyer_name.as_deref(),
        payload.quantity,
        payload.unit_price,
    )?;
    let buyer = ProjectBuyer::update(&deployment.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Project buyer"))?;
    deployment.log_activity("update", "project_buyers", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(buyer)))
}

pub async fn delete_buyer(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if ProjectBuyer::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Project buyer"));
    }
    deployment.log_activity("delete", "project_buyers", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/project-buyers",
        Router::new()
            .route("/", get(get_buyers).post(create_buyer))
            .route(
                "/{id}",
                get(get_buyer).put(update_buyer).delete(delete_buyer),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn negative_quantity_is_rejected() {
        let (app, _) = app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/project-buyers",
            Some(json!({
                "projectId": uuid::Uuid::new_v4(),
                "buyerName": "Davao Meat Traders",
                "quantity": -1,
                "unitPrice": 180.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
