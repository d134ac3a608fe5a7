//! Routes for the pig registry.

use axum::{
    Router,
    extract::State,
    response::{Json as ResponseJson, Response},
    routing::get,
};
use db::models::{
    caretaker::Caretaker,
    pig::{CreatePig, Pig, UpdatePig},
};
use deployment::Deployment;
use serde_json::json;
use services::services::{export::pigs_table, filters::PigFilter};
use utils::response::ApiResponse;
use uuid::Uuid;

use super::csv_attachment;
use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

fn validate_weight(weight: f64) -> Result<(), ApiError> {
    if !(weight >= 0.0) {
        return Err(ApiError::BadRequest("weight cannot be negative".to_string()));
    }
    Ok(())
}

/// Display name of the linked caretaker, when the link resolves
async fn caretaker_name(
    deployment: &DeploymentImpl,
    caretaker_id: Option<Uuid>,
) -> Result<Option<String>, ApiError> {
    let Some(id) = caretaker_id else {
        return Ok(None);
    };
    Ok(Caretaker::find_by_id(&deployment.db().pool, id)
        .await?
        .map(|c| c.full_name()))
}

async fn filtered_pigs(
    deployment: &DeploymentImpl,
    filter: &PigFilter,
) -> Result<Vec<Pig>, ApiError> {
    let pool = &deployment.db().pool;
    let pigs = match filter.caretaker_id {
        Some(id) => Pig::find_by_caretaker_id(pool, id).await?,
        None => Pig::find_all(pool).await?,
    };
    Ok(pigs
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect())
}

/// List pigs matching the search and filters
pub async fn get_pigs(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<PigFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Pig>>>, ApiError> {
    let pigs = filtered_pigs(&deployment, &filter).await?;
    if let Some(term) = filter.search_term() {
        deployment.log_activity("search", "pigs", None, json!({ "query": term }));
    }
    Ok(ResponseJson(ApiResponse::success(pigs)))
}

/// Download the filtered pigs as CSV
pub async fn export_pigs(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<PigFilter>,
) -> Result<Response, ApiError> {
    let pigs = filtered_pigs(&deployment, &filter).await?;
    let csv = pigs_table(&pigs).to_csv();
    deployment.log_activity(
        "export",
        "pigs",
        None,
        json!({ "format": "csv", "rows": pigs.len() }),
    );
    Ok(csv_attachment("pigs", csv))
}

pub async fn get_pig(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Pig>>, ApiError> {
    let pig = Pig::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Pig"))?;
    Ok(ResponseJson(ApiResponse::success(pig)))
}

/// Register a pig; the caretaker name follows the linked caretaker
pub async fn create_pig(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreatePig>,
) -> Result<ResponseJson<ApiResponse<Pig>>, ApiError> {
    validate_weight(payload.weight)?;
    let name = caretaker_name(&deployment, payload.caretaker_id).await?;
    let pig = Pig::create(
        &deployment.db().pool,
        &payload,
        name.as_deref(),
        Uuid::new_v4(),
    )
    .await?;
    deployment.log_activity(
        "create",
        "pigs",
        Some(pig.id),
        json!({ "caretakerName": pig.caretaker_name }),
    );
    Ok(ResponseJson(ApiResponse::success(pig)))
}

/// Update a pig; `null` unlinks the caretaker or clears optional fields
pub async fn update_pig(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePig>,
) -> Result<ResponseJson<ApiResponse<Pig>>, ApiError> {
    if let Some(weight) = payload.weight {
        validate_weight(weight)?;
    }
    let name = caretaker_name(&deployment, payload.caretaker_id.flatten()).await?;
    let pig = Pig::update(&deployment.db().pool, id, &payload, name.as_deref())
        .await?
        .ok_or(ApiError::NotFound("Pig"))?;
    deployment.log_activity("update", "pigs", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(pig)))
}

pub async fn delete_pig(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Pig::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Pig"));
    }
    deployment.log_activity("delete", "pigs", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/pigs",
        Router::new()
            .route("/", get(get_pigs).post(create_pig))
            .route("/export.csv", get(export_pigs))
            .route("/{id}", get(get_pig).put(update_pig).delete(delete_pig)),
    )
}
