//! Routes for caretaker records and their CSV export.

use std::collections::HashMap;

use axum::{
    Router,
    extract::State,
    response::{Json as ResponseJson, Response},
    routing::get,
};
use db::models::{
    association::Association,
    caretaker::{Caretaker, CreateCaretaker, UpdateCaretaker},
};
use deployment::Deployment;
use serde_json::json;
use services::services::{
    export::caretakers_table, filters::CaretakerFilter, performance::UNKNOWN_ASSOCIATION,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use super::csv_attachment;
use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

/// Fetch caretakers and associations together and apply the filter
async fn filtered_caretakers(
    deployment: &DeploymentImpl,
    filter: &CaretakerFilter,
) -> Result<(Vec<Caretaker>, HashMap<Uuid, String>), ApiError> {
    let pool = &deployment.db().pool;
    let members = async {
        match filter.association_id {
            Some(id) => Caretaker::find_by_association_id(pool, id).await,
            None => Caretaker::find_all(pool).await,
        }
    };
    let (caretakers, associations) = tokio::try_join!(members, Association::find_all(pool))?;
    let names: HashMap<Uuid, String> = associations.into_iter().map(|a| (a.id, a.name)).collect();

    let caretakers = caretakers
        .into_iter()
        .filter(|c| {
            let association_name = c
                .slp_association
                .and_then(|id| names.get(&id))
                .map(String::as_str)
                .unwrap_or(UNKNOWN_ASSOCIATION);
            filter.matches(c, association_name)
        })
        .collect();
    Ok((caretakers, names))
}

/// List caretakers matching the search and filters
pub async fn get_caretakers(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<CaretakerFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Caretaker>>>, ApiError> {
    let (caretakers, _) = filtered_caretakers(&deployment, &filter).await?;
    if let Some(term) = filter.search_term() {
        deployment.log_activity("search", "caretakers", None, json!({ "query": term }));
    }
    Ok(ResponseJson(ApiResponse::success(caretakers)))
}

/// Download the filtered caretakers as CSV
pub async fn export_caretakers(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<CaretakerFilter>,
) -> Result<Response, ApiError> {
    let (caretakers, names) = filtered_caretakers(&deployment, &filter).await?;
    let csv = caretakers_table(&caretakers, &names).to_csv();
    deployment.log_activity(
        "export",
        "caretakers",
        None,
        json!({ "format": "csv", "rows": caretakers.len() }),
    );
    Ok(csv_attachment("caretakers", csv))
}

/// Get a single caretaker
pub async fn get_caretaker(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Caretaker>>, ApiError> {
    let caretaker = Caretaker::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Caretaker"))?;
    Ok(ResponseJson(ApiResponse::success(caretaker)))
}

/// Register a caretaker
pub async fn create_caretaker(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateCaretaker>,
) -> Result<ResponseJson<ApiResponse<Caretaker>>, ApiError> {
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "firstName and lastName are required".to_string(),
        ));
    }
    let caretaker = Caretaker::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    deployment.log_activity(
        "create",
        "caretakers",
        Some(caretaker.id),
        json!({ "name": caretaker.full_name() }),
    );
    Ok(ResponseJson(ApiResponse::success(caretaker)))
}

/// Update a caretaker; `null` clears optional fields
pub async fn update_caretaker(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCaretaker>,
) -> Result<ResponseJson<ApiResponse<Caretaker>>, ApiError> {
    let blank = |value: &Option<String>| value.as_deref().is_some_and(|v| v.trim().is_empty());
    if blank(&payload.first_name) || blank(&payload.last_name) {
        return Err(ApiError::BadRequest(
            "firstName and lastName cannot be blank".to_string(),
        ));
    }
    let caretaker = Caretaker::update(&deployment.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Caretaker"))?;
    deployment.log_activity("update", "caretakers", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(caretaker)))
}

/// Delete a caretaker
pub async fn delete_caretaker(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Caretaker::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Caretaker"));
    }
    deployment.log_activity("delete", "caretakers", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/caretakers",
        Router::new()
            .route("/", get(get_caretakers).post(create_caretaker))
            .route("/export.csv", get(export_caretakers))
            .route(
                "/{id}",
                get(get_caretaker)
                    .put(update_caretaker)
                    .delete(delete_caretaker),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode, header};
    use serde_json::json;

    use crate::routes::test_support::{app, send, send_raw};

    #[tokio::test]
    async fn search_and_export_share_the_filter() {
        let (app, _) = app().await;
        let (_, association) = send(
            &app,
            Method::POST,
            "/api/associations",
            Some(json!({"name": "Kapatiran SLPA", "location": "Carmen"})),
        )
        .await;
        let association_id = association["data"]["id"].as_str().unwrap();

        for (first, last, linked) in [("Lorna", "Garcia", true), ("Pedro", "Santos", false)] {
            let mut body = json!({"firstName": first, "lastName": last, "barangay": "Ising"});
            if linked {
                body["slpAssociation"] = json!(association_id);
            }
            let (status, _) = send(&app, Method::POST, "/api/caretakers", Some(body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, found) = send(&app, Method::GET, "/api/caretakers?search=kapatiran", None).await;
        let found = found["data"].as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["firstName"], "Lorna");

        let (_, members) = send(
            &app,
            Method::GET,
            &format!("/api/caretakers?associationId={association_id}"),
            None,
        )
        .await;
        assert_eq!(members["data"].as_array().unwrap().len(), 1);

        let (status, headers, body) =
            send_raw(&app, Method::GET, "/api/caretakers/export.csv", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"caretakers-"));
        let csv = String::from_utf8(body).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("Pedro Santos,Ising"));
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let (app, _) = app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/caretakers",
            Some(json!({"firstName": " ", "lastName": "Garcia"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn null_in_update_clears_association_link() {
        let (app, _) = app().await;
        let (_, association) = send(
            &app,
            Method::POST,
            "/api/associations",
            Some(json!({"name": "Kapatiran SLPA", "location": "Carmen"})),
        )
        .await;
        let (_, caretaker) = send(
            &app,
            Method::POST,
            "/api/caretakers",
            Some(json!({
                "firstName": "Lorna",
                "lastName": "Garcia",
                "contactNumber": "09171234567",
                "slpAssociation": association["data"]["id"],
            })),
        )
        .await;
        let uri = format!("/api/caretakers/{}", caretaker["data"]["id"].as_str().unwrap());

        let (status, kept) = send(&app, Method::PUT, &uri, Some(json!({"barangay": "Ising"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kept["data"]["slpAssociation"], association["data"]["id"]);

        let (status, cleared) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"slpAssociation": null, "contactNumber": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(cleared["data"]["slpAssociation"].is_null());
        assert!(cleared["data"]["contactNumber"].is_null());
        assert_eq!(cleared["data"]["barangay"], "Ising");
    }

    #[tokio::test]
    async fn rejected_requests_still_use_the_envelope() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/caretakers",
            Some(json!({"lastName": "Garcia"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("firstName"));

        let (status, body) = send(&app, Method::GET, "/api/caretakers/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) =
            send(&app, Method::GET, "/api/caretakers?status=retired", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
