//! Routes for project monitoring records.

use axum::{
    Router,
    extract::State,
    response::{Json as ResponseJson, Response},
    routing::get,
};
use db::models::{
    association::Association,
    monitoring_record::{CreateMonitoringRecord, MonitoringRecord, UpdateMonitoringRecord},
};
use deployment::Deployment;
use serde_json::json;
use services::services::{
    export::monitoring_table,
    filters::MonitoringFilter,
    monitoring::{MonitoringService, ProjectMonitoringSummary},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use super::csv_attachment;
use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

async fn filtered_records(
    deployment: &DeploymentImpl,
    filter: &MonitoringFilter,
) -> Result<Vec<MonitoringRecord>, ApiError> {
    let pool = &deployment.db().pool;
    let records = match filter.project_id {
        Some(id) => MonitoringRecord::find_by_project_id(pool, id).await?,
        None => MonitoringRecord::find_all(pool).await?,
    };
    Ok(records
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect())
}

/// GET /api/monitoring/records
pub async fn get_records(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<MonitoringFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<MonitoringRecord>>>, ApiError> {
    let records = filtered_records(&deployment, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(records)))
}

/// GET /api/monitoring/records/export.csv
pub async fn export_records(
    State(deployment): State<DeploymentImpl>,
    Query(filter): Query<MonitoringFilter>,
) -> Result<Response, ApiError> {
    let records = filtered_records(&deployment, &filter).await?;
    let csv = monitoring_table(&records).to_csv();
    deployment.log_activity(
        "export",
        "monitoring_records",
        None,
        json!({ "format": "csv", "rows": records.len() }),
    );
    Ok(csv_attachment("monitoring-records", csv))
}

/// GET /api/monitoring/records/{id}
pub async fn get_record(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<MonitoringRecord>>, ApiError> {
    let record = MonitoringRecord::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("Monitoring record"))?;
    Ok(ResponseJson(ApiResponse::success(record)))
}

/// POST /api/monitoring/records
pub async fn create_record(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateMonitoringRecord>,
) -> Result<ResponseJson<ApiResponse<MonitoringRecord>>, ApiError> {
    let record = MonitoringService::create(&deployment.db().pool, &payload).await?;
    deployment.log_activity(
        "create",
        "monitoring_records",
        Some(record.id),
        json!({ "projectId": record.project_id }),
    );
    Ok(ResponseJson(ApiResponse::success(record)))
}

/// PUT /api/monitoring/records/{id}
pub async fn update_record(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMonitoringRecord>,
) -> Result<ResponseJson<ApiResponse<MonitoringRecord>>, ApiError> {
    let record = MonitoringService::update(&deployment.db().pool, id, &payload).await?;
    deployment.log_activity("update", "monitoring_records", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(record)))
}

/// DELETE /api/monitoring/records/{id}
pub async fn delete_record(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if MonitoringRecord::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Monitoring record"));
    }
    deployment.log_activity("delete", "monitoring_records", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Associations that can still be picked for new monitoring records
pub async fn get_monitoring_associations(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Association>>>, ApiError> {
    let associations = Association::find_unarchived(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(associations)))
}

/// GET /api/monitoring/projects
/// Projects with their monitoring roll-up
pub async fn get_monitoring_projects(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectMonitoringSummary>>>, ApiError> {
    let summaries = MonitoringService::project_summaries(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(summaries)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/monitoring",
        Router::new()
            .route("/records", get(get_records).post(create_record))
            .route("/records/export.csv", get(export_records))
            .route(
                "/records/{id}",
                get(get_record).put(update_record).delete(delete_record),
            )
            .route("/associations", get(get_monitoring_associations))
            .route("/projects", get(get_monitoring_projects)),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send, send_raw};

    #[tokio::test]
    async fn records_roll_up_into_project_summary() {
        let (app, _) = app().await;
        let (_, project) = send(
            &app,
            Method::POST,
            "/api/projects",
            Some(json!({"name": "Swine Fattening 2024"})),
        )
        .await;
        let project_id = project["data"]["id"].as_str().unwrap().to_string();
        let association_id = uuid::Uuid::new_v4();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/monitoring/records",
            Some(json!({
                "projectId": project_id,
                "associationIds": [association_id],
                "grossSales": 12000.0,
                "netIncome": 3000.0,
                "monitoringDate": "2024-04-15",
                "status": "submitted"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, summaries) = send(&app, Method::GET, "/api/monitoring/projects", None).await;
        let summary = &summaries["data"][0];
        assert_eq!(summary["recordCount"], 1);
        assert_eq!(summary["submittedCount"], 1);
        assert_eq!(summary["latestMonitoringDate"], "2024-04-15");

        let (_, filtered) = send(
            &app,
            Method::GET,
            &format!("/api/monitoring/records?associationId={association_id}"),
            None,
        )
        .await;
        assert_eq!(filtered["data"].as_array().unwrap().len(), 1);

        let (_, by_project) = send(
            &app,
            Method::GET,
            &format!("/api/monitoring/records?projectId={project_id}"),
            None,
        )
        .await;
        assert_eq!(by_project["data"].as_array().unwrap().len(), 1);
        let (_, other_project) = send(
            &app,
            Method::GET,
            &format!("/api/monitoring/records?projectId={}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(other_project["data"], json!([]));

        let (_, _, csv) =
            send_raw(&app, Method::GET, "/api/monitoring/records/export.csv", None).await;
        assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn record_without_associations_is_rejected() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/monitoring/records",
            Some(json!({
                "projectId": uuid::Uuid::new_v4(),
                "associationIds": [],
                "grossSales": 0.0,
                "netIncome": 0.0,
                "monitoringDate": "2024-04-15"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "at least one association is required");
    }
}
