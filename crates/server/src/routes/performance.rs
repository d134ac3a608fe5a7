//! Routes for manual performance assessments.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::performance_assessment::{CreatePerformanceAssessment, PerformanceAssessment};
use deployment::Deployment;
use serde::Deserialize;
use serde_json::json;
use services::services::performance::{PerformanceError, PerformanceService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::{Json, Path, Query}};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuery {
    pub caretaker_id: Option<Uuid>,
}

/// GET /api/performance/assessments
/// List assessments, optionally for one caretaker
pub async fn get_assessments(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<AssessmentQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<PerformanceAssessment>>>, ApiError> {
    let assessments =
        PerformanceService::list_assessments(&deployment.db().pool, query.caretaker_id).await?;
    Ok(ResponseJson(ApiResponse::success(assessments)))
}

/// GET /api/performance/assessments/{id}
pub async fn get_assessment(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<PerformanceAssessment>>, ApiError> {
    let assessment = PerformanceAssessment::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or(PerformanceError::AssessmentNotFound)?;
    Ok(ResponseJson(ApiResponse::success(assessment)))
}

/// POST /api/performance/assessments
/// Record an assessment; the overall rating uses the category weights
pub async fn create_assessment(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreatePerformanceAssessment>,
) -> Result<ResponseJson<ApiResponse<PerformanceAssessment>>, ApiError> {
    let assessment = PerformanceService::create_assessment(&deployment.db().pool, &payload).await?;
    deployment.log_activity(
        "create",
        "performance_assessments",
        Some(assessment.id),
        json!({
            "caretakerId": assessment.caretaker_id,
            "overallRating": assessment.overall_rating,
        }),
    );
    Ok(ResponseJson(ApiResponse::success(assessment)))
}

/// DELETE /api/performance/assessments/{id}
pub async fn delete_assessment(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    PerformanceService::delete_assessment(&deployment.db().pool, id).await?;
    deployment.log_activity("delete", "performance_assessments", Some(id), json!({}));
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/performance/assessments",
        Router::new()
            .route("/", get(get_assessments).post(create_assessment))
            .route("/{id}", get(get_assessment).delete(delete_assessment)),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn assessment_lifecycle() {
        let (app, _) = app().await;
        let (_, caretaker) = send(
            &app,
            Method::POST,
            "/api/caretakers",
            Some(json!({"firstName": "Lorna", "lastName": "Garcia"})),
        )
        .await;
        let caretaker_id = caretaker["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/performance/assessments",
            Some(json!({
                "caretakerId": caretaker_id,
                "punctuality": 4.0,
                "communication": 4.0,
                "patientCare": 5.0,
                "professionalism": 3.0,
                "technicalSkills": 4.0,
                "assessedBy": "M. Dela Cruz"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // 0.8 + 0.8 + 1.25 + 0.45 + 0.8
        assert_eq!(body["data"]["overallRating"], 4.1);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, listed) = send(
            &app,
            Method::GET,
            &format!("/api/performance/assessments?caretakerId={caretaker_id}"),
            None,
        )
        .await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let uri = format!("/api/performance/assessments/{id}");
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/performance/assessments",
            Some(json!({
                "caretakerId": uuid::Uuid::new_v4(),
                "punctuality": 6.0,
                "communication": 4.0,
                "patientCare": 5.0,
                "professionalism": 3.0,
                "technicalSkills": 4.0,
                "assessedBy": "M. Dela Cruz"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "punctuality must be between 1 and 5");
    }
}
