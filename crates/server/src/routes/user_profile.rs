//! Routes for the dashboard operator profile.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::user_profile::{UpdateUserProfile, UserProfile};
use deployment::Deployment;
use serde_json::json;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, extract::Json};

/// Get the operator profile
pub async fn get_profile(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let profile = UserProfile::get(&deployment.db().pool)
        .await?
        .ok_or(ApiError::NotFound("User profile"))?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

/// Update the operator profile
pub async fn update_profile(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<UpdateUserProfile>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    if payload.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("fullName cannot be blank".to_string()));
    }
    if payload.email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(ApiError::BadRequest("email is not valid".to_string()));
    }
    let profile = UserProfile::update(&deployment.db().pool, &payload)
        .await?
        .ok_or(ApiError::NotFound("User profile"))?;
    deployment.log_activity("update", "user_profile", None, json!({}));
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/user/profile", get(get_profile).put(update_profile))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn seeded_profile_can_be_updated() {
        let (app, _) = app().await;
        let (status, profile) = send(&app, Method::GET, "/api/user/profile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["data"]["fullName"], "SLP Administrator");
        assert!(profile["data"].get("id").is_none());

        let (_, updated) = send(
            &app,
            Method::PUT,
            "/api/user/profile",
            Some(json!({"office": "DSWD Field Office XI"})),
        )
        .await;
        assert_eq!(updated["data"]["office"], "DSWD Field Office XI");
        assert_eq!(updated["data"]["email"], "admin@slp.local");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/user/profile",
            Some(json!({"email": "not-an-email"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
