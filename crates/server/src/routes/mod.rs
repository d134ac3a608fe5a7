use axum::{
    Router,
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utils::text::dated_filename;

use crate::DeploymentImpl;

pub mod activity_logs;
pub mod associations;
pub mod caretakers;
pub mod financial_reports;
pub mod health;
pub mod issues;
pub mod monitoring;
pub mod performance;
pub mod pigs;
pub mod project_buyers;
pub mod projects;
pub mod ratings;
pub mod user_profile;

/// All `/api` routes with request tracing and permissive CORS
pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(associations::router(&deployment))
        .merge(caretakers::router(&deployment))
        .merge(pigs::router(&deployment))
        .merge(monitoring::router(&deployment))
        .merge(performance::router(&deployment))
        .merge(ratings::router(&deployment))
        .merge(financial_reports::router(&deployment))
        .merge(projects::router(&deployment))
        .merge(issues::router(&deployment))
        .merge(project_buyers::router(&deployment))
        .merge(activity_logs::router(&deployment))
        .merge(user_profile::router(&deployment));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(deployment)
}

/// `text/csv` attachment named `<name>-<YYYY-MM-DD>.csv`
pub(crate) fn csv_attachment(name: &str, body: String) -> Response {
    let filename = dated_filename(name, Utc::now().date_naive(), "csv");
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub(crate) fn html_document(body: String) -> Response {
    Html(body).into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::DeploymentImpl;

    pub async fn app() -> (Router, DeploymentImpl) {
        let deployment = DeploymentImpl::in_memory().await.unwrap();
        (super::router(deployment.clone()), deployment)
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = send_raw(app, method, uri, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }
}
