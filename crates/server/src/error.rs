use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::{
    activity::ActivityLogError, financial::FinancialError, health::HealthError,
    monitoring::MonitoringError, performance::PerformanceError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Performance(#[from] PerformanceError),
    #[error(transparent)]
    Financial(#[from] FinancialError),
    #[error(transparent)]
    Monitoring(#[from] MonitoringError),
    #[error(transparent)]
    ActivityLog(#[from] ActivityLogError),
    #[error(transparent)]
    Health(#[from] HealthError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Performance(err) => match err {
                PerformanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PerformanceError::CaretakerNotFound | PerformanceError::AssessmentNotFound => {
                    StatusCode::NOT_FOUND
                }
                PerformanceError::RatingOutOfRange(_) | PerformanceError::MissingAssessor => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::Financial(err) => match err {
                FinancialError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                FinancialError::NotFound => StatusCode::NOT_FOUND,
                FinancialError::NegativeAmount(_)
                | FinancialError::InvalidShareRate
                | FinancialError::MissingReportingPeriod => StatusCode::BAD_REQUEST,
            },
            ApiError::Monitoring(err) => match err {
                MonitoringError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                MonitoringError::NotFound => StatusCode::NOT_FOUND,
                MonitoringError::NoAssociations | MonitoringError::NegativeGrossSales => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::ActivityLog(err) => match err {
                ActivityLogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ActivityLogError::MissingField => StatusCode::BAD_REQUEST,
            },
            ApiError::Health(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, ResponseJson(ApiResponse::<()>::error(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            ApiError::from(FinancialError::InvalidShareRate).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PerformanceError::CaretakerNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(sqlx::Error::PoolClosed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::NotFound("Pig").to_string(), "Pig not found");
    }
}
