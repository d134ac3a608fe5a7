use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope for every JSON body the API returns
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response, with `data` and no message.
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Creates a successful response carrying a human-readable note.
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// Creates an error response, with `message` and no data.
    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error("Caretaker not found")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "data": null,
                "message": "Caretaker not found"
            })
        );
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2, 3])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
        assert!(body["message"].is_null());

        let body =
            serde_json::to_value(ApiResponse::success_with_message((), "Database OK")).unwrap();
        assert_eq!(body["message"], "Database OK");
    }
}
