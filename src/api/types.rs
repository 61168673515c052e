// Request and response types for the workflow REST API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::WorkflowError;

/// Body of `POST /api/instances`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    pub definition_id: String,
}

/// Body of `POST /api/instances/:id/execute`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteActionRequest {
    pub action_id: String,
}

/// Error response format
///
/// ```json
/// {"error": {"message": "action 'x' is disabled", "code": "VALIDATION_ERROR"}}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
}

/// Helper function to build an error response
pub fn create_error_response(status: StatusCode, message: String, code: &str) -> ErrorResponse {
    ErrorResponse {
        status,
        error: ErrorDetail {
            message,
            code: code.to_string(),
        },
    }
}

impl ErrorResponse {
    pub fn not_found(message: String) -> Self {
        create_error_response(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }
}

/// Status code for each engine error
///
/// Validation failures are the client's fault, a lost race is a 409, and
/// anything from storage or serialization is on the server.
pub fn status_for(error: &WorkflowError) -> StatusCode {
    match error {
        WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
        WorkflowError::Conflict(_) => StatusCode::CONFLICT,
        WorkflowError::Storage(_)
        | WorkflowError::Serialization(_)
        | WorkflowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<WorkflowError> for ErrorResponse {
    fn from(error: WorkflowError) -> Self {
        create_error_response(status_for(&error), error.reason(), error.error_code())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let response = ErrorResponse::from(WorkflowError::validation("bad"));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(response.error.message, "bad");

        let response = ErrorResponse::from(WorkflowError::Conflict("raced".into()));
        assert_eq!(response.status, StatusCode::CONFLICT);

        let response = ErrorResponse::from(WorkflowError::Internal("boom".into()));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorResponse::not_found("gone".into())).unwrap();
        assert_eq!(body, serde_json::json!({"error": {"message": "gone", "code": "NOT_FOUND"}}));
    }

    #[test]
    fn test_request_bodies_are_camel_case() {
        let request: CreateInstanceRequest =
            serde_json::from_value(serde_json::json!({"definitionId": "wf-1"})).unwrap();
        assert_eq!(request.definition_id, "wf-1");

        let request: ExecuteActionRequest =
            serde_json::from_value(serde_json::json!({"actionId": "submit"})).unwrap();
        assert_eq!(request.action_id, "submit");
    }
}
