use crate::domain::DomainError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::error;

/// JSON error body returned for every failed request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    #[serde(rename = "errorCode")]
    pub error_code: Value,
}

impl ErrorResponse {
    fn new(status: StatusCode, code: &str, user_message: String, payload: Value) -> Self {
        let mut error_code = Map::new();
        error_code.insert("code".to_string(), Value::String(code.to_string()));
        error_code.insert("userMessage".to_string(), Value::String(user_message));
        if let Value::Object(fields) = payload {
            error_code.extend(fields);
        }
        Self {
            status: status.as_u16(),
            error_code: Value::Object(error_code),
        }
    }
}

/// Map a domain error to an HTTP status and error body
pub fn domain_error_to_response(error: &DomainError) -> (StatusCode, ErrorResponse) {
    let message = error.to_string();
    let (status, code, payload) = match error {
        DomainError::BarcodeNotFound(_) => (StatusCode::BAD_REQUEST, "NOT_FOUND", json!({})),

        DomainError::DuplicateBarcode {
            scanned_date,
            scanned_location,
            created_by,
            ..
        } => (
            StatusCode::BAD_REQUEST,
            "DUPLICATE",
            json!({
                "scannedDate": scanned_date,
                "scannedLocation": scanned_location,
                "createdBy": created_by,
            }),
        ),

        DomainError::ExpiredBarcode {
            created_date,
            barcode_expiry_days,
            created_by,
            ..
        } => (
            StatusCode::BAD_REQUEST,
            "EXPIRED",
            json!({
                "createdDate": created_date,
                "barcodeExpiryDays": barcode_expiry_days,
                "createdBy": created_by,
            }),
        ),

        DomainError::RandomCheckRequired { created_by, .. } => (
            StatusCode::BAD_REQUEST,
            "RANDOM_CHECK",
            json!({ "createdBy": created_by }),
        ),

        DomainError::RecipientNotFound(_) => {
            (StatusCode::NOT_FOUND, "RECIPIENT_NOT_FOUND", json!({}))
        }

        DomainError::BarcodeAlreadyExists(_) => {
            (StatusCode::CONFLICT, "BARCODE_ALREADY_EXISTS", json!({}))
        }

        DomainError::InvalidEmail(_) | DomainError::ValidationError(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", json!({}))
        }

        DomainError::EmailNotInCjsmDirectory(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_CJSM_EMAIL", json!({}))
        }

        DomainError::InvalidSignInCode => {
            (StatusCode::UNAUTHORIZED, "INVALID_SIGN_IN_CODE", json!({}))
        }

        DomainError::SignInCodeExpired => {
            (StatusCode::UNAUTHORIZED, "SIGN_IN_CODE_EXPIRED", json!({}))
        }

        DomainError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", json!({})),

        DomainError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", json!({})),

        DomainError::InvalidBarcodeStatus(_)
        | DomainError::NoReportRecipients
        | DomainError::RepositoryError(_) => {
            error!(error = %error, "internal error while handling request");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                    json!({}),
                ),
            );
        }
    };

    (status, ErrorResponse::new(status, code, message, payload))
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, body) = domain_error_to_response(&self);
        (status, Json(body)).into_response()
    }
}
