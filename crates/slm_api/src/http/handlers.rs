//! JSON handlers. Each one maps a request body onto a domain service call.

use crate::domain::{
    CheckBarcodeRequest, CreateBarcodeRequest, GetRecipientRequest, RecipientDetails,
    RequestSignInCodeRequest, VerifySignInCodeRequest,
};
use crate::http::{AuthenticatedUser, SlmApiState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use common::auth::{ROLE_CREATE_BARCODE, ROLE_SCAN_BARCODE};
use common::domain::{DomainError, Recipient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBarcodeBody {
    pub recipient_name: String,
    pub prison_code: String,
    #[serde(default)]
    pub prison_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBarcodeResponse {
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckBarcodeBody {
    pub barcode: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBarcodeResponse {
    pub created_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResponse {
    pub barcode: String,
    pub recipient_name: String,
    pub prison_code: String,
    pub prison_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<Recipient> for RecipientResponse {
    fn from(recipient: Recipient) -> Self {
        Self {
            barcode: recipient.barcode,
            recipient_name: recipient.recipient_name,
            prison_code: recipient.prison_code,
            prison_number: recipient.prison_number,
            date_of_birth: recipient.date_of_birth,
        }
    }
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

/// POST /link/email
pub async fn request_sign_in_code(
    State(state): State<SlmApiState>,
    Json(body): Json<EmailBody>,
) -> Result<StatusCode, DomainError> {
    state
        .sign_in_service
        .request_sign_in_code(RequestSignInCodeRequest { email: body.email })
        .await?;
    Ok(StatusCode::CREATED)
}

/// POST /link/verify-code
pub async fn verify_sign_in_code(
    State(state): State<SlmApiState>,
    Json(body): Json<VerifyCodeBody>,
) -> Result<Json<TokenResponse>, DomainError> {
    let token = state
        .sign_in_service
        .verify_sign_in_code(VerifySignInCodeRequest {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /barcode
pub async fn create_barcode(
    State(state): State<SlmApiState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateBarcodeBody>,
) -> Result<(StatusCode, Json<CreateBarcodeResponse>), DomainError> {
    user.require_role(ROLE_CREATE_BARCODE)?;

    let recipient = state
        .barcode_service
        .create_barcode_for_recipient(CreateBarcodeRequest {
            user_id: user.user_id().to_string(),
            recipient: RecipientDetails {
                recipient_name: body.recipient_name,
                prison_code: body.prison_code,
                prison_number: body.prison_number,
                date_of_birth: body.date_of_birth,
            },
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBarcodeResponse {
            barcode: recipient.barcode,
        }),
    ))
}

/// POST /barcode/check
pub async fn check_barcode(
    State(state): State<SlmApiState>,
    user: AuthenticatedUser,
    Json(body): Json<CheckBarcodeBody>,
) -> Result<Json<CheckBarcodeResponse>, DomainError> {
    user.require_role(ROLE_SCAN_BARCODE)?;

    let created_by = state
        .barcode_check_service
        .check_barcode(CheckBarcodeRequest {
            user_id: user.user_id().to_string(),
            barcode: body.barcode,
            location: body.location.unwrap_or_default(),
        })
        .await?;

    Ok(Json(CheckBarcodeResponse { created_by }))
}

/// GET /barcode/{code}/recipient
pub async fn get_recipient(
    State(state): State<SlmApiState>,
    user: AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<Json<RecipientResponse>, DomainError> {
    user.require_role(ROLE_SCAN_BARCODE)?;

    let recipient = state
        .barcode_service
        .get_recipient(GetRecipientRequest { barcode: code })
        .await?;

    Ok(Json(recipient.into()))
}
