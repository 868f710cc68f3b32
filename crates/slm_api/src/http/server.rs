use crate::domain::{BarcodeCheckService, BarcodeService, SignInService};
use crate::http::{
    check_barcode, create_barcode, get_recipient, health, request_sign_in_code,
    verify_sign_in_code,
};
use axum::routing::{get, post};
use axum::Router;
use common::auth::AuthTokenProvider;
use common::http::{run_http_server, HttpServerConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared handler state
#[derive(Clone)]
pub struct SlmApiState {
    pub barcode_service: Arc<BarcodeService>,
    pub barcode_check_service: Arc<BarcodeCheckService>,
    pub sign_in_service: Arc<SignInService>,
    pub auth_token_provider: Arc<dyn AuthTokenProvider>,
}

pub fn build_slm_api_routes(state: SlmApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/link/email", post(request_sign_in_code))
        .route("/link/verify-code", post(verify_sign_in_code))
        .route("/barcode", post(create_barcode))
        .route("/barcode/check", post(check_barcode))
        .route("/barcode/{code}/recipient", get(get_recipient))
        .with_state(state)
}

/// Serve the API until the token is cancelled
pub async fn run_slm_http_server(
    config: HttpServerConfig,
    state: SlmApiState,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    run_http_server(config, build_slm_api_routes(state), cancellation_token).await
}
