//! Account verification gates: the OTP-completing variant, the read-only
//! client check, and the re-verification guard for resend requests.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use super::secret::SecretVerifier;
use super::state::GateState;
use super::store::{UserRecord, UserStore};
use super::types::{
    forward_response, CheckOutcome, FieldMap, GateOutcome, Rejection, RequiredFor, TokenFlow,
};
use super::validate;

const REJECT: Rejection = Rejection::InvalidOrExpiredToken(TokenFlow::AccountVerification);

/// Steps shared by both variants: lookup by id, token comparison, verified
/// flag. Unknown id and token mismatch produce the same rejection.
async fn check_token(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    user_id: &str,
    token: &str,
) -> anyhow::Result<Result<UserRecord, Rejection>> {
    let Some(user) = store.find_for_verification(user_id).await? else {
        return Ok(Err(REJECT));
    };

    // A user without a stored token hash errs in the comparator; the caller
    // folds that into the uniform rejection.
    let stored = user.verify_token_hash.clone().unwrap_or_default();
    if !verifier.verify(token, &stored).await? {
        return Ok(Err(REJECT));
    }

    if user.is_verified {
        return Ok(Err(Rejection::AlreadyVerified));
    }

    Ok(Ok(user))
}

async fn verify_account_steps(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    user_id: &str,
    token: &str,
    body: &FieldMap,
) -> anyhow::Result<GateOutcome> {
    let user = match check_token(store, verifier, user_id, token).await? {
        Ok(user) => user,
        Err(rejection) => return Ok(GateOutcome::Reject(rejection)),
    };

    if validate::missing_any(body, &["otp"]) {
        return Ok(GateOutcome::Reject(Rejection::MissingFields(
            RequiredFor::Otp,
        )));
    }

    let otp = validate::field_str(body, "otp").unwrap_or_default();
    if !validate::valid_otp(otp) {
        return Ok(GateOutcome::Reject(Rejection::InvalidOtpFormat));
    }

    let stored = user.verify_otp_hash.clone().unwrap_or_default();
    if !verifier.verify(otp, &stored).await? {
        return Ok(GateOutcome::Reject(Rejection::IncorrectOtp));
    }

    // Marking the account verified is downstream.
    Ok(GateOutcome::forward_user(user))
}

/// State-mutating variant: completes verification once the OTP matches.
///
/// Guarded: any store or comparator failure anywhere in the sequence maps to
/// the uniform token rejection, never a crash or a different message.
pub async fn verify_account_gate(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    user_id: &str,
    token: &str,
    body: &FieldMap,
) -> GateOutcome {
    match verify_account_steps(store, verifier, user_id, token, body).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("account verification failed: {err}");
            GateOutcome::Reject(REJECT)
        }
    }
}

/// Read-only client variant: confirms the link is still valid before the
/// front-end prompts for the OTP. Stops after the verified-flag check,
/// never mutates, never forwards.
pub async fn verify_account_check_gate(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    user_id: &str,
    token: &str,
) -> CheckOutcome {
    match check_token(store, verifier, user_id, token).await {
        Ok(Ok(mut user)) => {
            user.scrub();
            CheckOutcome::Valid(user)
        }
        Ok(Err(rejection)) => CheckOutcome::Reject(rejection),
        Err(err) => {
            error!("account verification check failed: {err}");
            CheckOutcome::Reject(REJECT)
        }
    }
}

/// Re-verification guard for resend requests: re-select the verified flag
/// for an already-authenticated user and block if set. A missing record
/// forwards unchanged. Unguarded: store failures propagate.
pub async fn reverify_gate(store: &dyn UserStore, user_id: &str) -> anyhow::Result<GateOutcome> {
    match store.find_verified_flag(user_id).await? {
        Some(true) => Ok(GateOutcome::Reject(Rejection::AlreadyVerified)),
        _ => Ok(GateOutcome::pass()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/verify/{user_id}/{token}",
    request_body = Object,
    responses(
        (status = 200, description = "OTP accepted, user attached", body = String),
        (status = 400, description = "Invalid/expired token, bad OTP, or already verified", body = String),
    ),
    tag = "auth"
)]
pub async fn verify_account(
    state: Extension<Arc<GateState>>,
    Path((user_id, token)): Path<(String, String)>,
    payload: Option<Json<FieldMap>>,
) -> Response {
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    match verify_account_gate(state.store(), state.verifier(), &user_id, &token, &body).await {
        GateOutcome::Forward(context) => forward_response(&context),
        GateOutcome::Reject(rejection) => rejection.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/verify/{user_id}/{token}",
    responses(
        (status = 200, description = "Token still valid", body = String),
        (status = 400, description = "Invalid/expired token or already verified", body = String),
    ),
    tag = "auth"
)]
pub async fn verify_account_check(
    state: Extension<Arc<GateState>>,
    Path((user_id, token)): Path<(String, String)>,
) -> Response {
    match verify_account_check_gate(state.store(), state.verifier(), &user_id, &token).await {
        CheckOutcome::Valid(user) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "msg": "valid token",
                "user": user,
            })),
        )
            .into_response(),
        CheckOutcome::Reject(rejection) => rejection.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/verify/resend/{user_id}",
    responses(
        (status = 200, description = "Resend allowed", body = String),
        (status = 400, description = "Account already verified", body = String),
    ),
    tag = "auth"
)]
pub async fn resend_verification(
    state: Extension<Arc<GateState>>,
    Path(user_id): Path<String>,
) -> Response {
    match reverify_gate(state.store(), &user_id).await {
        Ok(GateOutcome::Forward(context)) => forward_response(&context),
        Ok(GateOutcome::Reject(rejection)) => rejection.into_response(),
        Err(err) => {
            error!("re-verification gate failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response()
        }
    }
}
