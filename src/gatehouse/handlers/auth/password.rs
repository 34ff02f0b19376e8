//! Forgot-password and reset-password gates.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::error;

use super::secret::SecretVerifier;
use super::state::GateState;
use super::store::UserStore;
use super::types::{
    forward_response, FieldMap, GateContext, GateOutcome, Rejection, RequiredFor, TokenFlow,
};
use super::validate::{self, PasswordPolicy};

const REJECT: Rejection = Rejection::InvalidOrExpiredToken(TokenFlow::PasswordReset);

/// Validate a forgot-password request.
///
/// A missing email field behaves like any other failed lookup. The unknown
/// address is reported outright, an accepted enumeration trade-off for this
/// flow. Store failures propagate.
pub async fn forgot_password_gate(
    store: &dyn UserStore,
    body: &FieldMap,
) -> anyhow::Result<GateOutcome> {
    let email = validate::field_str(body, "email").unwrap_or_default();

    let Some(user) = store.find_by_email(email).await? else {
        return Ok(GateOutcome::Reject(Rejection::UnknownEmail));
    };

    // Token generation and dispatch are downstream.
    Ok(GateOutcome::forward_user(user))
}

async fn reset_password_steps(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    policy: &PasswordPolicy,
    user_id: &str,
    token: &str,
    body: &FieldMap,
) -> anyhow::Result<GateOutcome> {
    let Some(mut user) = store.find_for_reset(user_id).await? else {
        return Ok(GateOutcome::Reject(REJECT));
    };

    let stored = user.reset_token_hash.clone().unwrap_or_default();
    if !verifier.verify(token, &stored).await? {
        return Ok(GateOutcome::Reject(REJECT));
    }

    if validate::missing_any(body, &["newPassword", "newPasswordConfirmation"]) {
        return Ok(GateOutcome::Reject(Rejection::MissingFields(
            RequiredFor::Reset,
        )));
    }

    let new_password = validate::field_str(body, "newPassword").unwrap_or_default();
    let confirmation = validate::field_str(body, "newPasswordConfirmation").unwrap_or_default();

    if !policy.check(new_password) {
        return Ok(GateOutcome::Reject(Rejection::WeakPassword));
    }

    if new_password != confirmation {
        return Ok(GateOutcome::Reject(Rejection::PasswordMismatch));
    }

    // Hashing and persistence are downstream; the plaintext is staged
    // wrapped so it never shows up in logs or serialized output.
    user.scrub();
    let mut context = GateContext::with_user(user);
    context.new_password = Some(SecretString::from(new_password.to_string()));
    Ok(GateOutcome::Forward(context))
}

/// Validate a reset-password request.
///
/// Guarded: any store or comparator failure anywhere in the sequence maps to
/// the uniform token rejection.
pub async fn reset_password_gate(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    policy: &PasswordPolicy,
    user_id: &str,
    token: &str,
    body: &FieldMap,
) -> GateOutcome {
    match reset_password_steps(store, verifier, policy, user_id, token, body).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("password reset failed: {err}");
            GateOutcome::Reject(REJECT)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = Object,
    responses(
        (status = 200, description = "User attached for token dispatch", body = String),
        (status = 400, description = "Unknown email address", body = String),
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    state: Extension<Arc<GateState>>,
    payload: Option<Json<FieldMap>>,
) -> Response {
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    match forgot_password_gate(state.store(), &body).await {
        Ok(GateOutcome::Forward(context)) => forward_response(&context),
        Ok(GateOutcome::Reject(rejection)) => rejection.into_response(),
        Err(err) => {
            error!("forgot-password gate failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password recovery failed".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{user_id}/{token}",
    request_body = Object,
    responses(
        (status = 200, description = "New password staged, user attached", body = String),
        (status = 400, description = "Invalid/expired token or unacceptable password", body = String),
    ),
    tag = "auth"
)]
pub async fn reset_password(
    state: Extension<Arc<GateState>>,
    Path((user_id, token)): Path<(String, String)>,
    payload: Option<Json<FieldMap>>,
) -> Response {
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    match reset_password_gate(
        state.store(),
        state.verifier(),
        state.policy(),
        &user_id,
        &token,
        &body,
    )
    .await
    {
        GateOutcome::Forward(context) => forward_response(&context),
        GateOutcome::Reject(rejection) => rejection.into_response(),
    }
}
