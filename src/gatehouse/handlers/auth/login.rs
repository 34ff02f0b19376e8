//! Login gate.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::error;

use super::secret::SecretVerifier;
use super::state::GateState;
use super::store::UserStore;
use super::types::{forward_response, FieldMap, GateOutcome, Rejection, RequiredFor};
use super::validate;

/// Validate a login payload.
///
/// Unknown email and wrong password collapse into one identical rejection so
/// the response never reveals whether the account exists. Store and
/// comparator failures propagate.
pub async fn login_gate(
    store: &dyn UserStore,
    verifier: &dyn SecretVerifier,
    body: &FieldMap,
) -> anyhow::Result<GateOutcome> {
    if validate::missing_any(body, &["email", "password"]) {
        return Ok(GateOutcome::Reject(Rejection::MissingFields(
            RequiredFor::Login,
        )));
    }

    let email = validate::field_str(body, "email").unwrap_or_default();
    let password = validate::field_str(body, "password").unwrap_or_default();

    let Some(user) = store.find_by_email_with_password(email).await? else {
        return Ok(GateOutcome::Reject(Rejection::InvalidCredentials));
    };

    let stored = user.password_hash.clone().unwrap_or_default();
    if !verifier.verify(password, &stored).await? {
        return Ok(GateOutcome::Reject(Rejection::InvalidCredentials));
    }

    Ok(GateOutcome::forward_user(user))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Object,
    responses(
        (status = 200, description = "Credentials valid, user attached", body = String),
        (status = 400, description = "Missing fields or incorrect credentials", body = String),
    ),
    tag = "auth"
)]
pub async fn login(state: Extension<Arc<GateState>>, payload: Option<Json<FieldMap>>) -> Response {
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    match login_gate(state.store(), state.verifier(), &body).await {
        Ok(GateOutcome::Forward(context)) => forward_response(&context),
        Ok(GateOutcome::Reject(rejection)) => rejection.into_response(),
        Err(err) => {
            error!("login gate failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response()
        }
    }
}
