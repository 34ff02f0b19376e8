//! Registration gate.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::error;

use super::state::GateState;
use super::store::UserStore;
use super::types::{forward_response, FieldMap, GateOutcome, Rejection, RequiredFor};
use super::validate::{self, PasswordPolicy};

const REQUIRED_FIELDS: [&str; 4] = ["firstName", "lastName", "email", "password"];

/// Validate a registration payload.
///
/// Order matters: required fields first, then the duplicate-email lookup,
/// then the per-field rule scan in declaration order. The first violated
/// rule wins. Store failures propagate.
pub async fn register_gate(
    store: &dyn UserStore,
    policy: &PasswordPolicy,
    body: &FieldMap,
) -> anyhow::Result<GateOutcome> {
    if validate::missing_any(body, &REQUIRED_FIELDS) {
        return Ok(GateOutcome::Reject(Rejection::MissingFields(
            RequiredFor::Register,
        )));
    }

    let email = validate::field_str(body, "email").unwrap_or_default();
    if store.find_by_email(email).await?.is_some() {
        return Ok(GateOutcome::Reject(Rejection::DuplicateAccount));
    }

    if let Err(rejection) = validate::scan_fields(body, policy) {
        return Ok(GateOutcome::Reject(rejection));
    }

    // Creation itself happens downstream; the gate forwards unmodified.
    Ok(GateOutcome::pass())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = Object,
    responses(
        (status = 200, description = "Validation passed", body = String),
        (status = 400, description = "Missing, duplicate or malformed fields", body = String),
    ),
    tag = "auth"
)]
pub async fn register(
    state: Extension<Arc<GateState>>,
    payload: Option<Json<FieldMap>>,
) -> Response {
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    match register_gate(state.store(), state.policy(), &body).await {
        Ok(GateOutcome::Forward(context)) => forward_response(&context),
        Ok(GateOutcome::Reject(rejection)) => rejection.into_response(),
        Err(err) => {
            error!("register gate failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}
