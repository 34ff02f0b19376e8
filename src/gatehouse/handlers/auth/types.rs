//! Gate outcomes, rejection taxonomy, and response shapes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use serde_json::json;

use super::store::UserRecord;

/// Raw request body: an ordered mapping of field name to JSON value.
///
/// Field order matters: the registration scan walks fields in declaration
/// order and the first violated rule wins.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Which flow raised a `MissingFields` rejection (the message differs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredFor {
    Register,
    Login,
    Otp,
    Reset,
}

/// Which token-guarded flow raised an `InvalidOrExpiredToken` rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenFlow {
    AccountVerification,
    PasswordReset,
}

/// Every way a gate can turn a request away. All map to HTTP 400.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    MissingFields(RequiredFor),
    DuplicateAccount,
    InvalidName,
    InvalidEmail,
    WeakPassword,
    InvalidCredentials,
    InvalidOrExpiredToken(TokenFlow),
    AlreadyVerified,
    InvalidOtpFormat,
    IncorrectOtp,
    UnknownEmail,
    PasswordMismatch,
}

impl Rejection {
    /// User-input and authorization failures are deliberately not
    /// distinguished by status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingFields(RequiredFor::Register) => {
                "please enter the required fields to register (email, name and password)"
            }
            Self::MissingFields(RequiredFor::Login) => {
                "please enter the required fields to login (email and password)"
            }
            Self::MissingFields(RequiredFor::Otp) => "please enter your account verification otp.",
            Self::MissingFields(RequiredFor::Reset) => {
                "please enter the required fields to reset password."
            }
            Self::DuplicateAccount => "the entered email address is already registered.",
            Self::InvalidName => "user name must contains only letters (a-z)(A-Z).",
            Self::InvalidEmail => "please enter a valid email address.",
            Self::WeakPassword => {
                "your password must be at least 8 characters with uppercase and numbers"
            }
            Self::InvalidCredentials => "the entered email address or password is incorrect.",
            Self::InvalidOrExpiredToken(TokenFlow::AccountVerification) => {
                "invalid or expired account verification token, try request again."
            }
            Self::InvalidOrExpiredToken(TokenFlow::PasswordReset) => {
                "invalid or expired reset password token, try request again."
            }
            Self::AlreadyVerified => "your account is already verified.",
            Self::InvalidOtpFormat => "otp code must be numeric (6 digits) without spaces.",
            Self::IncorrectOtp => "incorrect otp code.",
            Self::UnknownEmail => "incorrect email address.",
            Self::PasswordMismatch => "password and password confirmation are not the same.",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({
                "status": "error",
                "msg": self.message(),
            })),
        )
            .into_response()
    }
}

/// Per-request context a gate hands to the next pipeline stage.
///
/// The attached user has already been scrubbed of secret hashes; the staged
/// password for the reset flow stays wrapped until the downstream hasher
/// needs it.
#[derive(Debug, Default)]
pub struct GateContext {
    pub user: Option<UserRecord>,
    pub new_password: Option<SecretString>,
}

impl GateContext {
    #[must_use]
    pub fn with_user(user: UserRecord) -> Self {
        Self {
            user: Some(user),
            new_password: None,
        }
    }
}

/// What a gate produced: exactly one of these per invocation.
#[derive(Debug)]
pub enum GateOutcome {
    Forward(GateContext),
    Reject(Rejection),
}

impl GateOutcome {
    /// Forward without enriching the context.
    #[must_use]
    pub fn pass() -> Self {
        Self::Forward(GateContext::default())
    }

    #[must_use]
    pub fn forward_user(mut user: UserRecord) -> Self {
        user.scrub();
        Self::Forward(GateContext::with_user(user))
    }
}

/// Outcome of the read-only verification check: a terminal success response
/// carrying the (scrubbed) user instead of a forward.
#[derive(Debug)]
pub enum CheckOutcome {
    Valid(UserRecord),
    Reject(Rejection),
}

/// Stand-in for the downstream pipeline stage: acknowledge the forward and
/// echo the attached context. The staged password is never serialized.
pub(super) fn forward_response(context: &GateContext) -> Response {
    let mut body = json!({
        "status": "success",
        "msg": "validation passed",
    });
    if let Some(user) = &context.user {
        body["user"] = json!(user);
    }
    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn all_rejections_are_bad_request() {
        let rejections = [
            Rejection::MissingFields(RequiredFor::Register),
            Rejection::MissingFields(RequiredFor::Login),
            Rejection::MissingFields(RequiredFor::Otp),
            Rejection::MissingFields(RequiredFor::Reset),
            Rejection::DuplicateAccount,
            Rejection::InvalidName,
            Rejection::InvalidEmail,
            Rejection::WeakPassword,
            Rejection::InvalidCredentials,
            Rejection::InvalidOrExpiredToken(TokenFlow::AccountVerification),
            Rejection::InvalidOrExpiredToken(TokenFlow::PasswordReset),
            Rejection::AlreadyVerified,
            Rejection::InvalidOtpFormat,
            Rejection::IncorrectOtp,
            Rejection::UnknownEmail,
            Rejection::PasswordMismatch,
        ];
        for rejection in rejections {
            assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
            assert!(!rejection.message().is_empty());
        }
    }

    #[test]
    fn token_flows_share_no_message() {
        assert_ne!(
            Rejection::InvalidOrExpiredToken(TokenFlow::AccountVerification).message(),
            Rejection::InvalidOrExpiredToken(TokenFlow::PasswordReset).message()
        );
    }

    #[tokio::test]
    async fn rejection_renders_error_body() -> Result<()> {
        let response = Rejection::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(
            body.get("status").and_then(serde_json::Value::as_str),
            Some("error")
        );
        let msg = body
            .get("msg")
            .and_then(serde_json::Value::as_str)
            .context("missing msg")?;
        assert_eq!(msg, "the entered email address or password is incorrect.");
        Ok(())
    }
}
