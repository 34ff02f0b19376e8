//! Validation gates for the auth workflow.
//!
//! Each gate inspects the request payload (body fields, path parameters),
//! performs lookups against the user store and comparisons against hashed
//! secrets, and produces exactly one outcome: forward an enriched context to
//! the next pipeline stage, or reject with an HTTP 400 and a JSON
//! `{"status":"error","msg":…}` body.
//!
//! ## Enumeration resistance
//!
//! Login rejects with one uniform message whether the email is unknown or the
//! password is wrong. The token-guarded gates (account verification, reset
//! password) use one uniform message whether the user id is unknown, the
//! token mismatches, or a store/comparator failure occurs mid-check, so a
//! caller can never tell which step failed.
//!
//! ## Guarded vs unguarded gates
//!
//! Only the token-guarded gates fold unexpected collaborator failures into
//! their rejection message. Registration, login, re-verification and
//! forgot-password let such failures propagate to the enclosing framework
//! handler.

pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod register;
mod secret;
mod state;
mod store;
pub(crate) mod types;
mod validate;
pub(crate) mod verification;

pub use secret::{Argon2Verifier, SecretVerifier};
pub use state::GateState;
pub use store::{PgUserStore, UserRecord, UserStore};
pub use types::{GateContext, GateOutcome, Rejection};
pub use validate::PasswordPolicy;

#[cfg(test)]
pub(crate) mod test_support;
