//! # Gatehouse
//!
//! `gatehouse` is the validation gate sitting in front of an authentication
//! workflow. Each gate inspects an incoming request (body fields and path
//! parameters), looks up the account in the user store, compares the supplied
//! secrets against their stored hashes, and either rejects with a structured
//! JSON error or forwards a per-request context enriched with the matched
//! user to the next pipeline stage.
//!
//! ## Flows
//!
//! - **Registration**: required fields, duplicate email, then a scan of
//!   every supplied field against a name/email/password rule table.
//! - **Login**: uniform "email or password incorrect" rejection whether the
//!   account is unknown or the password mismatches.
//! - **Account verification**: token-guarded OTP check, with a read-only
//!   variant the front-end uses to confirm a link before prompting for the
//!   OTP.
//! - **Forgot / reset password**: token-guarded staging of a new password.
//!
//! ## Error shape
//!
//! Every rejection is an HTTP 400 with body `{"status":"error","msg":…}`.
//! Token-guarded gates fold unexpected store or comparator failures into the
//! same "invalid or expired token" rejection so they never leak which check
//! failed.

pub mod cli;
pub mod gatehouse;
