//! Field validators, the password strength policy, and the rule table the
//! registration scan applies to every supplied field.

use regex::Regex;
use serde_json::Value;

use super::types::{FieldMap, Rejection};

/// Fetch a body field as a string, if present and a string.
pub(super) fn field_str<'a>(body: &'a FieldMap, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Required-fields check: a field counts as present only when it is a
/// non-empty string.
pub(super) fn missing_any(body: &FieldMap, required: &[&str]) -> bool {
    required
        .iter()
        .any(|key| !matches!(body.get(*key), Some(Value::String(s)) if !s.is_empty()))
}

/// Display-name check: letters only, spaces permitted, not blank.
pub(super) fn valid_name(value: &str) -> bool {
    let mut seen = false;
    for c in value.chars() {
        if c == ' ' {
            continue;
        }
        if !c.is_ascii_alphabetic() {
            return false;
        }
        seen = true;
    }
    seen
}

/// Basic email format check.
pub(super) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// OTP codes are exactly six ASCII digits, no spaces or signs.
pub(super) fn valid_otp(otp: &str) -> bool {
    otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit())
}

/// Password strength policy: minimum length plus required character classes.
#[derive(Clone, Copy, Debug)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    /// At least 8 characters with an uppercase letter and a digit; symbols
    /// are not required.
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_digit: true,
            require_symbol: false,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn check(&self, password: &str) -> bool {
        if password.chars().count() < self.min_length {
            return false;
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return false;
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        if self.require_symbol && !password.chars().any(|c| !c.is_alphanumeric()) {
            return false;
        }
        true
    }
}

/// Which validator a matched field must pass.
#[derive(Clone, Copy, Debug)]
enum Check {
    Name,
    Email,
    Password,
}

/// One rule: fields whose name satisfies the predicate get the check.
struct FieldRule {
    applies: fn(&str) -> bool,
    check: Check,
}

/// The substring predicates are intentional: any supplied field whose name
/// contains `name`, `email` or `password` is validated, not just the four
/// required registration fields (so `username` gets the name check).
const FIELD_RULES: [FieldRule; 3] = [
    FieldRule {
        applies: |key| key.contains("name") || key.contains("Name"),
        check: Check::Name,
    },
    FieldRule {
        applies: |key| key.contains("email"),
        check: Check::Email,
    },
    FieldRule {
        applies: |key| key.contains("password") || key.contains("Password"),
        check: Check::Password,
    },
];

/// Walk every supplied field in declaration order and apply each matching
/// rule; the first violation wins. Non-string values fail whatever rule
/// matched them.
pub(super) fn scan_fields(body: &FieldMap, policy: &PasswordPolicy) -> Result<(), Rejection> {
    for (key, value) in body {
        for rule in &FIELD_RULES {
            if !(rule.applies)(key) {
                continue;
            }
            let text = value.as_str().unwrap_or_default();
            match rule.check {
                Check::Name => {
                    if !valid_name(text) {
                        return Err(Rejection::InvalidName);
                    }
                }
                Check::Email => {
                    if !valid_email(text) {
                        return Err(Rejection::InvalidEmail);
                    }
                }
                Check::Password => {
                    if !policy.check(text) {
                        return Err(Rejection::WeakPassword);
                    }
                }
            }
        }
    }
    Ok(())
}
