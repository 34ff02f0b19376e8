//! User store seam: the gates only read accounts, keyed by email or id, with
//! secret hashes selected per flow.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// One registered account, as the gates see it.
///
/// Secret hashes are populated only by the projection that needs them and are
/// never serialized, so a record attached to a successful outcome cannot leak
/// them even before `scrub` runs.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub verify_otp_hash: Option<String>,
    #[serde(skip_serializing)]
    pub verify_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
}

impl UserRecord {
    /// Drop every secret hash before the record leaves a gate.
    pub fn scrub(&mut self) {
        self.password_hash = None;
        self.verify_otp_hash = None;
        self.verify_token_hash = None;
        self.reset_token_hash = None;
    }
}

/// Read-only account lookups. Each method mirrors one projection a gate
/// needs; hashes outside the projection come back as `None`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Public fields only.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Public fields plus the password hash (login).
    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Public fields plus OTP hash, verification token hash, verified flag.
    async fn find_for_verification(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Public fields plus reset token hash and password hash.
    async fn find_for_reset(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Re-select only the verified flag for an already-authenticated user.
    async fn find_verified_flag(&self, id: &str) -> Result<Option<bool>>;
}

/// `UserStore` backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Malformed ids surface as store errors; token-guarded gates fold them
    // into their uniform rejection.
    fn parse_id(id: &str) -> Result<Uuid> {
        Uuid::parse_str(id).with_context(|| format!("invalid user id: {id}"))
    }
}

fn public_record(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get::<Uuid, _>("id").to_string(),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_verified: row.get("is_verified"),
        password_hash: None,
        verify_otp_hash: None,
        verify_token_hash: None,
        reset_token_hash: None,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let query = r"
            SELECT id, email, first_name, last_name, is_verified
            FROM users
            WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by email")?;

        Ok(row.map(|row| public_record(&row)))
    }

    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<UserRecord>> {
        let query = r"
            SELECT id, email, first_name, last_name, is_verified, password_hash
            FROM users
            WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup login record")?;

        Ok(row.map(|row| {
            let mut record = public_record(&row);
            record.password_hash = row.get("password_hash");
            record
        }))
    }

    async fn find_for_verification(&self, id: &str) -> Result<Option<UserRecord>> {
        let id = Self::parse_id(id)?;
        let query = r"
            SELECT id, email, first_name, last_name, is_verified,
                   verify_otp_hash, verify_token_hash
            FROM users
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup verification record")?;

        Ok(row.map(|row| {
            let mut record = public_record(&row);
            record.verify_otp_hash = row.get("verify_otp_hash");
            record.verify_token_hash = row.get("verify_token_hash");
            record
        }))
    }

    async fn find_for_reset(&self, id: &str) -> Result<Option<UserRecord>> {
        let id = Self::parse_id(id)?;
        let query = r"
            SELECT id, email, first_name, last_name, is_verified,
                   reset_token_hash, password_hash
            FROM users
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup reset record")?;

        Ok(row.map(|row| {
            let mut record = public_record(&row);
            record.reset_token_hash = row.get("reset_token_hash");
            record.password_hash = row.get("password_hash");
            record
        }))
    }

    async fn find_verified_flag(&self, id: &str) -> Result<Option<bool>> {
        let id = Self::parse_id(id)?;
        let query = "SELECT is_verified FROM users WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup verified flag")?;

        Ok(row.map(|row| row.get("is_verified")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_store() -> Result<PgUserStore> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        Ok(PgUserStore::new(pool))
    }

    #[test]
    fn scrub_clears_all_secret_hashes() {
        let mut record = UserRecord {
            id: Uuid::nil().to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            is_verified: false,
            password_hash: Some("hash".to_string()),
            verify_otp_hash: Some("hash".to_string()),
            verify_token_hash: Some("hash".to_string()),
            reset_token_hash: Some("hash".to_string()),
        };
        record.scrub();
        assert!(record.password_hash.is_none());
        assert!(record.verify_otp_hash.is_none());
        assert!(record.verify_token_hash.is_none());
        assert!(record.reset_token_hash.is_none());
    }

    #[test]
    fn serialized_record_never_contains_secrets() -> Result<()> {
        let record = UserRecord {
            id: Uuid::nil().to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            is_verified: true,
            password_hash: Some("secret".to_string()),
            verify_otp_hash: Some("secret".to_string()),
            verify_token_hash: Some("secret".to_string()),
            reset_token_hash: Some("secret".to_string()),
        };
        let value = serde_json::to_value(&record)?;
        let object = value.as_object().expect("record serializes to an object");
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("verify_otp_hash"));
        assert!(!object.contains_key("verify_token_hash"));
        assert!(!object.contains_key("reset_token_hash"));
        assert_eq!(
            object.get("email").and_then(serde_json::Value::as_str),
            Some("ada@example.com")
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_id_is_a_store_error() -> Result<()> {
        let store = lazy_store()?;
        assert!(store.find_for_verification("not-a-uuid").await.is_err());
        assert!(store.find_for_reset("not-a-uuid").await.is_err());
        assert!(store.find_verified_flag("not-a-uuid").await.is_err());
        Ok(())
    }
}
