//! In-memory collaborators shared by the gate tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use super::secret::SecretVerifier;
use super::store::{UserRecord, UserStore};

/// The mock hash format: `hashed:<plaintext>`.
pub(crate) fn mock_hash(plaintext: &str) -> String {
    format!("hashed:{plaintext}")
}

/// Verifier over the mock hash format. Anything that is not a mock hash is a
/// malformed-hash error, mirroring the production comparator.
pub(crate) struct MockVerifier;

#[async_trait]
impl SecretVerifier for MockVerifier {
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        match hash.strip_prefix("hashed:") {
            Some(stored) => Ok(stored == plaintext),
            None => Err(anyhow!("malformed hash: {hash:?}")),
        }
    }
}

/// In-memory `UserStore` with a lookup counter, so tests can assert a gate
/// never touched the store.
#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Vec<UserRecord>,
    lookups: AtomicUsize,
    failing: bool,
}

impl MemoryStore {
    pub(crate) fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    /// Every lookup fails, for exercising the guarded gates.
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn lookup(&self) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(anyhow!("store offline"));
        }
        Ok(())
    }

    fn by_email(&self, email: &str) -> Option<UserRecord> {
        self.users.iter().find(|user| user.email == email).cloned()
    }

    fn by_id(&self, id: &str) -> Option<UserRecord> {
        self.users.iter().find(|user| user.id == id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.lookup()?;
        Ok(self.by_email(email).map(|mut user| {
            user.scrub();
            user
        }))
    }

    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<UserRecord>> {
        self.lookup()?;
        Ok(self.by_email(email).map(|mut user| {
            user.verify_otp_hash = None;
            user.verify_token_hash = None;
            user.reset_token_hash = None;
            user
        }))
    }

    async fn find_for_verification(&self, id: &str) -> Result<Option<UserRecord>> {
        self.lookup()?;
        Ok(self.by_id(id).map(|mut user| {
            user.password_hash = None;
            user.reset_token_hash = None;
            user
        }))
    }

    async fn find_for_reset(&self, id: &str) -> Result<Option<UserRecord>> {
        self.lookup()?;
        Ok(self.by_id(id).map(|mut user| {
            user.verify_otp_hash = None;
            user.verify_token_hash = None;
            user
        }))
    }

    async fn find_verified_flag(&self, id: &str) -> Result<Option<bool>> {
        self.lookup()?;
        Ok(self.by_id(id).map(|user| user.is_verified))
    }
}

/// Fixture builder: `user("ada@example.com").password("Str0ngPass").build()`.
pub(crate) fn user(email: &str) -> UserBuilder {
    UserBuilder {
        record: UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            is_verified: false,
            password_hash: None,
            verify_otp_hash: None,
            verify_token_hash: None,
            reset_token_hash: None,
        },
    }
}

pub(crate) struct UserBuilder {
    record: UserRecord,
}

impl UserBuilder {
    pub(crate) fn id(mut self, id: &str) -> Self {
        self.record.id = id.to_string();
        self
    }

    pub(crate) fn password(mut self, plaintext: &str) -> Self {
        self.record.password_hash = Some(mock_hash(plaintext));
        self
    }

    pub(crate) fn verify_token(mut self, plaintext: &str) -> Self {
        self.record.verify_token_hash = Some(mock_hash(plaintext));
        self
    }

    pub(crate) fn verify_otp(mut self, plaintext: &str) -> Self {
        self.record.verify_otp_hash = Some(mock_hash(plaintext));
        self
    }

    pub(crate) fn reset_token(mut self, plaintext: &str) -> Self {
        self.record.reset_token_hash = Some(mock_hash(plaintext));
        self
    }

    pub(crate) fn verified(mut self) -> Self {
        self.record.is_verified = true;
        self
    }

    pub(crate) fn build(self) -> UserRecord {
        self.record
    }
}
