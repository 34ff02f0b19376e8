//! Shared state handed to the gate handlers.

use sqlx::PgPool;
use std::sync::Arc;

use super::secret::{Argon2Verifier, SecretVerifier};
use super::store::{PgUserStore, UserStore};
use super::validate::PasswordPolicy;

/// Collaborators every gate needs: the user store, the secret comparator,
/// and the password strength policy.
pub struct GateState {
    store: Arc<dyn UserStore>,
    verifier: Arc<dyn SecretVerifier>,
    policy: PasswordPolicy,
}

impl GateState {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        verifier: Arc<dyn SecretVerifier>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            policy,
        }
    }

    /// Production wiring: Postgres store and Argon2 comparison.
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgUserStore::new(pool)),
            Arc::new(Argon2Verifier),
            PasswordPolicy::default(),
        )
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn verifier(&self) -> &dyn SecretVerifier {
        self.verifier.as_ref()
    }

    #[must_use]
    pub const fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }
}
