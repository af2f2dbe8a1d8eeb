//! Records exchanged with the auth and ledger backend.

use crate::casino::LedgerSnapshot;
use serde::{Deserialize, Serialize};

/// Identifier assigned to an account by the auth backend.
pub type UserId = String;

/// Maximum accepted email length
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// An authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Row stored per user by the ledger backend (one per `user_id`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub user_id: UserId,
    pub virtual_balance: u64,
    pub total_lost: u64,
}

impl LedgerRecord {
    pub fn new(user_id: &str, snapshot: LedgerSnapshot) -> Self {
        Self {
            user_id: user_id.to_string(),
            virtual_balance: snapshot.virtual_balance,
            total_lost: snapshot.total_lost,
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.virtual_balance, self.total_lost)
    }
}

/// Body of every non-2xx backend reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
