//! Credential Ports
//!
//! Password hashing and token issuing, kept behind traits so the
//! application layer never sees a concrete algorithm.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, Actor, Role};

/// One-way password hashing
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Check a plaintext password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}

/// What a token may be used for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Account ID
    pub sub: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    #[serde(default)]
    pub farmer_id: Option<Uuid>,
    pub kind: TokenKind,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl TokenClaims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.roles.clone(), self.farmer_id)
    }
}

/// Signs and verifies tokens
pub trait TokenIssuer: Send + Sync {
    /// Issue a token of `kind` for the given identity
    fn issue(
        &self,
        account_id: Uuid,
        email: &str,
        roles: &[Role],
        farmer_id: Option<Uuid>,
        kind: TokenKind,
    ) -> Result<String, DomainError>;

    /// Verify signature and expiry; the kind is not checked here
    fn verify(&self, token: &str) -> Result<TokenClaims, DomainError>;

    /// Lifetime of access tokens in seconds
    fn access_ttl_secs(&self) -> i64;
}
