//! Account - Login identity of a marketplace user
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{NotificationSettings, Role};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Account - one email, one password, any number of roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub roles: Vec<Role>,
    pub notification_settings: NotificationSettings,
    /// Current refresh token; replaced on every refresh, cleared on logout
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a consumer account with default notification settings
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            phone: None,
            avatar: None,
            roles: vec![Role::Consumer],
            notification_settings: NotificationSettings::default(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Add a role, keeping the list sorted and free of duplicates
    pub fn grant(&mut self, role: Role) {
        if !self.has_role(role) {
            self.roles.push(role);
            self.roles.sort();
        }
        self.updated_at = Utc::now();
    }
}

/// Trim, lowercase and sanity-check an email address
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::validation("email is invalid")),
    }
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_consumer() {
        let account = Account::new("a@b.vn".into(), "hash".into(), None);
        assert_eq!(account.roles, vec![Role::Consumer]);
        assert!(account.refresh_token.is_none());
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut account = Account::new("a@b.vn".into(), "hash".into(), None);
        account.grant(Role::Farmer);
        account.grant(Role::Farmer);
        assert_eq!(account.roles, vec![Role::Consumer, Role::Farmer]);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Nong@Farm.VN ").unwrap(), "nong@farm.vn");
        assert!(normalize_email("nofarm").is_err());
        assert!(normalize_email("@farm.vn").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
