//! Auth Application Service (Use Case)
//!
//! Registration, login and token rotation for marketplace accounts.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use farmlink::domain::{normalize_email, validate_password};
use farmlink::{
    Account, AccountRepository, Actor, DomainError, Farmer, FarmerRepository, PasswordHasher,
    Role, TokenIssuer, TokenKind,
};

/// Access and refresh token handed to a client after authentication
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Farm name given to the profile created for a seeded administrator
const ADMIN_FARM_NAME: &str = "FarmLink";

pub struct AuthService<A: AccountRepository, F: FarmerRepository> {
    accounts: Arc<A>,
    farmers: Arc<F>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl<A: AccountRepository, F: FarmerRepository> AuthService<A, F> {
    pub fn new(
        accounts: Arc<A>,
        farmers: Arc<F>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            farmers,
            hasher,
            tokens,
        }
    }

    /// Create a consumer account and sign it in
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<TokenPair, DomainError> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "email {} is already registered",
                email
            )));
        }

        let display_name = display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let account = Account::new(email, self.hasher.hash(password)?, display_name);
        let saved = self.accounts.save(&account).await?;

        tracing::info!("Registered account: {} ({})", saved.email, saved.id);

        self.issue_pair(&saved).await
    }

    /// Sign in as `role`; the account must hold that role
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<TokenPair, DomainError> {
        let email = normalize_email(email)?;
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found_str("Account", &email))?;

        if !account.has_role(role) {
            tracing::warn!("Login as {} refused for {}", role, account.id);
            return Err(DomainError::forbidden(format!(
                "account does not have the {} role",
                role
            )));
        }

        if !self.hasher.verify(password, &account.password_hash)? {
            tracing::warn!("Wrong password for {}", account.id);
            return Err(DomainError::validation("wrong email or password"));
        }

        tracing::info!("Login: {} as {}", account.id, role);

        self.issue_pair(&account).await
    }

    /// Exchange a refresh token for a new pair; the old refresh token stops working
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let account = self.account_for_refresh(refresh_token).await?;
        self.issue_pair(&account).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), DomainError> {
        let account = self.account_for_refresh(refresh_token).await?;
        self.accounts.set_refresh_token(account.id, None).await?;

        tracing::info!("Logout: {}", account.id);
        Ok(())
    }

    pub async fn change_password(
        &self,
        actor: &Actor,
        current: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let mut account = self.load(actor.account_id).await?;

        if !self.hasher.verify(current, &account.password_hash)? {
            return Err(DomainError::validation("current password is wrong"));
        }
        validate_password(new_password)?;

        account.password_hash = self.hasher.hash(new_password)?;
        account.updated_at = chrono::Utc::now();
        self.accounts.save(&account).await?;

        tracing::info!("Password changed: {}", account.id);
        Ok(())
    }

    /// Issue a fresh pair for an account, e.g. after its roles changed
    pub async fn reissue(&self, account_id: Uuid) -> Result<TokenPair, DomainError> {
        let account = self.load(account_id).await?;
        self.issue_pair(&account).await
    }

    /// Create the administrator account unless the email is already taken.
    ///
    /// Returns the new account, or `None` when nothing was created.
    pub async fn seed_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, DomainError> {
        let email = normalize_email(email)?;
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Ok(None);
        }
        validate_password(password)?;

        let mut account = Account::new(email, self.hasher.hash(password)?, Some("Admin".into()));
        account.grant(Role::Admin);
        let saved = self.accounts.save(&account).await?;
        self.farmers
            .create_for_account(&Farmer::new(saved.id, ADMIN_FARM_NAME.to_string()))
            .await?;

        tracing::info!("Seeded administrator: {} ({})", saved.email, saved.id);

        Ok(Some(self.load(saved.id).await?))
    }

    async fn load(&self, account_id: Uuid) -> Result<Account, DomainError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account", account_id))
    }

    async fn account_for_refresh(&self, refresh_token: &str) -> Result<Account, DomainError> {
        let claims = self.tokens.verify(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(DomainError::Unauthorized("not a refresh token".into()));
        }

        let account = self
            .accounts
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("account no longer exists".into()))?;

        if account.refresh_token.as_deref() != Some(refresh_token) {
            tracing::warn!("Stale refresh token presented for {}", account.id);
            return Err(DomainError::Unauthorized("refresh token was revoked".into()));
        }
        Ok(account)
    }

    async fn issue_pair(&self, account: &Account) -> Result<TokenPair, DomainError> {
        let farmer_id = if account.has_role(Role::Farmer) {
            self.farmers
                .find_by_account(account.id)
                .await?
                .map(|f| f.id)
        } else {
            None
        };

        let access_token = self.tokens.issue(
            account.id,
            &account.email,
            &account.roles,
            farmer_id,
            TokenKind::Access,
        )?;
        let refresh_token = self.tokens.issue(
            account.id,
            &account.email,
            &account.roles,
            farmer_id,
            TokenKind::Refresh,
        )?;
        self.accounts
            .set_refresh_token(account.id, Some(&refresh_token))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.tokens.access_ttl_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{token_issuer, MemoryDb, PlainHasher};

    fn service(db: &Arc<MemoryDb>) -> AuthService<MemoryDb, MemoryDb> {
        AuthService::new(db.clone(), db.clone(), Arc::new(PlainHasher), token_issuer())
    }

    #[tokio::test]
    async fn register_normalizes_email_and_rejects_duplicates() {
        let db = MemoryDb::new();
        let auth = service(&db);

        let pair = auth
            .register("  Lan@Example.COM ", "password1", Some("Lan".into()))
            .await
            .unwrap();
        assert!(pair.expires_in > 0);

        let err = auth
            .register("lan@example.com", "password2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let db = MemoryDb::new();
        let err = service(&db)
            .register("a@b.vn", "short", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn login_checks_role_then_password() {
        let db = MemoryDb::new();
        let auth = service(&db);
        auth.register("binh@example.com", "password1", None)
            .await
            .unwrap();

        let err = auth
            .login("binh@example.com", "password1", Role::Farmer)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = auth
            .login("binh@example.com", "wrong-password", Role::Consumer)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = auth
            .login("nobody@example.com", "password1", Role::Consumer)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        auth.login("binh@example.com", "password1", Role::Consumer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn refresh_rotates_the_stored_token() {
        let db = MemoryDb::new();
        let auth = service(&db);
        let first = auth
            .register("chi@example.com", "password1", None)
            .await
            .unwrap();

        // iat has second resolution; make sure the rotated token differs
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let second = auth.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        let err = auth.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let err = auth.refresh(&second.access_token).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_revokes_refresh_token() {
        let db = MemoryDb::new();
        let auth = service(&db);
        let pair = auth
            .register("dung@example.com", "password1", None)
            .await
            .unwrap();

        auth.logout(&pair.refresh_token).await.unwrap();
        assert!(auth.refresh(&pair.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let db = MemoryDb::new();
        let auth = service(&db);
        let actor = db.seed_account("em@example.com", &[Role::Consumer]);

        let err = auth
            .change_password(&actor, "not-it", "newpassword")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        auth.change_password(&actor, "password1", "newpassword")
            .await
            .unwrap();
        auth.login("em@example.com", "newpassword", Role::Consumer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn seed_admin_grants_every_role_once() {
        let db = MemoryDb::new();
        let auth = service(&db);

        let admin = auth
            .seed_admin("admin@farmlink.vn", "adminpass")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.roles, Role::ALL.to_vec());

        assert!(auth
            .seed_admin("admin@farmlink.vn", "adminpass")
            .await
            .unwrap()
            .is_none());
    }
}
