//! Account Application Service (Use Case)
//!
//! Profile and notification preferences of the signed-in account, plus
//! the administrator's account listing.

use std::sync::Arc;
use uuid::Uuid;

use farmlink::domain::normalize_phone;
use farmlink::{Account, AccountRepository, Actor, DomainError, NotificationSettings, Role};

/// Patch for the caller's own profile; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

pub struct AccountService<A: AccountRepository> {
    accounts: Arc<A>,
}

impl<A: AccountRepository> AccountService<A> {
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    pub async fn get_me(&self, actor: &Actor) -> Result<Account, DomainError> {
        self.accounts
            .find_by_id(actor.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account", actor.account_id))
    }

    pub async fn update_me(
        &self,
        actor: &Actor,
        update: ProfileUpdate,
    ) -> Result<Account, DomainError> {
        let mut account = self.get_me(actor).await?;

        if let Some(name) = update.display_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("display_name cannot be blank"));
            }
            account.display_name = Some(name.to_string());
        }
        if let Some(phone) = update.phone {
            account.phone = Some(normalize_phone(&phone)?);
        }
        if let Some(avatar) = update.avatar {
            account.avatar = Some(avatar);
        }
        account.updated_at = chrono::Utc::now();

        let saved = self.accounts.save(&account).await?;
        tracing::info!("Updated profile: {}", saved.id);
        Ok(saved)
    }

    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<Account>, DomainError> {
        actor.require_role(Role::Admin)?;
        self.accounts.find_all().await
    }

    /// Remove another account; administrators cannot remove themselves
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_role(Role::Admin)?;
        if actor.account_id == id {
            return Err(DomainError::validation("cannot delete your own account"));
        }
        if !self.accounts.delete(id).await? {
            return Err(DomainError::not_found("Account", id));
        }
        tracing::info!("Deleted account: {}", id);
        Ok(())
    }

    pub async fn notification_settings(
        &self,
        actor: &Actor,
    ) -> Result<NotificationSettings, DomainError> {
        Ok(self.get_me(actor).await?.notification_settings)
    }

    pub async fn update_notification_settings(
        &self,
        actor: &Actor,
        settings: NotificationSettings,
    ) -> Result<NotificationSettings, DomainError> {
        let mut account = self.get_me(actor).await?;
        account.notification_settings = settings;
        account.updated_at = chrono::Utc::now();
        Ok(self.accounts.save(&account).await?.notification_settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryDb;

    #[tokio::test]
    async fn update_me_normalizes_phone() {
        let db = MemoryDb::new();
        let actor = db.seed_account("lan@example.com", &[Role::Consumer]);
        let service = AccountService::new(db.clone());

        let account = service
            .update_me(
                &actor,
                ProfileUpdate {
                    phone: Some("091 234.5678".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(account.phone.as_deref(), Some("0912345678"));

        let err = service
            .update_me(
                &actor,
                ProfileUpdate {
                    phone: Some("12345".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn notification_settings_default_and_replace() {
        let db = MemoryDb::new();
        let actor = db.seed_account("lan@example.com", &[Role::Consumer]);
        let service = AccountService::new(db.clone());

        let settings = service.notification_settings(&actor).await.unwrap();
        assert_eq!(settings, NotificationSettings::default());

        let mut changed = settings;
        changed.email.promotion = false;
        changed.push.system = false;
        service
            .update_notification_settings(&actor, changed)
            .await
            .unwrap();
        assert_eq!(service.notification_settings(&actor).await.unwrap(), changed);
    }

    #[tokio::test]
    async fn admin_cannot_delete_self_and_others_cannot_delete() {
        let db = MemoryDb::new();
        let admin = db.seed_account("admin@example.com", &[Role::Consumer, Role::Admin]);
        let user = db.seed_account("user@example.com", &[Role::Consumer]);
        let service = AccountService::new(db.clone());

        let err = service.delete(&admin, admin.account_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service.delete(&user, admin.account_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        service.delete(&admin, user.account_id).await.unwrap();
        assert_eq!(service.list_all(&admin).await.unwrap().len(), 1);
    }
}
