//! Ocop - "One Commune One Product" certification of a product
//!
//! A farmer submits the certificate details, an administrator verifies or
//! rejects them. Only a rejected certification may be edited and sent
//! back for review.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::reconcile_images;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::OcopStatus;

pub const MIN_OCOP_STAR: i32 = 3;
pub const MAX_OCOP_STAR: i32 = 5;
pub const MIN_ISSUED_YEAR: i32 = 1900;

/// Certification attached to one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ocop {
    pub product_id: Uuid,
    pub star: i32,
    pub certificate_number: String,
    pub issued_year: i32,
    pub issuer: String,
    /// Scans of the certificate
    pub images: Vec<String>,
    pub status: OcopStatus,
    /// Administrator account that took the last decision
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    /// Why the last review rejected it
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Certificate details as entered by the farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcopDraft {
    pub star: i32,
    pub certificate_number: String,
    pub issued_year: i32,
    pub issuer: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl OcopDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(MIN_OCOP_STAR..=MAX_OCOP_STAR).contains(&self.star) {
            return Err(DomainError::validation(format!(
                "star must be between {} and {}",
                MIN_OCOP_STAR, MAX_OCOP_STAR
            )));
        }
        if self.certificate_number.trim().is_empty() {
            return Err(DomainError::validation("certificate_number is required"));
        }
        let this_year = Utc::now().year();
        if self.issued_year < MIN_ISSUED_YEAR || self.issued_year > this_year {
            return Err(DomainError::validation(format!(
                "issued_year must be between {} and {}",
                MIN_ISSUED_YEAR, this_year
            )));
        }
        if self.issuer.trim().is_empty() {
            return Err(DomainError::validation("issuer is required"));
        }
        if self.images.iter().all(|path| path.trim().is_empty()) {
            return Err(DomainError::validation(
                "at least one certificate image is required",
            ));
        }
        Ok(())
    }
}

impl Ocop {
    /// New submission waiting for review
    pub fn submit(product_id: Uuid, draft: OcopDraft) -> Self {
        let now = Utc::now();
        Self {
            product_id,
            star: draft.star,
            certificate_number: draft.certificate_number.trim().to_string(),
            issued_year: draft.issued_year,
            issuer: draft.issuer.trim().to_string(),
            images: reconcile_images(&[], &draft.images),
            status: OcopStatus::PendingVerify,
            verified_by: None,
            verified_at: None,
            reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the details of a rejected certification and queue it again.
    /// The last rejection reason stays visible until the next review.
    pub fn resubmit(&mut self, draft: OcopDraft) -> Result<(), DomainError> {
        if self.status != OcopStatus::Rejected {
            return Err(DomainError::validation(format!(
                "OCOP can only be updated after a rejection, it is {}",
                self.status
            )));
        }
        self.star = draft.star;
        self.certificate_number = draft.certificate_number.trim().to_string();
        self.issued_year = draft.issued_year;
        self.issuer = draft.issuer.trim().to_string();
        self.images = reconcile_images(&self.images, &draft.images);
        self.status = OcopStatus::PendingVerify;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn approve(&mut self, admin_id: Uuid) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.decide(OcopStatus::Verified, admin_id, None);
        Ok(())
    }

    pub fn reject(&mut self, admin_id: Uuid, reason: &str) -> Result<(), DomainError> {
        self.ensure_pending()?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("a rejection needs a reason"));
        }
        self.decide(OcopStatus::Rejected, admin_id, Some(reason.to_string()));
        Ok(())
    }

    pub fn is_verified(&self) -> bool {
        self.status == OcopStatus::Verified
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status != OcopStatus::PendingVerify {
            return Err(DomainError::validation(format!(
                "OCOP is {}, not {}",
                self.status,
                OcopStatus::PendingVerify
            )));
        }
        Ok(())
    }

    fn decide(&mut self, status: OcopStatus, admin_id: Uuid, reason: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.verified_by = Some(admin_id);
        self.verified_at = Some(now);
        self.reason = reason;
        self.updated_at = now;
    }
}
