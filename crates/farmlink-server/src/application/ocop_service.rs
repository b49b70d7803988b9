//! OCOP Application Service (Use Case)
//!
//! Farmers submit certifications for their products, administrators
//! review them. Reviews only act on PENDING_VERIFY certifications and a
//! farmer may only edit one that was rejected.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use farmlink::{
    Actor, DomainError, Ocop, OcopDraft, OcopRepository, OcopStatus, Product, ProductRepository,
    ProductSummary, Role,
};

/// Certification with the product it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct OcopView {
    #[serde(flatten)]
    pub ocop: Ocop,
    pub product: Option<ProductSummary>,
}

pub struct OcopService<O: OcopRepository, P: ProductRepository> {
    ocops: Arc<O>,
    products: Arc<P>,
}

impl<O: OcopRepository, P: ProductRepository> OcopService<O, P> {
    pub fn new(ocops: Arc<O>, products: Arc<P>) -> Self {
        Self { ocops, products }
    }

    /// First submission, or a resubmission after a rejection
    pub async fn submit(
        &self,
        actor: &Actor,
        product_id: Uuid,
        draft: OcopDraft,
    ) -> Result<OcopView, DomainError> {
        let farmer_id = actor.require_farmer()?;
        let product = self.find_product(product_id).await?;
        if product.is_deleted() {
            return Err(DomainError::not_found("Product", product_id));
        }
        if product.farmer_id != farmer_id {
            return Err(DomainError::forbidden("product belongs to another farmer"));
        }
        draft.validate()?;

        let saved = match self.ocops.find_by_product(product_id).await? {
            None => self.ocops.insert(&Ocop::submit(product_id, draft)).await?,
            Some(mut ocop) => {
                ocop.resubmit(draft)?;
                self.ocops.update(&ocop, OcopStatus::Rejected).await?
            }
        };

        tracing::info!("OCOP submitted for product {} ({} stars)", product_id, saved.star);
        Ok(Self::view(saved, &product))
    }

    /// Certification of a product. Anyone who may see the product sees a
    /// VERIFIED one; the owner farmer and administrators see it in any state.
    pub async fn get(
        &self,
        actor: Option<&Actor>,
        product_id: Uuid,
    ) -> Result<OcopView, DomainError> {
        let product = self.find_product(product_id).await?;
        let roles = actor.map(|a| a.roles.as_slice()).unwrap_or(&[]);
        if !product.visible_to(roles) {
            return Err(DomainError::forbidden("product is not available"));
        }

        let is_reviewer = actor.map_or(false, |a| {
            a.is_admin() || (a.has_role(Role::Farmer) && a.farmer_id == Some(product.farmer_id))
        });
        match self.ocops.find_by_product(product_id).await? {
            Some(ocop) if ocop.is_verified() || is_reviewer => Ok(Self::view(ocop, &product)),
            _ => Err(DomainError::not_found("Ocop", product_id)),
        }
    }

    /// Review queue (ADMIN), optionally of one status
    pub async fn list(
        &self,
        actor: &Actor,
        status: Option<OcopStatus>,
    ) -> Result<Vec<OcopView>, DomainError> {
        actor.require_role(Role::Admin)?;
        let ocops = self.ocops.find_all(status).await?;

        let ids: Vec<Uuid> = ocops.iter().map(|o| o.product_id).collect();
        let products: HashMap<Uuid, ProductSummary> = self
            .products
            .find_many(&ids)
            .await?
            .iter()
            .map(|p| (p.id, ProductSummary::from(p)))
            .collect();

        Ok(ocops
            .into_iter()
            .map(|ocop| OcopView {
                product: products.get(&ocop.product_id).cloned(),
                ocop,
            })
            .collect())
    }

    pub async fn approve(&self, actor: &Actor, product_id: Uuid) -> Result<OcopView, DomainError> {
        actor.require_role(Role::Admin)?;
        let mut ocop = self.find(product_id).await?;
        ocop.approve(actor.account_id)?;

        let saved = self.ocops.update(&ocop, OcopStatus::PendingVerify).await?;
        tracing::info!("OCOP of product {} verified by {}", product_id, actor.account_id);
        self.view_of(saved).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        product_id: Uuid,
        reason: &str,
    ) -> Result<OcopView, DomainError> {
        actor.require_role(Role::Admin)?;
        let mut ocop = self.find(product_id).await?;
        ocop.reject(actor.account_id, reason)?;

        let saved = self.ocops.update(&ocop, OcopStatus::PendingVerify).await?;
        tracing::info!("OCOP of product {} rejected by {}", product_id, actor.account_id);
        self.view_of(saved).await
    }

    async fn find(&self, product_id: Uuid) -> Result<Ocop, DomainError> {
        self.ocops
            .find_by_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ocop", product_id))
    }

    async fn find_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    async fn view_of(&self, ocop: Ocop) -> Result<OcopView, DomainError> {
        let product = self.products.find_by_id(ocop.product_id).await?;
        Ok(OcopView {
            product: product.as_ref().map(ProductSummary::from),
            ocop,
        })
    }

    fn view(ocop: Ocop, product: &Product) -> OcopView {
        OcopView {
            ocop,
            product: Some(product.into()),
        }
    }
}
