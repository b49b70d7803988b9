//! Product Application Service (Use Case)
//!
//! Farmer-side product management, the public catalogue and the
//! administrator's moderation.

use std::sync::Arc;
use uuid::Uuid;

use farmlink::domain::services::subtree_ids;
use farmlink::{
    Actor, CategoryRepository, DomainError, FarmerRepository, Page, PageRequest, Product,
    ProductDraft, ProductName, ProductQuery, ProductRepository, ProductStatus, Role,
};

pub struct ProductService<P: ProductRepository, C: CategoryRepository, F: FarmerRepository> {
    products: Arc<P>,
    categories: Arc<C>,
    farmers: Arc<F>,
}

impl<P, C, F> ProductService<P, C, F>
where
    P: ProductRepository,
    C: CategoryRepository,
    F: FarmerRepository,
{
    pub fn new(products: Arc<P>, categories: Arc<C>, farmers: Arc<F>) -> Self {
        Self {
            products,
            categories,
            farmers,
        }
    }

    pub async fn create(&self, actor: &Actor, draft: ProductDraft) -> Result<Product, DomainError> {
        let farmer_id = self.active_farmer(actor).await?;
        draft.validate()?;
        self.ensure_category(draft.category_id).await?;

        let product = self.products.save(&Product::new(farmer_id, draft)).await?;

        tracing::info!("Created product: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Product, DomainError> {
        let farmer_id = self.active_farmer(actor).await?;
        let mut product = self.owned_product(farmer_id, id).await?;
        draft.validate()?;
        self.ensure_category(draft.category_id).await?;

        product.apply(draft);
        let saved = self.products.save(&product).await?;

        tracing::info!("Updated product: {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    /// Soft delete; the row stays for orders that reference it
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        let farmer_id = actor.require_farmer()?;
        let mut product = self.owned_product(farmer_id, id).await?;

        product.soft_delete();
        self.products.save(&product).await?;

        tracing::info!("Deleted product: {}", id);
        Ok(())
    }

    /// Fetch one product as seen by `actor` (anonymous when `None`)
    pub async fn get(&self, actor: Option<&Actor>, id: Uuid) -> Result<Product, DomainError> {
        let product = self.find(id).await?;
        let roles = actor.map(|a| a.roles.as_slice()).unwrap_or(&[]);
        if !product.visible_to(roles) {
            return Err(DomainError::forbidden("product is not available"));
        }
        Ok(product)
    }

    pub async fn catalogue(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let category_ids = match query.category_id {
            Some(id) => {
                let all = self.categories.find_all().await?;
                if !all.iter().any(|c| c.id == id) {
                    return Err(DomainError::not_found("Category", id));
                }
                Some(subtree_ids(&all, id))
            }
            None => None,
        };

        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(DomainError::validation("min_price is greater than max_price"));
            }
        }

        self.products
            .search(query, category_ids.as_deref(), page)
            .await
    }

    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<Product>, DomainError> {
        let farmer_id = actor.require_farmer()?;
        self.products.find_by_farmer(farmer_id).await
    }

    pub async fn list_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Product>, DomainError> {
        if self.farmers.find_by_id(farmer_id).await?.is_none() {
            return Err(DomainError::not_found("Farmer", farmer_id));
        }
        self.products.find_by_farmer(farmer_id).await
    }

    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<Product>, DomainError> {
        actor.require_role(Role::Admin)?;
        self.products.find_all().await
    }

    pub async fn names(&self) -> Result<Vec<ProductName>, DomainError> {
        self.products.find_names().await
    }

    pub async fn admin_change_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: ProductStatus,
    ) -> Result<Product, DomainError> {
        actor.require_role(Role::Admin)?;
        if !status.is_admin_assignable() {
            return Err(DomainError::forbidden(format!(
                "administrators cannot set a product to {}",
                status
            )));
        }

        let mut product = self.find(id).await?;
        if product.is_deleted() {
            return Err(DomainError::conflict("deleted products cannot be restored"));
        }

        product.status = status;
        product.updated_at = chrono::Utc::now();
        let saved = self.products.save(&product).await?;

        tracing::info!("Product {} status set to {}", saved.id, saved.status);
        Ok(saved)
    }

    async fn find(&self, id: Uuid) -> Result<Product, DomainError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    async fn owned_product(&self, farmer_id: Uuid, id: Uuid) -> Result<Product, DomainError> {
        let product = self.find(id).await?;
        if product.is_deleted() {
            return Err(DomainError::not_found("Product", id));
        }
        if product.farmer_id != farmer_id {
            return Err(DomainError::forbidden("product belongs to another farmer"));
        }
        Ok(product)
    }

    async fn active_farmer(&self, actor: &Actor) -> Result<Uuid, DomainError> {
        let farmer_id = actor.require_farmer()?;
        let farmer = self
            .farmers
            .find_by_id(farmer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Farmer", farmer_id))?;
        farmer.ensure_active()?;
        Ok(farmer_id)
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), DomainError> {
        match self.categories.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Category", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{draft, MemoryDb};
    use farmlink::{FarmerStatus, ProductSort};

    type Service = ProductService<MemoryDb, MemoryDb, MemoryDb>;

    fn service(db: &Arc<MemoryDb>) -> Service {
        ProductService::new(db.clone(), db.clone(), db.clone())
    }

    #[tokio::test]
    async fn create_requires_active_farmer_and_known_category() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let consumer = db.seed_account("user@example.com", &[Role::Consumer]);
        let veg = db.seed_category("Rau củ", None);
        let service = service(&db);

        let mut d = draft(veg.id, "Cải ngọt", 15_000, 20);
        d.images = vec!["/a.jpg".into(), "/a.jpg".into(), "/b.jpg".into()];
        let product = service.create(&farmer, d).await.unwrap();
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.images, vec!["/a.jpg", "/b.jpg"]);

        let err = service
            .create(&consumer, draft(veg.id, "Cải", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service
            .create(&farmer, draft(Uuid::new_v4(), "Cải", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        db.set_farmer_status(farmer.farmer_id.unwrap(), FarmerStatus::SelfBlock);
        let err = service
            .create(&farmer, draft(veg.id, "Cải", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_reconciles_images_and_checks_owner() {
        let db = MemoryDb::new();
        let owner = db.seed_account("farm@example.com", &[Role::Farmer]);
        let other = db.seed_account("other@example.com", &[Role::Farmer]);
        let veg = db.seed_category("Rau củ", None);
        let service = service(&db);

        let mut d = draft(veg.id, "Cải ngọt", 15_000, 20);
        d.images = vec!["/a.jpg".into(), "/b.jpg".into(), "/c.jpg".into()];
        let product = service.create(&owner, d).await.unwrap();

        let mut change = draft(veg.id, "Cải ngọt", 16_000, 18);
        change.images = vec!["/d.jpg".into(), "/c.jpg".into(), "/a.jpg".into()];
        let updated = service.update(&owner, product.id, change.clone()).await.unwrap();
        assert_eq!(updated.images, vec!["/a.jpg", "/c.jpg", "/d.jpg"]);
        assert_eq!(updated.price, 16_000);

        let err = service
            .update(&other, product.id, change.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        service.delete(&owner, product.id).await.unwrap();
        let err = service.update(&owner, product.id, change).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn visibility_depends_on_role() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let consumer = db.seed_account("user@example.com", &[Role::Consumer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 3);
        let service = service(&db);

        service
            .admin_change_status(&admin, product.id, ProductStatus::Blocked)
            .await
            .unwrap();

        assert!(service.get(None, product.id).await.is_err());
        assert!(service.get(Some(&consumer), product.id).await.is_err());
        assert!(service.get(Some(&farmer), product.id).await.is_ok());

        service.delete(&farmer, product.id).await.unwrap();
        assert!(service.get(Some(&farmer), product.id).await.is_err());
        assert!(service.get(Some(&admin), product.id).await.is_ok());
    }

    #[tokio::test]
    async fn admin_status_rules() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 3);
        let service = service(&db);

        let err = service
            .admin_change_status(&admin, product.id, ProductStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        service.delete(&farmer, product.id).await.unwrap();
        let err = service
            .admin_change_status(&admin, product.id, ProductStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn catalogue_filters_subtree_and_hides_blocked_farmers() {
        let db = MemoryDb::new();
        let open = db.seed_account("open@example.com", &[Role::Farmer]);
        let closed = db.seed_account("closed@example.com", &[Role::Farmer]);
        let veg = db.seed_category("Rau củ", None);
        let leafy = db.seed_category("Rau lá", Some(&veg));
        let fruit = db.seed_category("Trái cây", None);

        let cheap = db.seed_product(open.farmer_id.unwrap(), leafy.id, 10_000, 3);
        let pricey = db.seed_product(open.farmer_id.unwrap(), veg.id, 50_000, 3);
        db.seed_product(open.farmer_id.unwrap(), fruit.id, 30_000, 3);
        db.seed_product(closed.farmer_id.unwrap(), veg.id, 20_000, 3);
        db.set_farmer_status(closed.farmer_id.unwrap(), FarmerStatus::AdminBlock);
        let service = service(&db);

        let query = ProductQuery {
            category_id: Some(veg.id),
            sort: ProductSort::PriceAsc,
            ..Default::default()
        };
        let page = service
            .catalogue(&query, PageRequest::new(Some(0), Some(10)))
            .await
            .unwrap();
        let ids: Vec<Uuid> = page.content.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![cheap.id, pricey.id]);
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.total_pages, 1);

        let bad = ProductQuery {
            min_price: Some(10),
            max_price: Some(5),
            ..Default::default()
        };
        assert!(service.catalogue(&bad, PageRequest::default()).await.is_err());
    }

    #[tokio::test]
    async fn catalogue_past_last_page_is_empty() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let veg = db.seed_category("Rau củ", None);
        db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 3);
        let service = service(&db);

        let page = service
            .catalogue(
                &ProductQuery::default(),
                PageRequest::new(Some(i64::MAX / 50), Some(100)),
            )
            .await
            .unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 1);
    }
}
