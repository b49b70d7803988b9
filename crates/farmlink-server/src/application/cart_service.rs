//! Cart Application Service (Use Case)

use std::sync::Arc;
use uuid::Uuid;

use farmlink::domain::validate_quantity;
use farmlink::{
    Actor, CartItem, CartLine, CartRepository, DomainError, ProductRepository, ProductStatus,
};

pub struct CartService<K: CartRepository, P: ProductRepository> {
    cart: Arc<K>,
    products: Arc<P>,
}

impl<K: CartRepository, P: ProductRepository> CartService<K, P> {
    pub fn new(cart: Arc<K>, products: Arc<P>) -> Self {
        Self { cart, products }
    }

    /// Put a product in the cart; an existing line for it grows instead
    pub async fn add(
        &self,
        actor: &Actor,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        validate_quantity(quantity)?;

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", product_id))?;
        if product.status != ProductStatus::Active {
            return Err(DomainError::validation(format!(
                "product {} is not available",
                product.name
            )));
        }

        let saved = self
            .cart
            .merge(&CartItem::new(actor.account_id, product_id, quantity))
            .await?;
        tracing::info!(
            "Cart of {}: product {} x{}",
            actor.account_id,
            product_id,
            saved.quantity
        );
        Ok(saved)
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<CartLine>, DomainError> {
        self.cart.find_lines(actor.account_id).await
    }

    pub async fn update_quantity(
        &self,
        actor: &Actor,
        id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        validate_quantity(quantity)?;
        let mut item = self.owned(actor, id).await?;
        item.quantity = quantity;
        item.updated_at = chrono::Utc::now();
        self.cart.save(&item).await
    }

    pub async fn remove(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        self.owned(actor, id).await?;
        self.cart.delete(id).await?;
        Ok(())
    }

    pub async fn clear(&self, actor: &Actor) -> Result<u64, DomainError> {
        let removed = self.cart.clear(actor.account_id).await?;
        tracing::info!("Cleared {} cart items of {}", removed, actor.account_id);
        Ok(removed)
    }

    async fn owned(&self, actor: &Actor, id: Uuid) -> Result<CartItem, DomainError> {
        let item = self
            .cart
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("CartItem", id))?;
        if item.account_id != actor.account_id {
            return Err(DomainError::forbidden("cart item belongs to another account"));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryDb;
    use farmlink::Role;

    #[tokio::test]
    async fn adding_same_product_merges_quantity() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let buyer = db.seed_account("user@example.com", &[Role::Consumer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 30);
        let service = CartService::new(db.clone(), db.clone());

        let first = service.add(&buyer, product.id, 2).await.unwrap();
        let merged = service.add(&buyer, product.id, 3).await.unwrap();
        assert_eq!(first.id, merged.id);
        assert_eq!(merged.quantity, 5);

        let lines = service.list(&buyer).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.farmer_id, farmer.farmer_id.unwrap());
    }

    #[tokio::test]
    async fn simultaneous_first_adds_share_one_line() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let buyer = db.seed_account("user@example.com", &[Role::Consumer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 30);
        let service = CartService::new(db.clone(), db.clone());

        // Both requests saw an empty cart and built their own line
        let first = CartItem::new(buyer.account_id, product.id, 2);
        let second = CartItem::new(buyer.account_id, product.id, 3);
        let stored = db.merge(&first).await.unwrap();
        let merged = db.merge(&second).await.unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(merged.id, first.id);

        let lines = service.list(&buyer).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item.quantity, 5);
    }

    #[tokio::test]
    async fn rejects_bad_quantity_and_unavailable_product() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let buyer = db.seed_account("user@example.com", &[Role::Consumer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 30);
        let service = CartService::new(db.clone(), db.clone());

        let err = service.add(&buyer, product.id, 0).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let products = crate::application::ProductService::new(db.clone(), db.clone(), db.clone());
        products
            .admin_change_status(&admin, product.id, ProductStatus::Blocked)
            .await
            .unwrap();
        let err = service.add(&buyer, product.id, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn only_owner_can_touch_a_line() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let buyer = db.seed_account("user@example.com", &[Role::Consumer]);
        let other = db.seed_account("other@example.com", &[Role::Consumer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 30);
        let item = db.seed_cart_item(buyer.account_id, product.id, 1);
        let service = CartService::new(db.clone(), db.clone());

        let err = service
            .update_quantity(&other, item.id, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        let err = service.remove(&other, item.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(service.clear(&other).await.unwrap(), 0);

        let updated = service.update_quantity(&buyer, item.id, 4).await.unwrap();
        assert_eq!(updated.quantity, 4);
        service.remove(&buyer, item.id).await.unwrap();
        assert_eq!(db.cart_len(), 0);
    }
}
