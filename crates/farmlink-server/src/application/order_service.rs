//! Order Application Service (Use Case)
//!
//! Checkout from the cart and the order status workflow shared by
//! consumers, farmers and administrators.

use std::sync::Arc;
use uuid::Uuid;

use farmlink::domain::services::{
    apply_transition, build_order_items, ensure_selection, plan_transition, CheckoutLine,
};
use farmlink::{
    Actor, AddressRepository, CartRepository, DomainError, FarmerRepository, Order,
    OrderRepository, OrderStatus, PaymentMethod, ProductRepository, Role,
};

/// What the consumer picked at checkout
#[derive(Debug, Clone)]
pub struct Checkout {
    pub address_id: Uuid,
    pub farmer_id: Uuid,
    pub cart_item_ids: Vec<Uuid>,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
}

pub struct OrderService<O, K, P, D, F>
where
    O: OrderRepository,
    K: CartRepository,
    P: ProductRepository,
    D: AddressRepository,
    F: FarmerRepository,
{
    orders: Arc<O>,
    cart: Arc<K>,
    products: Arc<P>,
    addresses: Arc<D>,
    farmers: Arc<F>,
}

impl<O, K, P, D, F> OrderService<O, K, P, D, F>
where
    O: OrderRepository,
    K: CartRepository,
    P: ProductRepository,
    D: AddressRepository,
    F: FarmerRepository,
{
    pub fn new(
        orders: Arc<O>,
        cart: Arc<K>,
        products: Arc<P>,
        addresses: Arc<D>,
        farmers: Arc<F>,
    ) -> Self {
        Self {
            orders,
            cart,
            products,
            addresses,
            farmers,
        }
    }

    /// Turn selected cart items into a PENDING order for one farmer
    pub async fn create(&self, actor: &Actor, checkout: Checkout) -> Result<Order, DomainError> {
        ensure_selection(&checkout.cart_item_ids)?;

        let address = self
            .addresses
            .find_by_id(checkout.address_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Address", checkout.address_id))?;
        if address.account_id != actor.account_id {
            return Err(DomainError::forbidden("address belongs to another account"));
        }

        let farmer = self
            .farmers
            .find_by_id(checkout.farmer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Farmer", checkout.farmer_id))?;
        if !farmer.is_active() {
            return Err(DomainError::validation(format!(
                "farmer {} is not accepting orders",
                farmer.name
            )));
        }

        let lines = self.checkout_lines(&checkout.cart_item_ids).await?;
        let items = build_order_items(actor.account_id, farmer.id, &lines)?;

        let note = checkout
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let order = Order::new(
            actor.account_id,
            farmer.id,
            address.postal,
            note,
            items,
            checkout.payment_method,
        );
        let placed = self.orders.place(&order, &checkout.cart_item_ids).await?;

        tracing::info!(
            "Order {} placed by {} with farmer {} ({} VND)",
            placed.id,
            actor.account_id,
            placed.farmer_id,
            placed.total_price
        );
        Ok(placed)
    }

    /// Move an order along the workflow acting as `as_role`
    pub async fn change_status(
        &self,
        actor: &Actor,
        as_role: Role,
        order_id: Uuid,
        to: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, DomainError> {
        let mut order = self.find(order_id).await?;
        let plan = plan_transition(&order, actor, as_role, to)?;
        apply_transition(&mut order, &plan, reason);

        let saved = self
            .orders
            .apply_transition(&order, &plan)
            .await?;

        tracing::info!(
            "Order {}: {} -> {} by {} ({})",
            saved.id,
            plan.from,
            plan.to,
            actor.account_id,
            as_role
        );
        Ok(saved)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Order, DomainError> {
        let order = self.find(id).await?;
        let is_buyer = order.account_id == actor.account_id;
        let is_seller = actor.farmer_id == Some(order.farmer_id) && actor.has_role(Role::Farmer);
        if !(is_buyer || is_seller || actor.is_admin()) {
            return Err(DomainError::forbidden("order belongs to another account"));
        }
        Ok(order)
    }

    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<Order>, DomainError> {
        self.orders.find_by_account(actor.account_id).await
    }

    pub async fn list_for_farmer(&self, actor: &Actor) -> Result<Vec<Order>, DomainError> {
        let farmer_id = actor.require_farmer()?;
        self.orders.find_by_farmer(farmer_id).await
    }

    pub async fn list_all(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        actor.require_role(Role::Admin)?;
        self.orders.find_all(status).await
    }

    async fn find(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    /// Load cart items in the requested order together with their products
    async fn checkout_lines(&self, ids: &[Uuid]) -> Result<Vec<CheckoutLine>, DomainError> {
        let items = self.cart.find_many(ids).await?;
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products = self.products.find_many(&product_ids).await?;

        ids.iter()
            .map(|id| {
                let cart_item = items
                    .iter()
                    .find(|i| i.id == *id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found("CartItem", *id))?;
                let product = products
                    .iter()
                    .find(|p| p.id == cart_item.product_id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found("Product", cart_item.product_id))?;
                Ok(CheckoutLine { cart_item, product })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryDb;
    use chrono::Utc;
    use farmlink::{Address, FarmerStatus, Payment, PaymentRepository, PaymentStatus};

    type Service = OrderService<MemoryDb, MemoryDb, MemoryDb, MemoryDb, MemoryDb>;

    struct Shop {
        db: Arc<MemoryDb>,
        service: Service,
        buyer: Actor,
        farmer: Actor,
        admin: Actor,
        address: Address,
        product_id: Uuid,
        cart_item_id: Uuid,
    }

    async fn shop(inventory: i32, in_cart: i32) -> Shop {
        let db = MemoryDb::new();
        let buyer = db.seed_account("buyer@example.com", &[Role::Consumer]);
        let farmer = db.seed_account("farm@example.com", &[Role::Consumer, Role::Farmer]);
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 25_000, inventory);
        let item = db.seed_cart_item(buyer.account_id, product.id, in_cart);
        let address = db.seed_address(buyer.account_id);

        Shop {
            service: OrderService::new(db.clone(), db.clone(), db.clone(), db.clone(), db.clone()),
            db,
            buyer,
            farmer,
            admin,
            address,
            product_id: product.id,
            cart_item_id: item.id,
        }
    }

    impl Shop {
        fn checkout(&self, method: PaymentMethod) -> Checkout {
            Checkout {
                address_id: self.address.id,
                farmer_id: self.farmer.farmer_id.unwrap(),
                cart_item_ids: vec![self.cart_item_id],
                payment_method: method,
                note: Some("  giao buổi sáng ".into()),
            }
        }
    }

    #[tokio::test]
    async fn checkout_clamps_to_inventory_and_consumes_cart() {
        let shop = shop(3, 5).await;

        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Cod))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total_quantity, 3);
        assert_eq!(order.total_price, 75_000);
        assert_eq!(order.note.as_deref(), Some("giao buổi sáng"));
        assert_eq!(order.shipping_address, shop.address.postal);
        assert_eq!(shop.db.product(shop.product_id).inventory, 0);
        assert_eq!(shop.db.cart_len(), 0);
    }

    #[tokio::test]
    async fn checkout_rejects_empty_stock_and_foreign_items() {
        let empty = shop(0, 2).await;
        let err = empty
            .service
            .create(&empty.buyer, empty.checkout(PaymentMethod::Cod))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let shop = shop(5, 2).await;
        let stranger = shop.db.seed_account("x@example.com", &[Role::Consumer]);
        let mut checkout = shop.checkout(PaymentMethod::Cod);
        checkout.address_id = shop.db.seed_address(stranger.account_id).id;
        let err = shop.service.create(&stranger, checkout).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut twice = shop.checkout(PaymentMethod::Cod);
        twice.cart_item_ids.push(shop.cart_item_id);
        let err = shop.service.create(&shop.buyer, twice).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn checkout_requires_active_farmer() {
        let shop = shop(5, 2).await;
        shop.db
            .set_farmer_status(shop.farmer.farmer_id.unwrap(), FarmerStatus::SelfBlock);
        let err = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Cod))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn cod_order_runs_to_received() {
        let shop = shop(10, 4).await;
        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Cod))
            .await
            .unwrap();

        for to in [
            OrderStatus::Confirmed,
            OrderStatus::Delivering,
            OrderStatus::Delivered,
        ] {
            shop.service
                .change_status(&shop.farmer, Role::Farmer, order.id, to, None)
                .await
                .unwrap();
        }
        let delivered = shop.service.get(&shop.buyer, order.id).await.unwrap();
        assert_eq!(delivered.payment_status, PaymentStatus::Paid);

        let received = shop
            .service
            .change_status(&shop.buyer, Role::Consumer, order.id, OrderStatus::Received, None)
            .await
            .unwrap();
        assert_eq!(received.history.len(), 5);
        assert_eq!(shop.db.product(shop.product_id).sold, 4);
        assert_eq!(shop.db.product(shop.product_id).inventory, 6);
    }

    #[tokio::test]
    async fn cancel_restores_inventory_and_records_reason() {
        let shop = shop(10, 4).await;
        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Vnpay))
            .await
            .unwrap();

        let canceled = shop
            .service
            .change_status(
                &shop.buyer,
                Role::Consumer,
                order.id,
                OrderStatus::Canceled,
                Some("đổi ý".into()),
            )
            .await
            .unwrap();
        assert_eq!(canceled.payment_status, PaymentStatus::Canceled);
        assert_eq!(canceled.last_status_change_reason.as_deref(), Some("đổi ý"));
        assert_eq!(shop.db.product(shop.product_id).inventory, 10);

        let err = shop
            .service
            .change_status(&shop.admin, Role::Admin, order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn role_and_ownership_rules() {
        let shop = shop(10, 4).await;
        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Cod))
            .await
            .unwrap();

        let err = shop
            .service
            .change_status(&shop.buyer, Role::Consumer, order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let rival = shop
            .db
            .seed_account("rival@example.com", &[Role::Farmer]);
        let err = shop
            .service
            .change_status(&rival, Role::Farmer, order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(shop.service.get(&rival, order.id).await.is_err());

        let err = shop
            .service
            .change_status(&shop.buyer, Role::Admin, order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        assert_eq!(shop.service.list_for_farmer(&shop.farmer).await.unwrap().len(), 1);
        assert_eq!(
            shop.service
                .list_all(&shop.admin, Some(OrderStatus::Pending))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(shop.service.list_all(&shop.buyer, None).await.is_err());
    }

    #[tokio::test]
    async fn stale_decision_is_a_conflict() {
        let shop = shop(10, 4).await;
        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Cod))
            .await
            .unwrap();

        let mut stale = order.clone();
        let plan = plan_transition(&stale, &shop.farmer, Role::Farmer, OrderStatus::Confirmed)
            .unwrap();
        apply_transition(&mut stale, &plan, None);

        shop.service
            .change_status(&shop.buyer, Role::Consumer, order.id, OrderStatus::Canceled, None)
            .await
            .unwrap();

        let err = OrderRepository::apply_transition(&*shop.db, &stale, &plan)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    fn online_payment(order: &Order) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            order_id: order.id,
            method: PaymentMethod::Vnpay,
            amount: order.total_price,
            transaction_no: Some("14422574".into()),
            bank_code: Some("NCB".into()),
            card_type: None,
            response_code: Some("00".into()),
            pay_date: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn cancel_racing_online_payment_ends_refunded() {
        let shop = shop(10, 4).await;
        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Vnpay))
            .await
            .unwrap();

        let mut stale = order.clone();
        let plan = plan_transition(&stale, &shop.buyer, Role::Consumer, OrderStatus::Canceled)
            .unwrap();
        apply_transition(&mut stale, &plan, None);
        assert_eq!(stale.payment_status, PaymentStatus::Canceled);

        assert!(shop.db.record_success(&online_payment(&order)).await.unwrap());

        let err = OrderRepository::apply_transition(&*shop.db, &stale, &plan)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(shop.db.product(shop.product_id).inventory, 6);

        let canceled = shop
            .service
            .change_status(&shop.buyer, Role::Consumer, order.id, OrderStatus::Canceled, None)
            .await
            .unwrap();
        assert_eq!(canceled.payment_status, PaymentStatus::Refunded);
        assert_eq!(shop.db.product(shop.product_id).inventory, 10);
    }

    #[tokio::test]
    async fn payment_after_cancel_is_refunded() {
        let shop = shop(10, 4).await;
        let order = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Vnpay))
            .await
            .unwrap();
        shop.service
            .change_status(&shop.buyer, Role::Consumer, order.id, OrderStatus::Canceled, None)
            .await
            .unwrap();

        assert!(shop.db.record_success(&online_payment(&order)).await.unwrap());
        let stored = shop.service.get(&shop.buyer, order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Canceled);
        assert_eq!(stored.payment_status, PaymentStatus::Refunded);
        assert!(!shop.db.record_success(&online_payment(&order)).await.unwrap());
        assert_eq!(shop.db.payments().len(), 1);
    }

    #[tokio::test]
    async fn cart_line_feeds_a_single_order() {
        let shop = shop(10, 2).await;
        let first = shop
            .service
            .create(&shop.buyer, shop.checkout(PaymentMethod::Cod))
            .await
            .unwrap();
        assert_eq!(shop.db.product(shop.product_id).inventory, 8);

        let second = Order::new(
            shop.buyer.account_id,
            first.farmer_id,
            first.shipping_address.clone(),
            None,
            first.items.clone(),
            PaymentMethod::Cod,
        );
        let err = shop
            .db
            .place(&second, &[shop.cart_item_id])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(shop.db.product(shop.product_id).inventory, 8);
        assert!(OrderRepository::find_by_id(&*shop.db, second.id)
            .await
            .unwrap()
            .is_none());
    }
}
