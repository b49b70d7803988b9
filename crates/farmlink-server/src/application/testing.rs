//! In-memory repositories for application service tests
//!
//! A single `MemoryDb` implements every repository port so that effects
//! spanning several tables (checkout, payments, farmer upgrade) behave the
//! way the Postgres adapters do.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use farmlink::domain::services::TransitionPlan;
use farmlink::{
    Account, AccountRepository, Actor, Address, AddressRepository, CartItem, CartLine,
    CartRepository, Category, CategoryRepository, DomainError, Farmer, FarmerRepository,
    FarmerStatus, MarketPrice, MarketPriceRepository, Ocop, OcopRepository, OcopStatus, Order,
    OrderRepository, OrderStatus, Page, PageRequest, PasswordHasher, Payment, PaymentGateway,
    PaymentRepository, PaymentStatus, PaymentUrlRequest, PostalAddress, Product, ProductDraft,
    ProductName, ProductQuery, ProductRepository, ProductSort, ProductStatus, Role,
};

use crate::adapters::JwtTokenIssuer;

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    addresses: Vec<Address>,
    farmers: Vec<Farmer>,
    categories: Vec<Category>,
    products: Vec<Product>,
    market_prices: Vec<MarketPrice>,
    ocops: Vec<Ocop>,
    cart: Vec<CartItem>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory db poisoned")
    }

    pub fn product(&self, id: Uuid) -> Product {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("product exists")
    }

    pub fn account(&self, id: Uuid) -> Account {
        self.lock()
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .expect("account exists")
    }

    pub fn cart_len(&self) -> usize {
        self.lock().cart.len()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.lock().payments.clone()
    }

    /// Insert an account holding `roles` and return the matching actor
    pub fn seed_account(&self, email: &str, roles: &[Role]) -> Actor {
        let mut account = Account::new(email.to_string(), "plain:password1".to_string(), None);
        account.roles = roles.to_vec();
        let mut tables = self.lock();
        let farmer_id = if roles.contains(&Role::Farmer) {
            let farmer = Farmer::new(account.id, format!("Farm of {}", email));
            let id = farmer.id;
            tables.farmers.push(farmer);
            Some(id)
        } else {
            None
        };
        let actor = Actor::new(account.id, account.roles.clone(), farmer_id);
        tables.accounts.push(account);
        actor
    }

    pub fn seed_category(&self, name: &str, parent: Option<&Category>) -> Category {
        let category = Category::new(name.to_string(), parent);
        self.lock().categories.push(category.clone());
        category
    }

    pub fn seed_product(&self, farmer_id: Uuid, category_id: Uuid, price: i64, inventory: i32) -> Product {
        let product = Product::new(farmer_id, draft(category_id, "Cà chua", price, inventory));
        self.lock().products.push(product.clone());
        product
    }

    pub fn seed_cart_item(&self, account_id: Uuid, product_id: Uuid, quantity: i32) -> CartItem {
        let item = CartItem::new(account_id, product_id, quantity);
        self.lock().cart.push(item.clone());
        item
    }

    pub fn seed_address(&self, account_id: Uuid) -> Address {
        let address = Address::new(account_id, postal(), true);
        self.lock().addresses.push(address.clone());
        address
    }

    pub fn insert_order(&self, order: &Order) {
        self.lock().orders.push(order.clone());
    }

    pub fn set_farmer_status(&self, farmer_id: Uuid, status: FarmerStatus) {
        if let Some(f) = self.lock().farmers.iter_mut().find(|f| f.id == farmer_id) {
            f.status = status;
        }
    }
}

pub fn draft(category_id: Uuid, name: &str, price: i64, inventory: i32) -> ProductDraft {
    ProductDraft {
        category_id,
        name: name.to_string(),
        description: None,
        price,
        inventory,
        thumbnail: Some("/img/thumb.jpg".to_string()),
        unit_price: "kg".to_string(),
        images: vec![],
    }
}

pub fn postal() -> PostalAddress {
    PostalAddress {
        receiver_name: "Nguyễn Văn A".to_string(),
        receiver_phone: "0912345678".to_string(),
        province: "Hà Nội".to_string(),
        district: "Ba Đình".to_string(),
        ward: "Kim Mã".to_string(),
        detail: "12 Đào Tấn".to_string(),
    }
}

/// Cheap stand-in for Argon2 in tests
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        Ok(hash == format!("plain:{}", password))
    }
}

/// Gateway whose signature check accepts the literal hash `valid`
pub struct FakeGateway;

impl PaymentGateway for FakeGateway {
    fn payment_url(&self, request: &PaymentUrlRequest) -> Result<String, DomainError> {
        Ok(format!(
            "https://pay.test/?txn={}&amount={}&ip={}",
            request.order_id, request.amount, request.client_ip
        ))
    }

    fn verify(&self, fields: &BTreeMap<String, String>) -> bool {
        fields.get("vnp_SecureHash").map(String::as_str) == Some("valid")
    }
}

pub fn token_issuer() -> Arc<JwtTokenIssuer> {
    Arc::new(JwtTokenIssuer::new("test-secret-with-enough-length", 60, 30))
}

fn duplicate() -> DomainError {
    DomainError::conflict("Duplicate value")
}

#[async_trait]
impl AccountRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        Ok(self.lock().accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        Ok(self.lock().accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, DomainError> {
        let mut all = self.lock().accounts.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn save(&self, account: &Account) -> Result<Account, DomainError> {
        let mut tables = self.lock();
        if tables
            .accounts
            .iter()
            .any(|a| a.email == account.email && a.id != account.id)
        {
            return Err(duplicate());
        }
        let mut stored = account.clone();
        match tables.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => {
                stored.refresh_token = existing.refresh_token.clone();
                *existing = stored.clone();
            }
            None => tables.accounts.push(stored.clone()),
        }
        Ok(stored)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), DomainError> {
        if let Some(a) = self.lock().accounts.iter_mut().find(|a| a.id == id) {
            a.refresh_token = token.map(str::to_string);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        let before = tables.accounts.len();
        tables.accounts.retain(|a| a.id != id);
        Ok(tables.accounts.len() < before)
    }

    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.lock().accounts.len() as i64)
    }
}

fn demote_default(addresses: &mut [Address], account_id: Uuid, keep: Uuid) {
    for a in addresses
        .iter_mut()
        .filter(|a| a.account_id == account_id && a.id != keep)
    {
        a.is_default = false;
    }
}

#[async_trait]
impl AddressRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, DomainError> {
        Ok(self.lock().addresses.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Address>, DomainError> {
        let mut list: Vec<Address> = self
            .lock()
            .addresses
            .iter()
            .filter(|a| a.account_id == account_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(list)
    }

    async fn insert(&self, address: &Address) -> Result<Address, DomainError> {
        let mut tables = self.lock();
        if address.is_default {
            demote_default(&mut tables.addresses, address.account_id, address.id);
        }
        tables.addresses.push(address.clone());
        Ok(address.clone())
    }

    async fn update(&self, address: &Address) -> Result<Address, DomainError> {
        let mut tables = self.lock();
        if address.is_default {
            demote_default(&mut tables.addresses, address.account_id, address.id);
        }
        let slot = tables
            .addresses
            .iter_mut()
            .find(|a| a.id == address.id)
            .ok_or_else(|| DomainError::not_found("Address", address.id))?;
        *slot = address.clone();
        Ok(address.clone())
    }

    async fn set_default(&self, account_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.lock();
        let slot = tables
            .addresses
            .iter_mut()
            .find(|a| a.id == id && a.account_id == account_id)
            .ok_or_else(|| DomainError::not_found("Address", id))?;
        slot.is_default = true;
        demote_default(&mut tables.addresses, account_id, id);
        Ok(())
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        let Some(pos) = tables
            .addresses
            .iter()
            .position(|a| a.id == id && a.account_id == account_id)
        else {
            return Ok(false);
        };
        let removed = tables.addresses.remove(pos);
        if removed.is_default {
            if let Some(newest) = tables
                .addresses
                .iter_mut()
                .filter(|a| a.account_id == account_id)
                .max_by_key(|a| a.created_at)
            {
                newest.is_default = true;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl CartRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CartItem>, DomainError> {
        Ok(self.lock().cart.iter().find(|c| c.id == id).cloned())
    }

    async fn merge(&self, item: &CartItem) -> Result<CartItem, DomainError> {
        let mut tables = self.lock();
        match tables
            .cart
            .iter_mut()
            .find(|c| c.account_id == item.account_id && c.product_id == item.product_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.updated_at = Utc::now();
                Ok(existing.clone())
            }
            None => {
                tables.cart.push(item.clone());
                Ok(item.clone())
            }
        }
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<CartItem>, DomainError> {
        Ok(self
            .lock()
            .cart
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn find_lines(&self, account_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let tables = self.lock();
        let mut lines: Vec<CartLine> = tables
            .cart
            .iter()
            .filter(|c| c.account_id == account_id)
            .filter_map(|c| {
                let product = tables.products.iter().find(|p| p.id == c.product_id)?;
                Some(CartLine {
                    item: c.clone(),
                    product: product.into(),
                })
            })
            .collect();
        lines.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));
        Ok(lines)
    }

    async fn save(&self, item: &CartItem) -> Result<CartItem, DomainError> {
        let mut tables = self.lock();
        match tables.cart.iter_mut().find(|c| c.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => tables.cart.push(item.clone()),
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        let before = tables.cart.len();
        tables.cart.retain(|c| c.id != id);
        Ok(tables.cart.len() < before)
    }

    async fn clear(&self, account_id: Uuid) -> Result<u64, DomainError> {
        let mut tables = self.lock();
        let before = tables.cart.len();
        tables.cart.retain(|c| c.account_id != account_id);
        Ok((before - tables.cart.len()) as u64)
    }
}

#[async_trait]
impl CategoryRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.lock().categories.clone())
    }

    async fn insert(&self, category: &Category) -> Result<Category, DomainError> {
        self.lock().categories.push(category.clone());
        Ok(category.clone())
    }

    async fn update(
        &self,
        category: &Category,
        levels: &[(Uuid, i32)],
    ) -> Result<Category, DomainError> {
        let mut tables = self.lock();
        for c in tables.categories.iter_mut() {
            if c.id == category.id {
                *c = category.clone();
            }
            if let Some((_, level)) = levels.iter().find(|(id, _)| *id == c.id) {
                c.level = *level;
            }
        }
        tables
            .categories
            .iter()
            .find(|c| c.id == category.id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Category", category.id))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
        let mut tables = self.lock();
        let before = tables.categories.len();
        tables.categories.retain(|c| !ids.contains(&c.id));
        Ok((before - tables.categories.len()) as u64)
    }
}

#[async_trait]
impl FarmerRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Farmer>, DomainError> {
        Ok(self.lock().farmers.iter().find(|f| f.id == id).cloned())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Farmer>, DomainError> {
        Ok(self
            .lock()
            .farmers
            .iter()
            .find(|f| f.account_id == account_id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Farmer>, DomainError> {
        Ok(self.lock().farmers.clone())
    }

    async fn create_for_account(&self, farmer: &Farmer) -> Result<Farmer, DomainError> {
        let mut tables = self.lock();
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == farmer.account_id)
            .ok_or_else(|| DomainError::not_found("Account", farmer.account_id))?;
        if account.has_role(Role::Farmer) {
            return Err(DomainError::conflict("account is already a farmer"));
        }
        account.grant(Role::Farmer);
        tables.farmers.push(farmer.clone());
        Ok(farmer.clone())
    }

    async fn save(&self, farmer: &Farmer) -> Result<Farmer, DomainError> {
        let mut tables = self.lock();
        let slot = tables
            .farmers
            .iter_mut()
            .find(|f| f.id == farmer.id)
            .ok_or_else(|| DomainError::not_found("Farmer", farmer.id))?;
        *slot = farmer.clone();
        Ok(farmer.clone())
    }

    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.lock().farmers.len() as i64)
    }
}

#[async_trait]
impl MarketPriceRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketPrice>, DomainError> {
        Ok(self.lock().market_prices.iter().find(|m| m.id == id).cloned())
    }

    async fn find_all(&self, product_id: Option<Uuid>) -> Result<Vec<MarketPrice>, DomainError> {
        let mut list: Vec<MarketPrice> = self
            .lock()
            .market_prices
            .iter()
            .filter(|m| product_id.map_or(true, |p| m.product_id == p))
            .cloned()
            .collect();
        list.sort_by_key(|m| m.date_recorded);
        Ok(list)
    }

    async fn save(&self, price: &MarketPrice) -> Result<MarketPrice, DomainError> {
        let mut tables = self.lock();
        match tables.market_prices.iter_mut().find(|m| m.id == price.id) {
            Some(existing) => *existing = price.clone(),
            None => tables.market_prices.push(price.clone()),
        }
        Ok(price.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        let before = tables.market_prices.len();
        tables.market_prices.retain(|m| m.id != id);
        Ok(tables.market_prices.len() < before)
    }
}

#[async_trait]
impl OcopRepository for MemoryDb {
    async fn find_by_product(&self, product_id: Uuid) -> Result<Option<Ocop>, DomainError> {
        Ok(self
            .lock()
            .ocops
            .iter()
            .find(|o| o.product_id == product_id)
            .cloned())
    }

    async fn find_all(&self, status: Option<OcopStatus>) -> Result<Vec<Ocop>, DomainError> {
        let mut list: Vec<Ocop> = self
            .lock()
            .ocops
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn insert(&self, ocop: &Ocop) -> Result<Ocop, DomainError> {
        let mut tables = self.lock();
        if tables.ocops.iter().any(|o| o.product_id == ocop.product_id) {
            return Err(duplicate());
        }
        tables.ocops.push(ocop.clone());
        Ok(ocop.clone())
    }

    async fn update(&self, ocop: &Ocop, expected: OcopStatus) -> Result<Ocop, DomainError> {
        let mut tables = self.lock();
        let slot = tables
            .ocops
            .iter_mut()
            .find(|o| o.product_id == ocop.product_id && o.status == expected)
            .ok_or_else(|| {
                DomainError::conflict(format!(
                    "OCOP of product {} is no longer {}",
                    ocop.product_id, expected
                ))
            })?;
        *slot = ocop.clone();
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }
}

#[async_trait]
impl OrderRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut list: Vec<Order> = self
            .lock()
            .orders
            .iter()
            .filter(|o| o.account_id == account_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn find_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut list: Vec<Order> = self
            .lock()
            .orders
            .iter()
            .filter(|o| o.farmer_id == farmer_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn find_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, DomainError> {
        let mut list: Vec<Order> = self
            .lock()
            .orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn place(&self, order: &Order, cart_item_ids: &[Uuid]) -> Result<Order, DomainError> {
        let mut tables = self.lock();
        let consumable = tables
            .cart
            .iter()
            .filter(|c| cart_item_ids.contains(&c.id) && c.account_id == order.account_id)
            .count();
        if consumable != cart_item_ids.len() {
            return Err(DomainError::conflict("cart items were already checked out"));
        }
        for item in &order.items {
            let in_stock = tables.products.iter().any(|p| {
                p.id == item.product_id
                    && p.status == ProductStatus::Active
                    && p.inventory >= item.quantity
            });
            if !in_stock {
                return Err(DomainError::conflict(format!(
                    "not enough stock left for {}",
                    item.product_name
                )));
            }
        }
        for item in &order.items {
            if let Some(p) = tables.products.iter_mut().find(|p| p.id == item.product_id) {
                p.inventory -= item.quantity;
            }
        }
        tables
            .cart
            .retain(|c| !(cart_item_ids.contains(&c.id) && c.account_id == order.account_id));
        tables.orders.push(order.clone());
        Ok(order.clone())
    }

    async fn apply_transition(
        &self,
        order: &Order,
        plan: &TransitionPlan,
    ) -> Result<Order, DomainError> {
        let effects = plan.effects;
        let mut tables = self.lock();
        let slot = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| DomainError::not_found("Order", order.id))?;
        if slot.status != plan.from || slot.payment_status != plan.from_payment {
            return Err(DomainError::conflict(format!(
                "order {} changed since it was read ({}, payment {})",
                order.id, plan.from, plan.from_payment
            )));
        }
        *slot = order.clone();
        slot.updated_at = Utc::now();
        let stored = slot.clone();

        for item in &order.items {
            if let Some(p) = tables.products.iter_mut().find(|p| p.id == item.product_id) {
                if effects.restore_inventory {
                    p.inventory += item.quantity;
                }
                if effects.add_sold {
                    p.sold += item.quantity;
                }
            }
        }
        Ok(stored)
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        status: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        match tables
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.payment_status == expected)
        {
            Some(order) => {
                order.payment_status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn totals_by_status(&self) -> Result<Vec<(OrderStatus, i64, i64)>, DomainError> {
        let mut totals: HashMap<OrderStatus, (i64, i64)> = HashMap::new();
        for order in &self.lock().orders {
            let entry = totals.entry(order.status).or_default();
            entry.0 += 1;
            entry.1 += order.total_price;
        }
        Ok(totals.into_iter().map(|(s, (c, t))| (s, c, t)).collect())
    }
}

#[async_trait]
impl PaymentRepository for MemoryDb {
    async fn record_success(&self, payment: &Payment) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == payment.order_id)
            .ok_or_else(|| DomainError::not_found("Order", payment.order_id))?;
        if matches!(order.payment_status, PaymentStatus::Paid | PaymentStatus::Refunded) {
            return Ok(false);
        }
        order.payment_status = if order.status == OrderStatus::Canceled {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::Paid
        };
        tables.payments.push(payment.clone());
        Ok(true)
    }

    async fn find_by_order(&self, order_id: Uuid) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .lock()
            .payments
            .iter()
            .find(|p| p.order_id == order_id)
            .cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .lock()
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn save(&self, product: &Product) -> Result<Product, DomainError> {
        let mut tables = self.lock();
        match tables.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => tables.products.push(product.clone()),
        }
        Ok(product.clone())
    }

    async fn search(
        &self,
        query: &ProductQuery,
        category_ids: Option<&[Uuid]>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let tables = self.lock();
        let keyword = query.keyword.as_ref().map(|k| k.to_lowercase());
        let mut hits: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| p.status == ProductStatus::Active)
            .filter(|p| {
                tables
                    .farmers
                    .iter()
                    .any(|f| f.id == p.farmer_id && f.is_active())
            })
            .filter(|p| category_ids.map_or(true, |ids| ids.contains(&p.category_id)))
            .filter(|p| {
                keyword
                    .as_ref()
                    .map_or(true, |k| p.name.to_lowercase().contains(k))
            })
            .filter(|p| query.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| query.max_price.map_or(true, |max| p.price <= max))
            .cloned()
            .collect();

        match query.sort {
            ProductSort::Rating => hits.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            ProductSort::PriceAsc => hits.sort_by_key(|p| p.price),
            ProductSort::PriceDesc => hits.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSort::Newest => hits.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::BestSelling => hits.sort_by(|a, b| b.sold.cmp(&a.sold)),
        }

        let total = hits.len() as i64;
        let content = hits
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();
        Ok(Page::new(content, page, total))
    }

    async fn find_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Product>, DomainError> {
        let mut list: Vec<Product> = self
            .lock()
            .products
            .iter()
            .filter(|p| p.farmer_id == farmer_id && !p.is_deleted())
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn find_all(&self) -> Result<Vec<Product>, DomainError> {
        let mut list = self.lock().products.clone();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn find_names(&self) -> Result<Vec<ProductName>, DomainError> {
        let mut names: Vec<ProductName> = self
            .lock()
            .products
            .iter()
            .filter(|p| p.status == ProductStatus::Active)
            .map(|p| ProductName {
                id: p.id,
                name: p.name.clone(),
            })
            .collect();
        names.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(names)
    }

    async fn exists_in_categories(&self, category_ids: &[Uuid]) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .products
            .iter()
            .any(|p| category_ids.contains(&p.category_id)))
    }

    async fn count_by_status(&self) -> Result<Vec<(ProductStatus, i64)>, DomainError> {
        let mut counts: HashMap<ProductStatus, i64> = HashMap::new();
        for p in &self.lock().products {
            *counts.entry(p.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
