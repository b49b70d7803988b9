//! FarmLink API Client
//!
//! Holds the session tokens; a request rejected with 401 is retried once
//! after rotating the refresh token.

use anyhow::{bail, Context, Result};
use farmlink::{OrderStatus, PaymentMethod, PaymentStatus, ProductSort, Role};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Access and refresh token of the signed-in user
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// API Client for FarmLink
pub struct FarmLinkClient {
    client: Client,
    base_url: String,
    session: Option<Session>,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub inventory: i32,
    pub sold: i32,
    pub rating: f64,
    pub unit_price: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductPage {
    pub content: Vec<ProductResponse>,
    pub page: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub price: i64,
    pub unit_price: String,
}

#[derive(Debug, Deserialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItemResponse,
    pub product: ProductSummary,
}

#[derive(Debug, Deserialize)]
pub struct ClearCartResponse {
    pub removed: u64,
}

#[derive(Debug, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub actor_role: Role,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: i64,
    pub total_quantity: i32,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub history: Vec<StatusChange>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostalAddress {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub detail: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub postal: PostalAddress,
    pub is_default: bool,
}

/// Catalogue filters; unset fields use the server defaults
#[derive(Debug, Default)]
pub struct ProductFilter {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub category_id: Option<Uuid>,
    pub keyword: Option<String>,
    pub sort: Option<ProductSort>,
}

impl ProductFilter {
    fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(format!("page={}", page));
        }
        if let Some(size) = self.size {
            pairs.push(format!("size={}", size));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(format!("category_id={}", category_id));
        }
        if let Some(keyword) = &self.keyword {
            pairs.push(format!("keyword={}", urlencoding::encode(keyword)));
        }
        if let Some(sort) = self.sort {
            pairs.push(format!("sort={}", sort));
        }

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

impl FarmLinkClient {
    /// Create a new API client
    pub fn new(base_url: &str, session: Option<Session>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Tokens currently held, rotated ones included
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    // ---------- auth ----------

    pub async fn login(&mut self, email: &str, password: &str, role: Role) -> Result<TokenResponse> {
        self.session = None;
        let body = json!({ "email": email, "password": password, "role": role });
        let tokens: TokenResponse = self.call(Method::POST, "/api/auth/login", Some(&body)).await?;
        self.session = Some(Session {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
        });
        Ok(tokens)
    }

    pub async fn logout(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let body = json!({ "refresh_token": session.refresh_token });
        let _: MessageResponse = self.call(Method::POST, "/api/auth/logout", Some(&body)).await?;
        Ok(())
    }

    // ---------- catalogue ----------

    pub async fn list_products(&mut self, filter: &ProductFilter) -> Result<ProductPage> {
        let path = format!("/api/products{}", filter.query_string());
        self.call(Method::GET, &path, None::<&()>).await
    }

    pub async fn get_product(&mut self, id: Uuid) -> Result<ProductResponse> {
        self.call(Method::GET, &format!("/api/products/{}", id), None::<&()>)
            .await
    }

    // ---------- cart ----------

    pub async fn cart(&mut self) -> Result<Vec<CartLine>> {
        self.call(Method::GET, "/api/cart", None::<&()>).await
    }

    pub async fn add_to_cart(&mut self, product_id: Uuid, quantity: i32) -> Result<CartItemResponse> {
        let body = json!({ "product_id": product_id, "quantity": quantity });
        self.call(Method::POST, "/api/cart", Some(&body)).await
    }

    pub async fn remove_from_cart(&mut self, item_id: Uuid) -> Result<MessageResponse> {
        self.call(Method::DELETE, &format!("/api/cart/{}", item_id), None::<&()>)
            .await
    }

    pub async fn clear_cart(&mut self) -> Result<ClearCartResponse> {
        self.call(Method::DELETE, "/api/cart", None::<&()>).await
    }

    // ---------- orders ----------

    pub async fn create_order(
        &mut self,
        address_id: Uuid,
        farmer_id: Uuid,
        items: &[Uuid],
        payment_method: PaymentMethod,
        note: Option<&str>,
    ) -> Result<OrderResponse> {
        let body = json!({
            "address_id": address_id,
            "farmer_id": farmer_id,
            "items": items,
            "payment_method": payment_method,
            "note": note,
        });
        self.call(Method::POST, "/api/orders", Some(&body)).await
    }

    pub async fn my_orders(&mut self) -> Result<Vec<OrderResponse>> {
        self.call(Method::GET, "/api/orders", None::<&()>).await
    }

    pub async fn get_order(&mut self, id: Uuid) -> Result<OrderResponse> {
        self.call(Method::GET, &format!("/api/orders/{}", id), None::<&()>)
            .await
    }

    /// Change status acting as `role` (CONSUMER or FARMER)
    pub async fn change_order_status(
        &mut self,
        role: Role,
        order_id: Uuid,
        status: OrderStatus,
        reason: Option<&str>,
    ) -> Result<OrderResponse> {
        let path = format!(
            "/api/orders/{}/change-status",
            role.to_string().to_lowercase()
        );
        let body = json!({ "order_id": order_id, "status": status, "reason": reason });
        self.call(Method::POST, &path, Some(&body)).await
    }

    // ---------- addresses ----------

    pub async fn addresses(&mut self) -> Result<Vec<AddressResponse>> {
        self.call(Method::GET, "/api/addresses", None::<&()>).await
    }

    pub async fn add_address(
        &mut self,
        postal: &PostalAddress,
        is_default: bool,
    ) -> Result<AddressResponse> {
        let mut body = serde_json::to_value(postal).context("Failed to encode address")?;
        body["is_default"] = json!(is_default);
        self.call(Method::POST, "/api/addresses", Some(&body)).await
    }

    pub async fn set_default_address(&mut self, id: Uuid) -> Result<AddressResponse> {
        let path = format!("/api/addresses/{}/default", id);
        self.call(Method::POST, &path, None::<&()>).await
    }

    pub async fn delete_address(&mut self, id: Uuid) -> Result<MessageResponse> {
        self.call(Method::DELETE, &format!("/api/addresses/{}", id), None::<&()>)
            .await
    }

    // ---------- plumbing ----------

    async fn call<T, B>(&mut self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut resp = self.send(method.clone(), path, body).await?;
        if resp.status() == StatusCode::UNAUTHORIZED && self.refresh().await? {
            resp = self.send(method, path, body).await?;
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        resp.json().await.context("Failed to parse response")
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(session) = &self.session {
            request = request.bearer_auth(&session.access_token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .context("Failed to connect to FarmLink API")
    }

    /// Rotate tokens; false when there is nothing to refresh with
    async fn refresh(&mut self) -> Result<bool> {
        let Some(session) = &self.session else {
            return Ok(false);
        };

        let url = format!("{}/api/auth/refresh", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "refresh_token": session.refresh_token }))
            .send()
            .await
            .context("Failed to connect to FarmLink API")?;

        if !resp.status().is_success() {
            self.session = None;
            bail!("Session expired. Run 'farmlink login' again.");
        }

        let tokens: TokenResponse = resp.json().await.context("Failed to parse response")?;
        self.session = Some(Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_query() {
        assert_eq!(ProductFilter::default().query_string(), "");
    }

    #[test]
    fn test_filter_encodes_keyword_and_sort() {
        let filter = ProductFilter {
            page: Some(2),
            keyword: Some("rau muống".into()),
            sort: Some(ProductSort::PriceAsc),
            ..Default::default()
        };
        assert_eq!(
            filter.query_string(),
            "?page=2&keyword=rau%20mu%E1%BB%91ng&sort=price_asc"
        );
    }

    #[test]
    fn test_cart_line_reads_flattened_item() {
        let raw = json!({
            "id": Uuid::nil(),
            "product_id": Uuid::nil(),
            "quantity": 3,
            "created_at": "2024-05-01T00:00:00Z",
            "updated_at": "2024-05-01T00:00:00Z",
            "product": {
                "id": Uuid::nil(),
                "farmer_id": Uuid::nil(),
                "name": "Cải bó xôi",
                "price": 25000,
                "thumbnail": null,
                "unit_price": "kg",
                "inventory": 10,
                "status": "ACTIVE"
            }
        });
        let line: CartLine = serde_json::from_value(raw).unwrap();
        assert_eq!(line.item.quantity, 3);
        assert_eq!(line.product.unit_price, "kg");
    }
}
