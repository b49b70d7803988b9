//! Category, product and market price DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use farmlink::{
    Category, CategoryTreeNode, Page, Product, ProductDraft, ProductName, ProductSort,
    ProductStatus, ProductSummary,
};

use crate::application::MarketPriceView;

// ============================================
// Categories
// ============================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            parent_id: c.parent_id,
            level: c.level,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryNodeResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub children: Vec<CategoryNodeResponse>,
}

impl From<CategoryTreeNode> for CategoryNodeResponse {
    fn from(n: CategoryTreeNode) -> Self {
        Self {
            id: n.id,
            name: n.name,
            parent_id: n.parent_id,
            level: n.level,
            children: n.children.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================
// Products
// ============================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// VND, integer greater than zero
    pub price: i64,
    pub inventory: i32,
    pub thumbnail: Option<String>,
    /// Sale unit label, e.g. `kg`
    pub unit_price: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<ProductRequest> for ProductDraft {
    fn from(r: ProductRequest) -> Self {
        Self {
            category_id: r.category_id,
            name: r.name,
            description: r.description,
            price: r.price,
            inventory: r.inventory,
            thumbnail: r.thumbnail,
            unit_price: r.unit_price,
            images: r.images,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub inventory: i32,
    pub sold: i32,
    pub rating: f64,
    pub thumbnail: Option<String>,
    pub unit_price: String,
    pub images: Vec<String>,
    #[schema(value_type = String, example = "ACTIVE")]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            farmer_id: p.farmer_id,
            category_id: p.category_id,
            name: p.name,
            description: p.description,
            price: p.price,
            inventory: p.inventory,
            sold: p.sold,
            rating: p.rating,
            thumbnail: p.thumbnail,
            unit_price: p.unit_price,
            images: p.images,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
            deleted_at: p.deleted_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummaryResponse {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub price: i64,
    pub thumbnail: Option<String>,
    pub unit_price: String,
    pub inventory: i32,
    #[schema(value_type = String)]
    pub status: ProductStatus,
}

impl From<ProductSummary> for ProductSummaryResponse {
    fn from(p: ProductSummary) -> Self {
        Self {
            id: p.id,
            farmer_id: p.farmer_id,
            name: p.name,
            price: p.price,
            thumbnail: p.thumbnail,
            unit_price: p.unit_price,
            inventory: p.inventory,
            status: p.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductNameResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<ProductName> for ProductNameResponse {
    fn from(p: ProductName) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

/// Catalogue query; only ACTIVE products of ACTIVE farmers are listed
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// 0-based page index (default 0)
    pub page: Option<i64>,
    /// Page size, 1..=100 (default 10)
    pub size: Option<i64>,
    /// Matches the category and all its descendants
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the name
    pub keyword: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// rating | price_asc | price_desc | newest | best_selling
    #[param(value_type = Option<String>)]
    pub sort: Option<ProductSort>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductPageResponse {
    pub content: Vec<ProductResponse>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl From<Page<Product>> for ProductPageResponse {
    fn from(page: Page<Product>) -> Self {
        let page = page.map(ProductResponse::from);
        Self {
            content: page.content,
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductStatusRequest {
    /// ACTIVE, BLOCKED or REJECTED
    #[schema(value_type = String, example = "BLOCKED")]
    pub status: ProductStatus,
}

// ============================================
// Market prices
// ============================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMarketPriceRequest {
    pub product_id: Uuid,
    pub price: i64,
    pub region: String,
    pub date_recorded: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMarketPriceRequest {
    pub product_id: Option<Uuid>,
    pub price: Option<i64>,
    pub region: Option<String>,
    pub date_recorded: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MarketPriceParams {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarketPriceResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub region: String,
    pub date_recorded: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub product: Option<ProductSummaryResponse>,
}

impl From<MarketPriceView> for MarketPriceResponse {
    fn from(view: MarketPriceView) -> Self {
        let p = view.price;
        Self {
            id: p.id,
            product_id: p.product_id,
            price: p.price,
            region: p.region,
            date_recorded: p.date_recorded,
            created_at: p.created_at,
            product: view.product.map(Into::into),
        }
    }
}
