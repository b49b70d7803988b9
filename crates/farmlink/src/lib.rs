//! FarmLink Domain Library
//!
//! Core domain types and interfaces for the FarmLink agricultural marketplace.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Account, Address, Farmer, Product, Order, ...)
//!   - `value_objects/`: Immutable value types (Role, OrderStatus, PostalAddress, ...)
//!   - `services/`: Pure rules (order workflow, checkout, category tree, statistics, payments)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!   - `services/`: Credential and payment gateway interfaces
//!
//! # Usage
//!
//! ```rust,ignore
//! use farmlink::domain::{Order, OrderStatus};
//! use farmlink::ports::{OrderRepository, TokenIssuer};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Account, Actor, Address, CartItem, CartLine, Category, CategoryTreeNode, ChannelSettings,
    DomainError, Farmer, FarmerStatus, MarketPrice, NotificationSettings, Ocop, OcopDraft,
    OcopStatus, Order, OrderItem, OrderStatus, Page, PageRequest, Payment, PaymentMethod,
    PaymentStatus, PostalAddress, Product, ProductDraft, ProductName, ProductQuery, ProductSort,
    ProductStatus, ProductSummary, Role, StatusChange,
};
pub use ports::{
    // Repositories
    AccountRepository,
    AddressRepository,
    CartRepository,
    CategoryRepository,
    FarmerRepository,
    MarketPriceRepository,
    OcopRepository,
    OrderRepository,
    PaymentRepository,
    ProductRepository,
    // Services
    PasswordHasher,
    PaymentGateway,
    PaymentUrlRequest,
    TokenClaims,
    TokenIssuer,
    TokenKind,
};
