//! Checkout - Turning cart lines into order items

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::entities::{CartItem, OrderItem, Product};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::ProductStatus;

/// Largest order total accepted at checkout, in VND
pub const MAX_ORDER_TOTAL: i64 = 100_000_000_000_000;

/// Cart item selected for checkout, with its current product
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub cart_item: CartItem,
    pub product: Product,
}

/// Reject an empty selection or one naming the same cart item twice
pub fn ensure_selection(cart_item_ids: &[Uuid]) -> Result<(), DomainError> {
    if cart_item_ids.is_empty() {
        return Err(DomainError::validation("order must contain at least one item"));
    }
    let mut seen = HashSet::new();
    for id in cart_item_ids {
        if !seen.insert(id) {
            return Err(DomainError::validation(format!(
                "cart item {} is listed twice",
                id
            )));
        }
    }
    Ok(())
}

/// Build order items for `account_id` buying from `farmer_id`.
///
/// Quantities are clamped to the current inventory; a line that ends up
/// empty fails the whole checkout, and so does a total above
/// [`MAX_ORDER_TOTAL`].
pub fn build_order_items(
    account_id: Uuid,
    farmer_id: Uuid,
    lines: &[CheckoutLine],
) -> Result<Vec<OrderItem>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::validation("order must contain at least one item"));
    }

    let items = lines
        .iter()
        .map(|line| {
            let CheckoutLine { cart_item, product } = line;
            if cart_item.account_id != account_id {
                return Err(DomainError::validation(format!(
                    "cart item {} does not belong to this account",
                    cart_item.id
                )));
            }
            if product.status != ProductStatus::Active {
                return Err(DomainError::validation(format!(
                    "product {} is not available",
                    product.name
                )));
            }
            if product.farmer_id != farmer_id {
                return Err(DomainError::validation(format!(
                    "product {} is sold by another farmer",
                    product.name
                )));
            }

            let quantity = cart_item.quantity.min(product.inventory);
            if quantity <= 0 {
                return Err(DomainError::conflict(format!(
                    "product {} is out of stock",
                    product.name
                )));
            }

            Ok(OrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                thumbnail: product.thumbnail.clone(),
                unit_price: product.price,
                quantity,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    ensure_total_within_limit(&items)?;
    Ok(items)
}

fn ensure_total_within_limit(items: &[OrderItem]) -> Result<(), DomainError> {
    let too_large = || {
        DomainError::validation(format!("order total cannot exceed {}", MAX_ORDER_TOTAL))
    };
    let mut total: i64 = 0;
    let mut quantity: i32 = 0;
    for item in items {
        let subtotal = item
            .unit_price
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(too_large)?;
        total = total.checked_add(subtotal).ok_or_else(too_large)?;
        quantity = quantity.checked_add(item.quantity).ok_or_else(too_large)?;
    }
    if total > MAX_ORDER_TOTAL {
        return Err(too_large());
    }
    Ok(())
}
