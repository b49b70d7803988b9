//! Order Workflow - The single order status state machine
//!
//! Every status change, whoever asks for it, is decided here.

use chrono::Utc;

use crate::domain::entities::{Order, StatusChange};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{
    Actor, OrderStatus, PaymentMethod, PaymentStatus, Role,
};

use OrderStatus::*;

/// Allowed edges and the roles that may take them
const TRANSITIONS: &[(OrderStatus, OrderStatus, &[Role])] = &[
    (Pending, Confirmed, &[Role::Farmer, Role::Admin]),
    (Pending, Canceled, &[Role::Consumer, Role::Farmer, Role::Admin]),
    (Confirmed, Delivering, &[Role::Farmer, Role::Admin]),
    (Confirmed, Canceled, &[Role::Consumer, Role::Farmer, Role::Admin]),
    (Delivering, Delivered, &[Role::Farmer, Role::Admin]),
    (Delivering, Canceled, &[Role::Admin]),
    (Delivered, Received, &[Role::Consumer]),
];

/// Roles allowed to move an order from `from` to `to`, if the edge exists
pub fn allowed_roles(from: OrderStatus, to: OrderStatus) -> Option<&'static [Role]> {
    TRANSITIONS
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, roles)| *roles)
}

/// Statuses `role` may move an order to from `from`
pub fn next_statuses(from: OrderStatus, role: Role) -> Vec<OrderStatus> {
    TRANSITIONS
        .iter()
        .filter(|(f, _, roles)| *f == from && roles.contains(&role))
        .map(|(_, t, _)| *t)
        .collect()
}

/// Side effects a transition has outside the order row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionEffects {
    /// Put every item's quantity back into product inventory
    pub restore_inventory: bool,
    /// Add every item's quantity to the product's sold counter
    pub add_sold: bool,
}

/// A validated transition, ready to be applied and persisted
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub as_role: Role,
    /// Payment status the decision was made on
    pub from_payment: PaymentStatus,
    pub payment_status: PaymentStatus,
    pub effects: TransitionEffects,
}

/// Decide whether `actor`, acting as `as_role`, may move `order` to `to`.
pub fn plan_transition(
    order: &Order,
    actor: &Actor,
    as_role: Role,
    to: OrderStatus,
) -> Result<TransitionPlan, DomainError> {
    actor.require_role(as_role)?;

    let from = order.status;
    let roles = allowed_roles(from, to).ok_or_else(|| {
        DomainError::validation(format!("cannot change order status from {} to {}", from, to))
    })?;
    if !roles.contains(&as_role) {
        return Err(DomainError::forbidden(format!(
            "{} cannot change order status from {} to {}",
            as_role, from, to
        )));
    }

    match as_role {
        Role::Consumer if order.account_id != actor.account_id => {
            return Err(DomainError::forbidden("order belongs to another account"));
        }
        Role::Farmer if actor.farmer_id != Some(order.farmer_id) => {
            return Err(DomainError::forbidden("order belongs to another farmer"));
        }
        _ => {}
    }

    let (payment_status, effects) = match to {
        Canceled => {
            let payment = if order.payment_status == PaymentStatus::Paid {
                PaymentStatus::Refunded
            } else {
                PaymentStatus::Canceled
            };
            let effects = TransitionEffects {
                restore_inventory: true,
                ..Default::default()
            };
            (payment, effects)
        }
        Delivered if order.payment_method == PaymentMethod::Cod => {
            (PaymentStatus::Paid, TransitionEffects::default())
        }
        Received => (
            order.payment_status,
            TransitionEffects {
                add_sold: true,
                ..Default::default()
            },
        ),
        _ => (order.payment_status, TransitionEffects::default()),
    };

    Ok(TransitionPlan {
        from,
        to,
        as_role,
        from_payment: order.payment_status,
        payment_status,
        effects,
    })
}

/// Apply a plan to the in-memory order, appending to its history.
pub fn apply_transition(order: &mut Order, plan: &TransitionPlan, reason: Option<String>) {
    let now = Utc::now();
    let reason = reason.filter(|r| !r.trim().is_empty());
    order.status = plan.to;
    order.payment_status = plan.payment_status;
    if reason.is_some() {
        order.last_status_change_reason = reason.clone();
    }
    order.history.push(StatusChange {
        from: Some(plan.from),
        to: plan.to,
        actor_role: plan.as_role,
        reason,
        at: now,
    });
    order.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OrderItem;
    use crate::domain::value_objects::PostalAddress;
    use uuid::Uuid;

    fn postal() -> PostalAddress {
        PostalAddress {
            receiver_name: "Lan".into(),
            receiver_phone: "0912345678".into(),
            province: "Đà Lạt".into(),
            district: "P1".into(),
            ward: "W1".into(),
            detail: "1 Hoa Hồng".into(),
        }
    }

    fn order(method: PaymentMethod) -> (Order, Actor, Actor, Actor) {
        let consumer = Actor::new(Uuid::new_v4(), vec![Role::Consumer], None);
        let farmer_id = Uuid::new_v4();
        let farmer = Actor::new(
            Uuid::new_v4(),
            vec![Role::Consumer, Role::Farmer],
            Some(farmer_id),
        );
        let admin = Actor::new(Uuid::new_v4(), Role::ALL.to_vec(), None);
        let item = OrderItem {
            product_id: Uuid::new_v4(),
            product_name: "Dâu tây".into(),
            thumbnail: None,
            unit_price: 120_000,
            quantity: 2,
        };
        let order = Order::new(
            consumer.account_id,
            farmer_id,
            postal(),
            None,
            vec![item],
            method,
        );
        (order, consumer, farmer, admin)
    }

    #[test]
    fn test_farmer_happy_path_to_received() {
        let (mut order, consumer, farmer, _) = order(PaymentMethod::Cod);
        for to in [Confirmed, Delivering, Delivered] {
            let plan = plan_transition(&order, &farmer, Role::Farmer, to).unwrap();
            apply_transition(&mut order, &plan, None);
        }
        assert_eq!(order.payment_status, PaymentStatus::Paid);

        let plan = plan_transition(&order, &consumer, Role::Consumer, Received).unwrap();
        assert!(plan.effects.add_sold);
        apply_transition(&mut order, &plan, None);
        assert_eq!(order.status, Received);
        assert_eq!(order.history.len(), 5);
    }

    #[test]
    fn test_consumer_cannot_confirm() {
        let (order, consumer, _, _) = order(PaymentMethod::Cod);
        let err = plan_transition(&order, &consumer, Role::Consumer, Confirmed).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn test_unknown_edge_is_validation() {
        let (order, _, _, admin) = order(PaymentMethod::Cod);
        let err = plan_transition(&order, &admin, Role::Admin, Delivered).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_only_admin_cancels_while_delivering() {
        let (mut order, consumer, farmer, admin) = order(PaymentMethod::Vnpay);
        order.status = Delivering;
        order.payment_status = PaymentStatus::Paid;
        assert!(plan_transition(&order, &consumer, Role::Consumer, Canceled).is_err());
        assert!(plan_transition(&order, &farmer, Role::Farmer, Canceled).is_err());

        let plan = plan_transition(&order, &admin, Role::Admin, Canceled).unwrap();
        assert_eq!(plan.payment_status, PaymentStatus::Refunded);
        assert!(plan.effects.restore_inventory);
    }

    #[test]
    fn test_ownership_is_checked() {
        let (order, _, _, _) = order(PaymentMethod::Cod);
        let stranger = Actor::new(Uuid::new_v4(), vec![Role::Consumer], None);
        let err = plan_transition(&order, &stranger, Role::Consumer, Canceled).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let other_farm = Actor::new(Uuid::new_v4(), vec![Role::Farmer], Some(Uuid::new_v4()));
        assert!(plan_transition(&order, &other_farm, Role::Farmer, Confirmed).is_err());
    }

    #[test]
    fn test_unpaid_cancel_and_reason_recorded() {
        let (mut order, consumer, _, _) = order(PaymentMethod::Cod);
        let plan = plan_transition(&order, &consumer, Role::Consumer, Canceled).unwrap();
        apply_transition(&mut order, &plan, Some("đổi ý".into()));
        assert_eq!(order.payment_status, PaymentStatus::Canceled);
        assert_eq!(order.last_status_change_reason.as_deref(), Some("đổi ý"));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for role in Role::ALL {
            assert!(next_statuses(Received, role).is_empty());
            assert!(next_statuses(Canceled, role).is_empty());
        }
        assert_eq!(next_statuses(Delivered, Role::Consumer), vec![Received]);
    }
}
