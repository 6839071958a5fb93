//! Order lifecycle
//!
//! The only place that decides whether an order may change status, payment
//! status or payment method. [`apply`] is pure: it inspects the current row
//! and returns the complete set of field values to write, which the service
//! persists with a compare-and-set on `(status, payment_status)`.
//!
//! ```text
//! status:   pending → confirmed → preparing → ready → served → completed
//!              └──────────┴──→ cancelled
//! payment:  unpaid → awaiting_verification → paid
//!              ↑            │ (rejected)
//!              └────────────┘
//! ```

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderStatus, PaymentMethod, PaymentStatus};
use thiserror::Error;

use crate::pricing::money::{to_decimal, to_f64};

/// A request to change an order
#[derive(Debug, Clone, PartialEq)]
pub enum OrderCommand {
    /// Customer picks (or switches) how they will pay
    SelectPaymentMethod(PaymentMethod),
    /// Customer uploaded a QRIS / transfer receipt
    SubmitProof,
    /// Cashier confirms the money arrived
    VerifyPayment {
        method: PaymentMethod,
        /// Cash handed over; `None` means exact amount
        amount_received: Option<f64>,
    },
    /// Cashier rejects an uploaded proof
    RejectPayment { reason: Option<String> },
    /// Kitchen flow, one step at a time
    Advance(OrderStatus),
    Cancel { reason: Option<String> },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectPaymentMethod(_) => "select_payment_method",
            Self::SubmitProof => "submit_proof",
            Self::VerifyPayment { .. } => "verify_payment",
            Self::RejectPayment { .. } => "reject_payment",
            Self::Advance(_) => "advance",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// What happens to the order's table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEffect {
    None,
    Occupy,
    /// Free the table unless another active order still uses it
    Release,
}

/// New values for the mutable order fields
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub confirmed_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub cancel_reason: Option<String>,
    pub table_effect: TableEffect,
    /// Cash verification only
    pub amount_received: Option<f64>,
    /// Cash verification only
    pub change_due: Option<f64>,
}

impl Transition {
    fn unchanged(order: &Order) -> Self {
        Self {
            status: order.status,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            confirmed_at: order.confirmed_at,
            paid_at: order.paid_at,
            completed_at: order.completed_at,
            cancelled_at: order.cancelled_at,
            cancel_reason: order.cancel_reason.clone(),
            table_effect: TableEffect::None,
            amount_received: None,
            change_due: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Order is cancelled")]
    Cancelled,

    #[error("Order is already completed")]
    Completed,

    #[error("Order is already paid")]
    AlreadyPaid,

    #[error("Payment method can no longer be changed (payment is {0})")]
    MethodLocked(PaymentStatus),

    #[error("No payment method selected")]
    MethodRequired,

    #[error("Order is set to pay by {selected}, not {requested}")]
    MethodMismatch {
        selected: PaymentMethod,
        requested: PaymentMethod,
    },

    #[error("Payment proof is not accepted for {0} payments")]
    ProofNotAccepted(PaymentMethod),

    #[error("Payment proof has not been uploaded")]
    ProofRequired,

    #[error("Payment is not awaiting verification")]
    NotAwaitingVerification,

    #[error("Amount received {received} is less than total {total}")]
    InsufficientAmount { total: f64, received: f64 },

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order must be paid before it moves to {0}")]
    NotPaid(OrderStatus),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err {
            LifecycleError::Cancelled => AppError::with_message(ErrorCode::OrderCancelled, message),
            LifecycleError::Completed => {
                AppError::with_message(ErrorCode::OrderAlreadyCompleted, message)
            }
            LifecycleError::AlreadyPaid => {
                AppError::with_message(ErrorCode::OrderAlreadyPaid, message)
            }
            LifecycleError::MethodLocked(status) => {
                AppError::with_message(ErrorCode::PaymentMethodLocked, message)
                    .with_detail("payment_status", status.as_str())
            }
            LifecycleError::MethodRequired => {
                AppError::with_message(ErrorCode::PaymentMethodRequired, message)
            }
            LifecycleError::MethodMismatch {
                selected,
                requested,
            } => AppError::with_message(ErrorCode::PaymentMethodMismatch, message)
                .with_detail("selected", selected.as_str())
                .with_detail("requested", requested.as_str()),
            LifecycleError::ProofNotAccepted(method) => {
                AppError::with_message(ErrorCode::PaymentInvalidMethod, message)
                    .with_detail("method", method.as_str())
            }
            LifecycleError::ProofRequired => {
                AppError::with_message(ErrorCode::PaymentProofRequired, message)
            }
            LifecycleError::NotAwaitingVerification => {
                AppError::with_message(ErrorCode::PaymentNotAwaitingVerification, message)
            }
            LifecycleError::InsufficientAmount { total, received } => {
                AppError::with_message(ErrorCode::PaymentInsufficientAmount, message)
                    .with_detail("total", total)
                    .with_detail("amount_received", received)
            }
            LifecycleError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            LifecycleError::NotPaid(_) => AppError::with_message(ErrorCode::OrderNotPaid, message),
        }
    }
}

fn ensure_open(order: &Order) -> Result<(), LifecycleError> {
    match order.status {
        OrderStatus::Cancelled => Err(LifecycleError::Cancelled),
        OrderStatus::Completed => Err(LifecycleError::Completed),
        _ => Ok(()),
    }
}

/// Decide the outcome of `command` on `order` at time `now` (Unix millis)
pub fn apply(order: &Order, command: &OrderCommand, now: i64) -> Result<Transition, LifecycleError> {
    ensure_open(order)?;
    let mut next = Transition::unchanged(order);

    match command {
        OrderCommand::SelectPaymentMethod(method) => {
            match order.payment_status {
                PaymentStatus::Unpaid => {}
                PaymentStatus::Paid => return Err(LifecycleError::AlreadyPaid),
                status => return Err(LifecycleError::MethodLocked(status)),
            }
            next.payment_method = Some(*method);
        }

        OrderCommand::SubmitProof => {
            let method = order.payment_method.ok_or(LifecycleError::MethodRequired)?;
            if !method.requires_proof() {
                return Err(LifecycleError::ProofNotAccepted(method));
            }
            // A second upload while waiting replaces the first one
            if order.payment_status == PaymentStatus::Paid {
                return Err(LifecycleError::AlreadyPaid);
            }
            next.payment_status = PaymentStatus::AwaitingVerification;
        }

        OrderCommand::VerifyPayment {
            method,
            amount_received,
        } => {
            if order.payment_status == PaymentStatus::Paid {
                return Err(LifecycleError::AlreadyPaid);
            }
            let selected = order.payment_method.ok_or(LifecycleError::MethodRequired)?;
            if selected != *method {
                return Err(LifecycleError::MethodMismatch {
                    selected,
                    requested: *method,
                });
            }

            if method.requires_proof() {
                if order.payment_status != PaymentStatus::AwaitingVerification {
                    return Err(LifecycleError::ProofRequired);
                }
            } else {
                let total = to_decimal(order.total);
                let received = amount_received.map(to_decimal).unwrap_or(total);
                if received < total {
                    return Err(LifecycleError::InsufficientAmount {
                        total: order.total,
                        received: to_f64(received),
                    });
                }
                next.amount_received = Some(to_f64(received));
                next.change_due = Some(to_f64((received - total).max(Decimal::ZERO)));
            }

            next.payment_status = PaymentStatus::Paid;
            next.paid_at = Some(now);
            if order.status == OrderStatus::Pending {
                next.status = OrderStatus::Confirmed;
                next.confirmed_at = Some(now);
            }
        }

        OrderCommand::RejectPayment { .. } => match order.payment_status {
            PaymentStatus::AwaitingVerification => {
                next.payment_status = PaymentStatus::Unpaid;
            }
            PaymentStatus::Paid => return Err(LifecycleError::AlreadyPaid),
            PaymentStatus::Unpaid => return Err(LifecycleError::NotAwaitingVerification),
        },

        OrderCommand::Advance(OrderStatus::Cancelled) => {
            return apply(order, &OrderCommand::Cancel { reason: None }, now);
        }

        OrderCommand::Advance(target) => {
            if order.status.next() != Some(*target) {
                return Err(LifecycleError::InvalidTransition {
                    from: order.status,
                    to: *target,
                });
            }
            if *target != OrderStatus::Confirmed && order.payment_status != PaymentStatus::Paid {
                return Err(LifecycleError::NotPaid(*target));
            }
            next.status = *target;
            match target {
                OrderStatus::Confirmed => next.confirmed_at = Some(now),
                OrderStatus::Completed => {
                    next.completed_at = Some(now);
                    next.table_effect = TableEffect::Release;
                }
                _ => {}
            }
        }

        OrderCommand::Cancel { reason } => {
            if !matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed) {
                return Err(LifecycleError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Cancelled,
                });
            }
            // Refunds are handled at the counter, not here
            if order.payment_status == PaymentStatus::Paid {
                return Err(LifecycleError::AlreadyPaid);
            }
            next.status = OrderStatus::Cancelled;
            next.cancelled_at = Some(now);
            next.cancel_reason = reason.clone();
            next.table_effect = TableEffect::Release;
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_714_500_000_000;

    fn order(status: OrderStatus, payment_status: PaymentStatus) -> Order {
        Order {
            id: 1,
            order_number: "ORD-20240501-0001".into(),
            table_id: 10,
            customer_name: "Rina".into(),
            notes: None,
            status,
            payment_method: None,
            payment_status,
            subtotal: 50_000.0,
            discount: 0.0,
            tax: 5_000.0,
            service_charge: 0.0,
            total: 55_000.0,
            promo_id: None,
            promo_code: None,
            created_at: NOW - 60_000,
            confirmed_at: None,
            paid_at: None,
            completed_at: None,
            cancelled_at: None,
            cancel_reason: None,
            updated_at: NOW - 60_000,
        }
    }

    fn with_method(mut o: Order, method: PaymentMethod) -> Order {
        o.payment_method = Some(method);
        o
    }

    #[test]
    fn test_select_method_while_unpaid() {
        let o = order(OrderStatus::Pending, PaymentStatus::Unpaid);
        let t = apply(&o, &OrderCommand::SelectPaymentMethod(PaymentMethod::Qris), NOW).unwrap();
        assert_eq!(t.payment_method, Some(PaymentMethod::Qris));
        assert_eq!(t.status, OrderStatus::Pending);
        assert_eq!(t.table_effect, TableEffect::None);
    }

    #[test]
    fn test_method_locked_after_proof() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::AwaitingVerification),
            PaymentMethod::Qris,
        );
        let err = apply(&o, &OrderCommand::SelectPaymentMethod(PaymentMethod::Cash), NOW)
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::MethodLocked(PaymentStatus::AwaitingVerification)
        );
        assert_eq!(AppError::from(err).code, ErrorCode::PaymentMethodLocked);
    }

    #[test]
    fn test_cash_verification_confirms_and_computes_change() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::Unpaid),
            PaymentMethod::Cash,
        );
        let t = apply(
            &o,
            &OrderCommand::VerifyPayment {
                method: PaymentMethod::Cash,
                amount_received: Some(60_000.0),
            },
            NOW,
        )
        .unwrap();

        assert_eq!(t.payment_status, PaymentStatus::Paid);
        assert_eq!(t.paid_at, Some(NOW));
        assert_eq!(t.status, OrderStatus::Confirmed);
        assert_eq!(t.confirmed_at, Some(NOW));
        assert_eq!(t.amount_received, Some(60_000.0));
        assert_eq!(t.change_due, Some(5_000.0));
    }

    #[test]
    fn test_cash_without_amount_means_exact() {
        let o = with_method(
            order(OrderStatus::Confirmed, PaymentStatus::Unpaid),
            PaymentMethod::Cash,
        );
        let t = apply(
            &o,
            &OrderCommand::VerifyPayment {
                method: PaymentMethod::Cash,
                amount_received: None,
            },
            NOW,
        )
        .unwrap();
        assert_eq!(t.change_due, Some(0.0));
        // already confirmed: confirmed_at is left alone
        assert_eq!(t.confirmed_at, None);
        assert_eq!(t.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_insufficient_cash() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::Unpaid),
            PaymentMethod::Cash,
        );
        let err = apply(
            &o,
            &OrderCommand::VerifyPayment {
                method: PaymentMethod::Cash,
                amount_received: Some(54_999.0),
            },
            NOW,
        )
        .unwrap_err();
        assert!(matches!(err, LifecycleError::InsufficientAmount { .. }));
        assert_eq!(
            AppError::from(err).http_status(),
            http::StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn test_qris_requires_proof_first() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::Unpaid),
            PaymentMethod::Qris,
        );
        let verify = OrderCommand::VerifyPayment {
            method: PaymentMethod::Qris,
            amount_received: None,
        };
        assert_eq!(apply(&o, &verify, NOW), Err(LifecycleError::ProofRequired));

        let t = apply(&o, &OrderCommand::SubmitProof, NOW).unwrap();
        assert_eq!(t.payment_status, PaymentStatus::AwaitingVerification);

        let mut awaiting = o.clone();
        awaiting.payment_status = t.payment_status;
        let t = apply(&awaiting, &verify, NOW).unwrap();
        assert_eq!(t.payment_status, PaymentStatus::Paid);
        assert_eq!(t.change_due, None);
    }

    #[test]
    fn test_method_mismatch() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::AwaitingVerification),
            PaymentMethod::Transfer,
        );
        let err = apply(
            &o,
            &OrderCommand::VerifyPayment {
                method: PaymentMethod::Qris,
                amount_received: None,
            },
            NOW,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::MethodMismatch {
                selected: PaymentMethod::Transfer,
                requested: PaymentMethod::Qris
            }
        );
        assert_eq!(
            AppError::from(err).http_status(),
            http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_verify_without_method() {
        let o = order(OrderStatus::Pending, PaymentStatus::Unpaid);
        let err = apply(
            &o,
            &OrderCommand::VerifyPayment {
                method: PaymentMethod::Cash,
                amount_received: None,
            },
            NOW,
        )
        .unwrap_err();
        assert_eq!(err, LifecycleError::MethodRequired);
    }

    #[test]
    fn test_double_approval_rejected() {
        let o = with_method(
            order(OrderStatus::Confirmed, PaymentStatus::Paid),
            PaymentMethod::Cash,
        );
        let err = apply(
            &o,
            &OrderCommand::VerifyPayment {
                method: PaymentMethod::Cash,
                amount_received: None,
            },
            NOW,
        )
        .unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyPaid);
        assert_eq!(
            AppError::from(err).http_status(),
            http::StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_reject_returns_to_unpaid() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::AwaitingVerification),
            PaymentMethod::Transfer,
        );
        let t = apply(&o, &OrderCommand::RejectPayment { reason: None }, NOW).unwrap();
        assert_eq!(t.payment_status, PaymentStatus::Unpaid);

        let unpaid = order(OrderStatus::Pending, PaymentStatus::Unpaid);
        assert_eq!(
            apply(&unpaid, &OrderCommand::RejectPayment { reason: None }, NOW),
            Err(LifecycleError::NotAwaitingVerification)
        );
    }

    #[test]
    fn test_cash_order_cannot_take_proof() {
        let o = with_method(
            order(OrderStatus::Pending, PaymentStatus::Unpaid),
            PaymentMethod::Cash,
        );
        assert_eq!(
            apply(&o, &OrderCommand::SubmitProof, NOW),
            Err(LifecycleError::ProofNotAccepted(PaymentMethod::Cash))
        );
    }

    #[test]
    fn test_kitchen_flow_requires_payment() {
        let o = order(OrderStatus::Confirmed, PaymentStatus::Unpaid);
        assert_eq!(
            apply(&o, &OrderCommand::Advance(OrderStatus::Preparing), NOW),
            Err(LifecycleError::NotPaid(OrderStatus::Preparing))
        );

        let paid = order(OrderStatus::Confirmed, PaymentStatus::Paid);
        let t = apply(&paid, &OrderCommand::Advance(OrderStatus::Preparing), NOW).unwrap();
        assert_eq!(t.status, OrderStatus::Preparing);
    }

    #[test]
    fn test_pending_can_be_confirmed_unpaid() {
        let o = order(OrderStatus::Pending, PaymentStatus::Unpaid);
        let t = apply(&o, &OrderCommand::Advance(OrderStatus::Confirmed), NOW).unwrap();
        assert_eq!(t.status, OrderStatus::Confirmed);
        assert_eq!(t.confirmed_at, Some(NOW));
    }

    #[test]
    fn test_no_skipping_steps() {
        let o = order(OrderStatus::Confirmed, PaymentStatus::Paid);
        let err = apply(&o, &OrderCommand::Advance(OrderStatus::Served), NOW).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Served
            }
        );
        let err = apply(&o, &OrderCommand::Advance(OrderStatus::Pending), NOW).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn test_completion_releases_table() {
        let o = order(OrderStatus::Served, PaymentStatus::Paid);
        let t = apply(&o, &OrderCommand::Advance(OrderStatus::Completed), NOW).unwrap();
        assert_eq!(t.status, OrderStatus::Completed);
        assert_eq!(t.completed_at, Some(NOW));
        assert_eq!(t.table_effect, TableEffect::Release);
    }

    #[test]
    fn test_cancel_rules() {
        let o = order(OrderStatus::Pending, PaymentStatus::Unpaid);
        let t = apply(
            &o,
            &OrderCommand::Cancel {
                reason: Some("customer left".into()),
            },
            NOW,
        )
        .unwrap();
        assert_eq!(t.status, OrderStatus::Cancelled);
        assert_eq!(t.cancelled_at, Some(NOW));
        assert_eq!(t.cancel_reason.as_deref(), Some("customer left"));
        assert_eq!(t.table_effect, TableEffect::Release);

        let preparing = order(OrderStatus::Preparing, PaymentStatus::Paid);
        assert!(matches!(
            apply(&preparing, &OrderCommand::Cancel { reason: None }, NOW),
            Err(LifecycleError::InvalidTransition { .. })
        ));

        let paid = order(OrderStatus::Confirmed, PaymentStatus::Paid);
        assert_eq!(
            apply(&paid, &OrderCommand::Cancel { reason: None }, NOW),
            Err(LifecycleError::AlreadyPaid)
        );

        // "advance to cancelled" goes through the same rules
        let t = apply(&o, &OrderCommand::Advance(OrderStatus::Cancelled), NOW).unwrap();
        assert_eq!(t.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_terminal_orders_are_frozen() {
        let cancelled = order(OrderStatus::Cancelled, PaymentStatus::Unpaid);
        assert_eq!(
            apply(
                &cancelled,
                &OrderCommand::SelectPaymentMethod(PaymentMethod::Cash),
                NOW
            ),
            Err(LifecycleError::Cancelled)
        );
        let completed = order(OrderStatus::Completed, PaymentStatus::Paid);
        assert_eq!(
            apply(&completed, &OrderCommand::Cancel { reason: None }, NOW),
            Err(LifecycleError::Completed)
        );
    }
}
