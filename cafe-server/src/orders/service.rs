//! Order service
//!
//! Runs checkout and lifecycle commands inside one SQLite transaction each.
//! The order row is written with a compare-and-set on the state the
//! lifecycle decision was based on, in the same transaction as the payment,
//! stock, promo and table writes that go with it. If any of them fails the
//! whole command rolls back.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{action, resource};
use shared::models::{
    CreateOrderRequest, DiningTable, DiscountType, Order, OrderDetail, OrderItem, OrderQuote, OrderStatus, PaymentMethod,
    PaymentStatus, Promo, QuoteRequest, TableStatus,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::checkout::{self, quantities_by_item};
use super::lifecycle::{self, OrderCommand, TableEffect, Transition};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::pricing::money::{to_decimal, to_f64};
use crate::pricing::promo_discount;
use crate::db::repository::{
    RepoError, begin_write, dining_table as table_repo, menu_item as menu_repo, order as order_repo,
    payment as payment_repo, promo as promo_repo, system_settings as settings_repo,
};
use crate::utils::time;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};

const PROOF_SUPERSEDED: &str = "Superseded by a newer upload";
const ORDER_CANCELLED: &str = "Order cancelled";
const PROOF_REJECTED: &str = "Payment proof rejected";

pub fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        .with_detail("order_id", id)
}

async fn resolve_promo(conn: &mut SqliteConnection, code: Option<&str>) -> AppResult<Option<Promo>> {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let promo = promo_repo::find_by_code(conn, code).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::PromoNotFound, format!("Promo code '{code}' not found"))
    })?;
    Ok(Some(promo))
}

/// Active table behind a QR token
pub async fn find_table(pool: &SqlitePool, qr_code: &str) -> AppResult<DiningTable> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    match table_repo::find_by_qr_code(&mut *conn, qr_code).await? {
        Some(table) if table.is_active => Ok(table),
        Some(table) => Err(AppError::new(ErrorCode::TableInactive).with_detail("table", table.number)),
        None => Err(AppError::new(ErrorCode::TableNotFound)),
    }
}

/// What a promo code would take off a given subtotal
#[derive(Debug, Clone, serde::Serialize)]
pub struct PromoPreview {
    pub code: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order: f64,
    pub max_discount: Option<f64>,
    pub subtotal: f64,
    pub discount: f64,
}

pub async fn preview_promo(pool: &SqlitePool, code: &str, subtotal: f64) -> AppResult<PromoPreview> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    let promo = resolve_promo(&mut *conn, Some(code))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PromoNotFound))?;
    let discount = promo_discount(&promo, to_decimal(subtotal.max(0.0)), now_millis())?;
    Ok(PromoPreview {
        code: promo.code,
        name: promo.name,
        discount_type: promo.discount_type,
        discount_value: promo.discount_value,
        min_order: promo.min_order,
        max_discount: promo.max_discount,
        subtotal,
        discount: to_f64(discount),
    })
}

/// Price a cart without persisting anything
pub async fn quote_cart(pool: &SqlitePool, req: &QuoteRequest) -> AppResult<OrderQuote> {
    // settings first: the test pool has a single connection
    let settings = settings_repo::get(pool).await?;
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;

    let ids: Vec<i64> = quantities_by_item(&req.items).into_keys().collect();
    let menu = menu_repo::find_by_ids(&mut *conn, &ids).await?;
    let promo = resolve_promo(&mut *conn, req.promo_code.as_deref()).await?;

    checkout::quote(&req.items, &menu, promo.as_ref(), &settings, now_millis())
}

/// Order + items + table number + latest payment attempt
pub async fn load_detail(pool: &SqlitePool, order_id: i64) -> AppResult<OrderDetail> {
    let order = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let items = order_repo::find_items(pool, order_id).await?;
    let table_number = table_repo::find_by_id(pool, order.table_id)
        .await?
        .map(|t| t.number);
    let latest_payment = payment_repo::find_latest(pool, order_id).await?;
    Ok(OrderDetail {
        order,
        items,
        table_number,
        latest_payment,
    })
}

fn publish_order(state: &ServerState, act: &str, detail: &OrderDetail) {
    state.broadcast_sync(resource::ORDER, act, &detail.order.id.to_string(), Some(detail));
}

/// Customer checkout
///
/// 1. Resolve the table from its QR token (must be active)
/// 2. Price the cart
/// 3. Take tracked stock, redeem the promo
/// 4. Insert order + items, occupy the table
pub async fn create_order(state: &ServerState, req: CreateOrderRequest) -> AppResult<OrderDetail> {
    validate_required_text(&req.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;

    let tz = state.config.timezone;
    let settings = settings_repo::get(&state.pool).await?;
    let now = now_millis();

    let mut tx = begin_write(&state.pool).await?;

    let table = table_repo::find_by_qr_code(&mut *tx, req.qr_code.trim())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    if !table.is_active {
        return Err(AppError::new(ErrorCode::TableInactive).with_detail("table", table.number));
    }

    let wanted = quantities_by_item(&req.items);
    let ids: Vec<i64> = wanted.keys().copied().collect();
    let menu = menu_repo::find_by_ids(&mut *tx, &ids).await?;
    let promo = resolve_promo(&mut *tx, req.promo_code.as_deref()).await?;

    let quote = checkout::quote(&req.items, &menu, promo.as_ref(), &settings, now)?;

    for (item_id, quantity) in &wanted {
        if !menu_repo::take_stock(&mut *tx, *item_id, *quantity).await? {
            return Err(AppError::with_message(
                ErrorCode::MenuItemOutOfStock,
                "Item sold out while placing the order",
            )
            .with_detail("menu_item_id", *item_id));
        }
    }

    if let Some(p) = &promo
        && !promo_repo::redeem(&mut *tx, p.id).await?
    {
        return Err(AppError::with_message(
            ErrorCode::PromoNotApplicable,
            format!("Promo '{}' has reached its usage limit", p.code),
        ));
    }

    let today = time::local_date_of(now, tz);
    let order_number = order_repo::next_order_number(
        &mut *tx,
        &today.format("%Y%m%d").to_string(),
        time::day_start_millis(today, tz),
        time::day_end_millis(today, tz),
    )
    .await?;

    let order = Order {
        id: snowflake_id(),
        order_number,
        table_id: table.id,
        customer_name: req.customer_name.trim().to_string(),
        notes: req.notes.clone(),
        status: OrderStatus::Pending,
        payment_method: None,
        payment_status: PaymentStatus::Unpaid,
        subtotal: quote.subtotal,
        discount: quote.discount,
        tax: quote.tax,
        service_charge: quote.service_charge,
        total: quote.total,
        promo_id: promo.as_ref().map(|p| p.id),
        promo_code: quote.promo_code.clone(),
        created_at: now,
        confirmed_at: None,
        paid_at: None,
        completed_at: None,
        cancelled_at: None,
        cancel_reason: None,
        updated_at: now,
    };
    order_repo::insert(&mut *tx, &order).await?;

    for line in &quote.lines {
        let item = OrderItem {
            id: snowflake_id(),
            order_id: order.id,
            menu_item_id: line.menu_item_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total,
            notes: line.notes.clone(),
        };
        order_repo::insert_item(&mut *tx, &item).await?;
    }

    apply_table_effect(&mut *tx, &order, TableEffect::Occupy).await?;

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id = order.id,
        order_number = %order.order_number,
        table = %table.number,
        total = order.total,
        "Order created"
    );

    let detail = load_detail(&state.pool, order.id).await?;
    publish_order(state, action::CREATED, &detail);
    state.broadcast_sync(
        resource::TABLE,
        action::UPDATED,
        &table.id.to_string(),
        None::<&()>,
    );
    Ok(detail)
}

async fn apply_table_effect(
    conn: &mut SqliteConnection,
    order: &Order,
    effect: TableEffect,
) -> AppResult<bool> {
    match effect {
        TableEffect::None => Ok(false),
        TableEffect::Occupy => {
            table_repo::set_status(conn, order.table_id, TableStatus::Occupied).await?;
            Ok(true)
        }
        TableEffect::Release => {
            let others = table_repo::count_active_orders(conn, order.table_id, Some(order.id)).await?;
            if others == 0 {
                table_repo::set_status(conn, order.table_id, TableStatus::Available).await?;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

fn actor_id(actor: Option<&CurrentUser>) -> AppResult<i64> {
    actor.map(|u| u.id).ok_or_else(AppError::not_authenticated)
}

/// Payment, stock and promo writes that accompany a transition
async fn apply_side_effects(
    conn: &mut SqliteConnection,
    order: &Order,
    command: &OrderCommand,
    transition: &Transition,
    actor: Option<&CurrentUser>,
    now: i64,
) -> AppResult<()> {
    match command {
        OrderCommand::VerifyPayment {
            method: PaymentMethod::Cash,
            ..
        } => {
            let received = transition.amount_received.unwrap_or(order.total);
            let change = transition.change_due.unwrap_or(0.0);
            payment_repo::insert_verified_cash(
                conn,
                order.id,
                order.total,
                received,
                change,
                actor_id(actor)?,
                now,
            )
            .await?;
        }
        OrderCommand::VerifyPayment { .. } => {
            let rows = payment_repo::verify_pending(conn, order.id, actor_id(actor)?, now).await?;
            if rows == 0 {
                return Err(AppError::with_message(
                    ErrorCode::PaymentProofRequired,
                    "No pending payment proof to verify",
                ));
            }
        }
        OrderCommand::RejectPayment { reason } => {
            let reason = reason.as_deref().unwrap_or(PROOF_REJECTED);
            let rows =
                payment_repo::reject_pending(conn, order.id, reason, actor.map(|u| u.id), now).await?;
            if rows == 0 {
                return Err(AppError::new(ErrorCode::PaymentNotAwaitingVerification));
            }
        }
        OrderCommand::Cancel { .. } | OrderCommand::Advance(OrderStatus::Cancelled) => {
            payment_repo::reject_pending(conn, order.id, ORDER_CANCELLED, actor.map(|u| u.id), now)
                .await?;
            for item in order_repo::find_items(&mut *conn, order.id).await? {
                menu_repo::restore_stock(conn, item.menu_item_id, item.quantity).await?;
            }
            if let Some(promo_id) = order.promo_id {
                promo_repo::release(conn, promo_id).await?;
            }
        }
        OrderCommand::SelectPaymentMethod(_)
        | OrderCommand::SubmitProof
        | OrderCommand::Advance(_) => {}
    }
    Ok(())
}

/// Run a lifecycle command against an order
///
/// `actor` is the staff member issuing it (`None` for customer commands).
pub async fn execute(
    state: &ServerState,
    order_id: i64,
    command: OrderCommand,
    actor: Option<&CurrentUser>,
) -> AppResult<OrderDetail> {
    let now = now_millis();
    let mut tx = begin_write(&state.pool).await?;

    let order = order_repo::find_by_id(&mut *tx, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;

    let transition = lifecycle::apply(&order, &command, now)?;
    order_repo::apply_transition(&mut *tx, &order, &transition, now).await?;
    apply_side_effects(&mut *tx, &order, &command, &transition, actor, now).await?;
    let table_changed = apply_table_effect(&mut *tx, &order, transition.table_effect).await?;

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id,
        command = command.name(),
        status = %transition.status,
        payment_status = %transition.payment_status,
        actor = actor.map(|u| u.username.as_str()).unwrap_or("customer"),
        "Order updated"
    );

    let detail = load_detail(&state.pool, order_id).await?;
    publish_order(state, action::UPDATED, &detail);
    if table_changed {
        state.broadcast_sync(
            resource::TABLE,
            action::UPDATED,
            &order.table_id.to_string(),
            None::<&()>,
        );
    }
    Ok(detail)
}

/// Verify payment with whatever method the customer selected
pub async fn approve(
    state: &ServerState,
    order_id: i64,
    amount_received: Option<f64>,
    actor: &CurrentUser,
) -> AppResult<OrderDetail> {
    let order = order_repo::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let method = order
        .payment_method
        .ok_or_else(|| AppError::new(ErrorCode::PaymentMethodRequired))?;
    let command = OrderCommand::VerifyPayment {
        method,
        amount_received,
    };
    execute(state, order_id, command, Some(actor)).await
}

/// Customer uploads a QRIS / transfer receipt
///
/// The lifecycle check runs before the image is stored so a rejected upload
/// leaves nothing on disk, and again inside the transaction.
pub async fn submit_proof(
    state: &ServerState,
    order_id: i64,
    data: Vec<u8>,
    filename: Option<&str>,
) -> AppResult<OrderDetail> {
    let current = order_repo::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    lifecycle::apply(&current, &OrderCommand::SubmitProof, now_millis())?;

    let proof_path = state.proofs.save(data, filename).await?;

    let now = now_millis();
    let mut tx = begin_write(&state.pool).await?;
    let order = order_repo::find_by_id(&mut *tx, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let transition = lifecycle::apply(&order, &OrderCommand::SubmitProof, now)?;
    let method = transition
        .payment_method
        .ok_or_else(|| AppError::new(ErrorCode::PaymentMethodRequired))?;

    order_repo::apply_transition(&mut *tx, &order, &transition, now).await?;
    payment_repo::reject_pending(&mut *tx, order_id, PROOF_SUPERSEDED, None, now).await?;
    payment_repo::insert_pending(&mut *tx, order_id, method, order.total, &proof_path, now).await?;

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(order_id, method = %method, proof = %proof_path, "Payment proof submitted");

    let detail = load_detail(&state.pool, order_id).await?;
    publish_order(state, action::UPDATED, &detail);
    Ok(detail)
}

/// Stored proof image of the latest upload
pub async fn proof_image(state: &ServerState, order_id: i64) -> AppResult<Vec<u8>> {
    let tx = payment_repo::find_latest_with_proof(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Payment proof"))?;
    let path = tx
        .proof_path
        .ok_or_else(|| AppError::not_found("Payment proof"))?;
    state.proofs.read(&path).await
}
