//! Checkout and the order lifecycle.
//!
//! The cart never lives on the server. The storefront sends its lines at
//! quote and checkout time; unit prices always come from the product store,
//! and the client's own total is only ever reconciled, never trusted.
use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use catalog::Product;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{Document, doc, oid::ObjectId},
    options::FindOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    auth::{AdminUser, AuthUser, Claims},
    database::{next_order_number, orders, products},
    error::AppError,
    models::{Address, Order, OrderLine, OrderStatus, OrderView, PaymentMethod, Role},
    notify::send_order_confirmation,
    payment::{PaymentSession, create_session},
    pricing::{Quote, quote, reconciles},
    state::AppState,
};

use super::ApiMessage;

/// Hard ceiling per line; a grocery order is not a freight manifest.
const MAX_LINE_QUANTITY: i64 = 1_000;

#[derive(Debug, Deserialize)]
pub struct CartLine {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: i64,
}

fn ensure_cart(items: &[CartLine]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::MalformedPayload(
            "order must contain at least one item",
        ));
    }

    for line in items {
        if line.quantity < 1 {
            return Err(AppError::MalformedPayload("quantity must be at least 1"));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(AppError::MalformedPayload("quantity too large"));
        }
    }

    Ok(())
}

/// Orders are scoped to their owner unless the caller is an admin.
fn order_filter(number: i64, claims: &Claims) -> Document {
    if claims.role == Role::Admin {
        doc! { "orderNumber": number }
    } else {
        doc! { "orderNumber": number, "userEmail": &claims.sub }
    }
}

async fn resolve_lines(
    state: &AppState,
    items: &[CartLine],
) -> Result<Vec<(Product, i64)>, AppError> {
    let collection = products(&state.db);
    let mut resolved = Vec::with_capacity(items.len());

    for line in items {
        let oid = ObjectId::parse_str(&line.product_id)
            .map_err(|_| AppError::Invalid(format!("Unknown product {}", line.product_id)))?;

        let product = collection
            .find_one(doc! { "_id": oid }, None)
            .await?
            .ok_or_else(|| AppError::Invalid(format!("Unknown product {}", line.product_id)))?;

        resolved.push((product, line.quantity));
    }

    Ok(resolved)
}

fn price_lines(resolved: &[(Product, i64)]) -> Vec<(i64, i64)> {
    resolved
        .iter()
        .map(|(product, quantity)| (product.price_paise, *quantity))
        .collect()
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartLine>,
}

/// The reconciliation primitive: the storefront refreshes its cart totals
/// from here before checkout.
pub async fn cart_quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    ensure_cart(&payload.items)?;

    let resolved = resolve_lines(&state, &payload.items).await?;

    Ok(Json(quote(&price_lines(&resolved))))
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub delivery: Address,
    pub payment: PaymentMethod,
    /// The storefront's locally-computed total, if it wants reconciliation.
    #[serde(rename = "expectedTotalPaise")]
    pub expected_total_paise: Option<i64>,
}

pub async fn checkout(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    ensure_cart(&payload.items)?;

    if payload.delivery.address.trim().is_empty() || payload.delivery.city.trim().is_empty() {
        return Err(AppError::MalformedPayload("delivery address is required"));
    }

    let resolved = resolve_lines(&state, &payload.items).await?;

    for (product, quantity) in &resolved {
        if i64::from(product.in_stock) < *quantity {
            return Err(AppError::Invalid(format!(
                "Insufficient stock for {}. Available: {}, Requested: {}",
                product.name, product.in_stock, quantity
            )));
        }
    }

    let pricing = quote(&price_lines(&resolved));
    if !reconciles(&pricing, payload.expected_total_paise) {
        return Err(AppError::PriceMismatch(pricing));
    }

    let order_number = next_order_number(&state.redis_connection).await?;
    let now = Utc::now().to_rfc3339();

    let items: Vec<OrderLine> = resolved
        .iter()
        .map(|(product, quantity)| OrderLine {
            product_id: product.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            unit_price_paise: product.price_paise,
            quantity: *quantity,
            image: product.image.clone(),
        })
        .collect();

    let order = Order {
        id: None,
        order_number,
        user_email: claims.sub.clone(),
        user_name: claims.name.clone(),
        items,
        delivery: payload.delivery,
        payment: payload.payment,
        pricing,
        status: OrderStatus::Pending,
        created_at: now.clone(),
        updated_at: now,
    };

    orders(&state.db).insert_one(&order, None).await?;
    info!("Order #{order_number} placed by {}", order.user_email);

    // Stock decrements are best-effort, matching the storefront's tolerance
    // for slightly stale counts. A failed decrement is an admin fixup, not a
    // failed order.
    let product_collection = products(&state.db);
    for (product, quantity) in &resolved {
        if let Some(oid) = product.id {
            let result = product_collection
                .update_one(
                    doc! { "_id": oid },
                    doc! { "$inc": { "inStock": -quantity } },
                    None,
                )
                .await;

            if let Err(e) = result {
                warn!("Stock decrement failed for {}: {e}", product.name);
            }
        }
    }

    send_order_confirmation(state.clone(), &order);

    Ok((StatusCode::CREATED, Json(OrderView::from(order))))
}

pub async fn list_orders(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let options = FindOptions::builder()
        .sort(doc! { "orderNumber": -1 })
        .build();

    let found: Vec<Order> = orders(&state.db)
        .find(doc! { "userEmail": &claims.sub }, options)
        .await?
        .try_collect()
        .await?;

    Ok(Json(found.into_iter().map(OrderView::from).collect()))
}

pub async fn get_order(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(number): Path<i64>,
) -> Result<Json<OrderView>, AppError> {
    let order = orders(&state.db)
        .find_one(order_filter(number, &claims), None)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    Ok(Json(OrderView::from(order)))
}

pub async fn admin_orders(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let options = FindOptions::builder()
        .sort(doc! { "orderNumber": -1 })
        .build();

    let found: Vec<Order> = orders(&state.db)
        .find(None, options)
        .await?
        .try_collect()
        .await?;

    Ok(Json(found.into_iter().map(OrderView::from).collect()))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Admin dashboard PATCH. Any known status can be set; there is no
/// transition graph beyond the cancel guard below.
pub async fn update_order_status(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(number): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    let status = OrderStatus::from_str(&payload.status)
        .map_err(|_| AppError::MalformedPayload("unknown status"))?;

    let result = orders(&state.db)
        .update_one(
            doc! { "orderNumber": number },
            doc! { "$set": { "status": status.as_str(), "updatedAt": Utc::now().to_rfc3339() } },
            None,
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("Order"));
    }

    info!("Order #{number} status set to {status}");

    Ok(ApiMessage::new(format!("Order status updated to {status}")))
}

pub async fn cancel_order(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(number): Path<i64>,
) -> Result<Json<ApiMessage>, AppError> {
    let collection = orders(&state.db);

    let order = collection
        .find_one(order_filter(number, &claims), None)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    if order.status == OrderStatus::Canceled {
        return Err(AppError::Conflict("Order is already canceled".to_string()));
    }

    collection
        .update_one(
            doc! { "orderNumber": number },
            doc! { "$set": { "status": OrderStatus::Canceled.as_str(), "updatedAt": Utc::now().to_rfc3339() } },
            None,
        )
        .await?;

    // Return the reserved stock. Same best-effort stance as the decrement.
    let product_collection = products(&state.db);
    for item in &order.items {
        if let Ok(oid) = ObjectId::parse_str(&item.product_id) {
            let result = product_collection
                .update_one(
                    doc! { "_id": oid },
                    doc! { "$inc": { "inStock": item.quantity } },
                    None,
                )
                .await;

            if let Err(e) = result {
                warn!("Stock restore failed for {}: {e}", item.name);
            }
        }
    }

    info!("Order #{number} canceled by {}", claims.sub);

    Ok(ApiMessage::new("Order canceled"))
}

#[derive(Deserialize)]
pub struct PaymentSessionRequest {
    #[serde(rename = "orderNumber")]
    pub order_number: i64,
}

/// Hand the storefront a hosted-payment link for an online order.
pub async fn payment_session(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PaymentSessionRequest>,
) -> Result<Json<PaymentSession>, AppError> {
    let order = orders(&state.db)
        .find_one(order_filter(payload.order_number, &claims), None)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    if order.payment != PaymentMethod::Online {
        return Err(AppError::MalformedPayload(
            "order is not an online payment",
        ));
    }
    if order.status == OrderStatus::Canceled {
        return Err(AppError::Conflict("Order is canceled".to_string()));
    }

    let session = create_session(&state, &order).await?;

    Ok(Json(session))
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::{CartLine, MAX_LINE_QUANTITY, ensure_cart, order_filter};
    use crate::{auth::Claims, models::Role};

    fn line(quantity: i64) -> CartLine {
        CartLine {
            product_id: "65f0c0ffee0000000000aaaa".to_string(),
            quantity,
        }
    }

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "asha@example.com".to_string(),
            name: "Asha".to_string(),
            role,
            exp: 0,
        }
    }

    #[test]
    fn test_ensure_cart_rejects_empty() {
        assert!(ensure_cart(&[]).is_err());
    }

    #[test]
    fn test_ensure_cart_rejects_bad_quantities() {
        assert!(ensure_cart(&[line(0)]).is_err());
        assert!(ensure_cart(&[line(-2)]).is_err());
        assert!(ensure_cart(&[line(MAX_LINE_QUANTITY + 1)]).is_err());
    }

    #[test]
    fn test_ensure_cart_accepts_valid() {
        assert!(ensure_cart(&[line(1), line(MAX_LINE_QUANTITY)]).is_ok());
    }

    #[test]
    fn test_order_filter_scopes_regular_users() {
        let filter = order_filter(7, &claims(Role::User));

        assert_eq!(
            filter,
            doc! { "orderNumber": 7_i64, "userEmail": "asha@example.com" }
        );
    }

    #[test]
    fn test_order_filter_admin_sees_all() {
        assert_eq!(order_filter(7, &claims(Role::Admin)), doc! { "orderNumber": 7_i64 });
    }
}
