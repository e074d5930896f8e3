//! Payment gateway client. The gateway is an external collaborator: this
//! module creates a hosted payment session for an online order and relays
//! the link back to the storefront. Settlement, webhooks, and refunds are
//! the gateway's problem, not ours.
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::Order, state::AppState};

#[derive(Serialize)]
struct SessionRequest<'a> {
    order_id: String,
    order_amount: i64,
    order_currency: &'static str,
    customer_email: &'a str,
    customer_name: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub session_id: String,
    pub payment_link: String,
}

pub async fn create_session(state: &AppState, order: &Order) -> Result<PaymentSession, AppError> {
    let request = SessionRequest {
        order_id: format!("ORD{}", order.order_number),
        order_amount: order.pricing.total,
        order_currency: "INR",
        customer_email: &order.user_email,
        customer_name: &order.user_name,
    };

    let response = state
        .http_client
        .post(format!("{}/orders/sessions", state.config.payment_url))
        .header("x-api-key", &state.config.payment_api_key)
        .json(&request)
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}
