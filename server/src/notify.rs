//! Order-confirmation mail, sent through the HTTP mail relay. Fire and
//! forget: checkout never waits on the relay and never fails because of it.
use std::sync::Arc;

use catalog::money::rupees;
use serde::Serialize;
use tracing::warn;

use crate::{models::Order, state::AppState};

#[derive(Serialize)]
struct MailEnvelope {
    to: String,
    subject: String,
    body: String,
}

pub fn send_order_confirmation(state: Arc<AppState>, order: &Order) {
    let envelope = MailEnvelope {
        to: order.user_email.clone(),
        subject: format!("Order #{} confirmed", order.order_number),
        body: order_summary(order),
    };
    let order_number = order.order_number;

    tokio::spawn(async move {
        let result = state
            .http_client
            .post(&state.config.mail_relay_url)
            .json(&envelope)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        if let Err(e) = result {
            warn!("Confirmation mail for order #{order_number} failed: {e}");
        }
    });
}

fn order_summary(order: &Order) -> String {
    let mut lines: Vec<String> = order
        .items
        .iter()
        .map(|item| {
            format!(
                "{} x{} — {}",
                item.name,
                item.quantity,
                rupees(item.unit_price_paise * item.quantity)
            )
        })
        .collect();

    lines.push(format!("Total: {}", rupees(order.pricing.total)));
    lines.push(format!("Deliver to: {}, {}", order.delivery.address, order.delivery.city));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::order_summary;
    use crate::{
        models::{Address, Order, OrderLine, OrderStatus, PaymentMethod},
        pricing::quote,
    };

    #[test]
    fn test_order_summary() {
        let order = Order {
            id: None,
            order_number: 41,
            user_email: "asha@example.com".to_string(),
            user_name: "Asha".to_string(),
            items: vec![OrderLine {
                product_id: "p1".to_string(),
                name: "Basmati Rice".to_string(),
                unit: "1 kg".to_string(),
                unit_price_paise: 120_00,
                quantity: 2,
                image: String::new(),
            }],
            delivery: Address {
                address: "12 MG Road".to_string(),
                city: "Pune".to_string(),
                postal_code: None,
                phone: None,
            },
            payment: PaymentMethod::Cod,
            pricing: quote(&[(120_00, 2)]),
            status: OrderStatus::Pending,
            created_at: String::new(),
            updated_at: String::new(),
        };

        let summary = order_summary(&order);

        assert!(summary.contains("Basmati Rice x2 — ₹240.00"));
        assert!(summary.contains("Deliver to: 12 MG Road, Pune"));
        // 240_00 - 24_00 + 21_60 + 21_60 + 40_00
        assert!(summary.contains("Total: ₹299.20"));
    }
}
