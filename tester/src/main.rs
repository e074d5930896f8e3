//! Smoke test against a running deployment. Walks the storefront happy path
//! and prints what each step returned. Destructive only to its own data.
use std::env;

use chrono::Utc;
use reqwest::Client;
use serde_json::{Value, json};

#[tokio::main]
async fn main() {
    let base = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let client = Client::new();

    let health = client.get(&base).send().await.expect("Server unreachable");
    println!("health: {}", health.status());

    let email = format!("smoke-{}@example.com", Utc::now().timestamp_millis());
    let password = "smoke-test-pass";

    let signup = client
        .post(format!("{base}/auth/signup"))
        .json(&json!({ "name": "Smoke Tester", "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    println!("signup: {}", signup.status());

    let login: Value = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().expect("No token in login response");
    println!("login: ok ({})", login["user"]["email"]);

    let products: Vec<Value> = client
        .get(format!("{base}/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    println!("products: {}", products.len());

    let Some(product) = products.first() else {
        println!("Catalog is empty, run the seeder first");
        return;
    };
    let product_id = product["id"].as_str().unwrap();

    let search = client
        .get(format!("{base}/search"))
        .query(&[("q", product["name"].as_str().unwrap_or(""))])
        .send()
        .await
        .unwrap();
    println!("search: {}", search.status());

    let cart = json!({ "items": [{ "productId": product_id, "quantity": 2 }] });

    let quote: Value = client
        .post(format!("{base}/cart/quote"))
        .json(&cart)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    println!("quote: total {} paise", quote["totalPaise"]);

    let order: Value = client
        .post(format!("{base}/orders"))
        .bearer_auth(token)
        .json(&json!({
            "items": cart["items"],
            "delivery": { "address": "12 MG Road", "city": "Pune" },
            "payment": "cod",
            "expectedTotalPaise": quote["totalPaise"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let number = order["orderNumber"].as_i64().expect("No order number");
    println!("checkout: order #{number} ({})", order["status"]);

    let tracked = client
        .get(format!("{base}/orders/{number}"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    println!("track: {}", tracked.status());

    let cancel = client
        .post(format!("{base}/orders/{number}/cancel"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    println!("cancel: {}", cancel.status());

    let cancel_again = client
        .post(format!("{base}/orders/{number}/cancel"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    println!("cancel again: {} (expected 409)", cancel_again.status());
}
