use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

pub mod auth;
pub mod geo;
pub mod orders;
pub mod products;
pub mod search;

#[derive(Serialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
