use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

/// "Use my location" on the checkout form. The geocoder is an external
/// collaborator; its JSON goes back to the storefront untouched.
pub async fn reverse_geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseParams>,
) -> Result<Json<Value>, AppError> {
    let response = state
        .http_client
        .get(&state.config.geocoder_url)
        .query(&[
            ("lat", params.lat.to_string()),
            ("lon", params.lon.to_string()),
            ("format", "json".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;

    Ok(Json(response.json().await?))
}
