use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use catalog::{SearchProduct, sanitize::sanitize_key};
use serde::Deserialize;

use crate::{error::AppError, search::search_products, state::AppState};

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

/// Search-as-you-type. The storefront debounces; we just forward to the
/// index and return the hits as-is.
pub async fn search_products_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchProduct>>, AppError> {
    let category = params.category.map(|c| sanitize_key(&c));

    let hits = search_products(&state.meili_client, params.q.trim(), category.as_deref()).await?;

    Ok(Json(hits))
}
