//! # Meilisearch
//!
//! Search engine behind the storefront's search-as-you-type box.
//!
//! ## Schema
//! - One index for all products
//! - Fields: name, category, unit, price, image, stock
//!
//! ## Proxy
//! Meilisearch is never exposed to the storefront. Queries go through
//! `GET /search` on this server, which forwards them and returns the hits.
//! The extra hop is on the same machine; the benefit is that the admin key
//! and index layout stay private, and the response shape stays ours.
//!
//! ## Sync
//! MongoDB is the source of truth. The full catalog is upserted here at
//! startup and by the seeder; product create/update/delete keeps the index
//! in step inline.
use std::sync::Arc;

use catalog::{Product, SearchProduct};
use meilisearch_sdk::{
    client::Client,
    settings::{MinWordSizeForTypos, Settings, TypoToleranceSettings},
};
use serde::Serialize;

use crate::error::AppError;

pub const PRODUCT_INDEX: &str = "products";
pub const PRODUCT_ID: &str = "id";
pub const PRODUCT_NAME: &str = "name";
pub const PRODUCT_CATEGORY: &str = "category";
pub const PRODUCT_PRICE: &str = "pricePaise";

pub const SEARCH_LIMIT: usize = 20;

pub async fn init_meilisearch(
    meili_url: &str,
    meili_admin_key: &str,
    products: &[Product],
) -> Arc<Client> {
    let meili_client = Arc::new(Client::new(meili_url, Some(meili_admin_key)).unwrap());

    meili_client
        .index(PRODUCT_INDEX)
        .set_settings(&init_settings())
        .await
        .unwrap();

    upsert_products(meili_client.clone(), products)
        .await
        .unwrap();

    meili_client
}

pub async fn upsert_products(
    meili_client: Arc<Client>,
    products: &[Product],
) -> Result<(), AppError> {
    let documents: Vec<SearchProduct> = products.iter().map(SearchProduct::from).collect();

    upsert_items(meili_client, PRODUCT_INDEX, &documents, PRODUCT_ID).await
}

async fn upsert_items<T>(
    meili_client: Arc<Client>,
    index_name: &str,
    items: &[T],
    id_name: &str,
) -> Result<(), AppError>
where
    T: Serialize + Send + Sync,
{
    let _result = meili_client
        .index(index_name)
        .add_or_update(items, Some(id_name))
        .await?
        .wait_for_completion(&meili_client, None, None)
        .await?;

    #[cfg(feature = "verbose")]
    tracing::info!("Meili task result: {:?}", _result);

    Ok(())
}

pub async fn remove_product(meili_client: &Client, id: &str) -> Result<(), AppError> {
    meili_client.index(PRODUCT_INDEX).delete_document(id).await?;

    Ok(())
}

pub async fn search_products(
    meili_client: &Client,
    query: &str,
    category: Option<&str>,
) -> Result<Vec<SearchProduct>, AppError> {
    let index = meili_client.index(PRODUCT_INDEX);

    let filter = category.map(|c| format!("{PRODUCT_CATEGORY} = \"{c}\""));

    let mut search = index.search();
    search.with_query(query).with_limit(SEARCH_LIMIT);
    if let Some(filter) = &filter {
        search.with_filter(filter);
    }

    let results = search.execute::<SearchProduct>().await?;

    Ok(results.hits.into_iter().map(|hit| hit.result).collect())
}

fn init_settings() -> Settings {
    Settings::new()
        .with_ranking_rules([
            "words",
            "typo",
            "proximity",
            "exactness",
            "attribute",
            "sort",
        ])
        .with_distinct_attribute(Some(PRODUCT_NAME))
        .with_filterable_attributes([PRODUCT_CATEGORY])
        .with_searchable_attributes([PRODUCT_NAME, PRODUCT_CATEGORY])
        .with_sortable_attributes([PRODUCT_PRICE])
        .with_typo_tolerance(TypoToleranceSettings {
            enabled: Some(true),
            disable_on_attributes: None,
            disable_on_words: None,
            min_word_size_for_typos: Some(MinWordSizeForTypos {
                one_typo: Some(4),
                two_typos: Some(8),
            }),
        })
}
