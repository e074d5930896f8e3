//! # Catalog
//!
//! Shared product data used by the API server and the seeder.
//!
//! ## Overall Data Structures
//!
//! - Catalog file (`catalog.json`): list of products as maintained by the
//!   store team. This is the source the seeder reads, either from disk or
//!   from the published copy on GitHub.
//!
//! - Product document: the MongoDB shape. One document per product, keyed by
//!   the auto `_id` with a `key` field holding the sanitized name so the
//!   seeder can upsert without duplicating items.
//!
//! - Search document: the flattened shape pushed into Meilisearch. Kept
//!   small on purpose, it is what search-as-you-type responses return to the
//!   storefront.
//!
//! ## Notes
//!
//! - Prices are integer paise everywhere. The storefront formats them for
//!   display, the backend never handles fractional rupees.
//!
//! - Product names are sanitized once at seed time. The sanitized key is
//!   what deduplicates re-seeds, the display name keeps its casing.
use std::fs;

use anyhow::Error;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub mod money;
pub mod sanitize;

use sanitize::{sanitize_key, tidy};

pub const CATALOG_PATH: &str = "catalog.json";
pub const REMOTE_CATALOG_PATH: &str =
    "https://github.com/freshmart/catalog/raw/refs/heads/main/catalog.json";

/// One entry of the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub unit: String,
    pub price_paise: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stock: i32,
}

/// Product document as stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Sanitized name, unique per product. Seeder upserts match on this.
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    #[serde(rename = "pricePaise")]
    pub price_paise: i64,
    pub image: String,
    #[serde(rename = "inStock")]
    pub in_stock: i32,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Search-index document, also the hit shape returned to the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProduct {
    pub id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    #[serde(rename = "pricePaise")]
    pub price_paise: i64,
    pub image: String,
    #[serde(rename = "inStock")]
    pub in_stock: i32,
}

impl CatalogProduct {
    /// Lift a catalog entry into a store document. Returns `None` when the
    /// name sanitizes to nothing (gibberish rows in the catalog file).
    pub fn into_product(self, created_at: String) -> Option<Product> {
        let key = sanitize_key(&self.name);
        if key.is_empty() {
            return None;
        }

        Some(Product {
            id: None,
            key,
            name: tidy(&self.name),
            description: self.description.trim().to_string(),
            category: sanitize_key(&self.category),
            unit: tidy(&self.unit),
            price_paise: self.price_paise,
            image: self.image,
            in_stock: self.stock,
            created_at,
        })
    }
}

impl From<&Product> for SearchProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product
                .id
                .map(|oid| oid.to_hex())
                .unwrap_or_else(|| product.key.clone()),
            name: product.name.clone(),
            category: product.category.clone(),
            unit: product.unit.clone(),
            price_paise: product.price_paise,
            image: product.image.clone(),
            in_stock: product.in_stock,
        }
    }
}

pub fn read_catalog(path: &str) -> Result<Vec<CatalogProduct>, Error> {
    let data = fs::read_to_string(path)?;

    Ok(serde_json::from_str(&data)?)
}

pub fn write_catalog(path: &str, items: &[CatalogProduct]) -> Result<(), Error> {
    fs::write(path, serde_json::to_vec_pretty(items)?)?;

    Ok(())
}

pub async fn fetch_catalog_remote(url: &str) -> Result<Vec<CatalogProduct>, Error> {
    let response = reqwest::get(url).await?;
    let bytes = response.bytes().await?;

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::CatalogProduct;

    fn entry(name: &str) -> CatalogProduct {
        CatalogProduct {
            name: name.to_string(),
            description: "  farm fresh  ".to_string(),
            category: "Fruits & Veggies".to_string(),
            unit: "500 g".to_string(),
            price_paise: 4_500,
            image: String::new(),
            stock: 20,
        }
    }

    #[test]
    fn test_into_product() {
        let product = entry("  Alphonso   Mango ").into_product("now".to_string()).unwrap();

        assert_eq!(product.key, "alphonso mango");
        assert_eq!(product.name, "Alphonso Mango");
        assert_eq!(product.category, "fruits veggies");
        assert_eq!(product.description, "farm fresh");
        assert_eq!(product.price_paise, 4_500);
    }

    #[test]
    fn test_gibberish_name_dropped() {
        assert!(entry("!!!@@@").into_product("now".to_string()).is_none());
    }

    #[test]
    fn test_search_product_falls_back_to_key() {
        let product = entry("Curd").into_product("now".to_string()).unwrap();
        let hit = super::SearchProduct::from(&product);

        assert_eq!(hit.id, "curd");
        assert_eq!(hit.price_paise, 4_500);
    }
}
