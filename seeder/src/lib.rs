//! # Catalog Seeding
//!
//! Takes the catalog file the store team maintains and pushes it into the
//! running stores.
//!
//! 1. Read the catalog, from disk or from the published copy.
//!
//! 2. Sanitize every entry. The sanitized name is the upsert key, so
//!    re-running the seeder is idempotent: existing products get their
//!    price/stock/image refreshed, unknown names become new products.
//!
//! 3. Entries whose name sanitizes to nothing are gibberish rows and get
//!    dropped, with a count printed at the end.
//!
//! 4. After MongoDB is current, the whole catalog is re-upserted into the
//!    search index so search-as-you-type matches what the store sells.
use std::collections::HashSet;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use mongodb::{bson::doc, options::UpdateOptions};

use catalog::{CatalogProduct, Product, fetch_catalog_remote, read_catalog};
use server::{
    config::{read_secret, try_load},
    database::{all_products, ensure_indexes, init_mongo, products},
    search::init_meilisearch,
};

pub enum Source {
    File(String),
    Remote(String),
}

pub async fn seed_catalog(source: Source) {
    let entries = match source {
        Source::File(path) => read_catalog(&path).expect("Failed to read catalog file"),
        Source::Remote(url) => fetch_catalog_remote(&url)
            .await
            .expect("Failed to fetch remote catalog"),
    };

    println!("Catalog entries: {}", entries.len());

    let total = entries.len();
    let now = Utc::now().to_rfc3339();
    let mut seen: HashSet<String> = HashSet::new();

    let items: Vec<Product> = entries
        .into_iter()
        .filter_map(|entry: CatalogProduct| entry.into_product(now.clone()))
        .filter(|product| {
            // Duplicate names in a hand-maintained file are a mistake; the
            // first entry wins.
            seen.insert(product.key.clone())
        })
        .collect();

    let dropped = total - items.len();

    let mongo_url: String = try_load("MONGO_URL", "mongodb://localhost:27017");
    let meili_url: String = try_load("MEILI_URL", "http://localhost:7700");
    let meili_key = read_secret("MEILI_ADMIN_KEY");

    let db = init_mongo(&mongo_url).await;
    ensure_indexes(&db).await.expect("Index creation failed");

    let collection = products(&db);

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("=> "),
    );

    let mut new_items = 0;
    let mut updated_items = 0;

    for product in &items {
        pb.set_message(product.name.clone());

        let result = collection
            .update_one(
                doc! { "key": &product.key },
                doc! {
                    "$set": {
                        "name": &product.name,
                        "description": &product.description,
                        "category": &product.category,
                        "unit": &product.unit,
                        "pricePaise": product.price_paise,
                        "image": &product.image,
                        "inStock": product.in_stock,
                    },
                    "$setOnInsert": {
                        "key": &product.key,
                        "createdAt": &product.created_at,
                    },
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .expect("Product upsert failed");

        if result.upserted_id.is_some() {
            new_items += 1;
        } else {
            updated_items += 1;
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    let stored = all_products(&db).await.expect("Failed to read back catalog");
    init_meilisearch(&meili_url, &meili_key, &stored).await;

    println!("\nNew Items: {new_items}");
    println!("Updated Items: {updated_items}");
    println!("Indexed Items: {}", stored.len());
    if dropped > 0 {
        println!("Dropped (gibberish/duplicate): {dropped}");
    }
}
