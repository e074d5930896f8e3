use std::{path::Path as StdPath, sync::Arc};

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use catalog::{Product, sanitize::{sanitize_key, tidy}};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::FindOptions,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    auth::AdminUser,
    database::products,
    error::AppError,
    search::{remove_product, upsert_products},
    state::AppState,
};

use super::ApiMessage;

/// API shape: the ObjectId goes out as a plain hex string.
#[derive(Serialize)]
pub struct ProductView {
    pub id: String,
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

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product
                .id
                .map(|oid| oid.to_hex())
                .unwrap_or_default(),
            name: product.name,
            description: product.description,
            category: product.category,
            unit: product.unit,
            price_paise: product.price_paise,
            image: product.image,
            in_stock: product.in_stock,
            created_at: product.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    let filter = params
        .category
        .map(|category| doc! { "category": sanitize_key(&category) });

    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .build();

    let found: Vec<Product> = products(&state.db)
        .find(filter, options)
        .await?
        .try_collect()
        .await?;

    Ok(Json(found.into_iter().map(ProductView::from).collect()))
}

fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::MalformedPayload("invalid product id"))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, AppError> {
    let oid = parse_object_id(&id)?;

    let product = products(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    Ok(Json(ProductView::from(product)))
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub unit: String,
    #[serde(rename = "pricePaise")]
    pub price_paise: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stock: i32,
}

fn validate_product(name: &str, price_paise: i64, stock: i32) -> Result<String, AppError> {
    let key = sanitize_key(name);
    if key.is_empty() {
        return Err(AppError::MalformedPayload("name is required"));
    }
    if price_paise < 0 {
        return Err(AppError::MalformedPayload("price cannot be negative"));
    }
    if stock < 0 {
        return Err(AppError::MalformedPayload("stock cannot be negative"));
    }

    Ok(key)
}

pub async fn create_product(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductView>), AppError> {
    let key = validate_product(&payload.name, payload.price_paise, payload.stock)?;

    let mut product = Product {
        id: None,
        key,
        name: tidy(&payload.name),
        description: payload.description.trim().to_string(),
        category: sanitize_key(&payload.category),
        unit: tidy(&payload.unit),
        price_paise: payload.price_paise,
        image: payload.image,
        in_stock: payload.stock,
        created_at: Utc::now().to_rfc3339(),
    };

    let collection = products(&state.db);

    if collection
        .find_one(doc! { "key": &product.key }, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Product already exists".to_string()));
    }

    let result = collection.insert_one(&product, None).await?;
    product.id = result.inserted_id.as_object_id();

    upsert_products(state.meili_client.clone(), std::slice::from_ref(&product)).await?;
    info!("Product created: {}", product.name);

    Ok((StatusCode::CREATED, Json(ProductView::from(product))))
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[serde(rename = "pricePaise")]
    pub price_paise: Option<i64>,
    pub image: Option<String>,
    pub stock: Option<i32>,
}

pub async fn update_product(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductView>, AppError> {
    let oid = parse_object_id(&id)?;
    let mut update = doc! {};

    if let Some(name) = payload.name {
        let key = sanitize_key(&name);
        if key.is_empty() {
            return Err(AppError::MalformedPayload("name cannot be blank"));
        }
        update.insert("key", key);
        update.insert("name", tidy(&name));
    }
    if let Some(description) = payload.description {
        update.insert("description", description.trim());
    }
    if let Some(category) = payload.category {
        update.insert("category", sanitize_key(&category));
    }
    if let Some(unit) = payload.unit {
        update.insert("unit", tidy(&unit));
    }
    if let Some(price_paise) = payload.price_paise {
        if price_paise < 0 {
            return Err(AppError::MalformedPayload("price cannot be negative"));
        }
        update.insert("pricePaise", price_paise);
    }
    if let Some(image) = payload.image {
        update.insert("image", image);
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::MalformedPayload("stock cannot be negative"));
        }
        update.insert("inStock", stock);
    }

    if update.is_empty() {
        return Err(AppError::MalformedPayload("no fields to update"));
    }

    let collection = products(&state.db);
    let result = collection
        .update_one(doc! { "_id": oid }, doc! { "$set": update }, None)
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("Product"));
    }

    let product = collection
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    upsert_products(state.meili_client.clone(), std::slice::from_ref(&product)).await?;

    Ok(Json(ProductView::from(product)))
}

pub async fn delete_product(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, AppError> {
    let oid = parse_object_id(&id)?;

    let result = products(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Product"));
    }

    remove_product(&state.meili_client, &oid.to_hex()).await?;
    info!("Product deleted: {id}");

    Ok(ApiMessage::new("Product deleted"))
}

/// Keep extension and readable characters, drop anything path-like.
fn safe_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.trim_matches('-').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

pub async fn upload_image(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::MalformedPayload("invalid multipart body"))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|_| AppError::MalformedPayload("unreadable upload"))?;

        if data.is_empty() {
            return Err(AppError::MalformedPayload("empty file"));
        }

        let filename = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            safe_filename(&original)
        );
        let path = StdPath::new(&state.config.upload_dir).join(&filename);

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(Box::new(e)))?;

        info!("Image stored: {filename}");

        return Ok((
            StatusCode::CREATED,
            Json(json!({ "url": format!("/uploads/{filename}") })),
        ));
    }

    Err(AppError::MalformedPayload("missing image field"))
}

#[cfg(test)]
mod tests {
    use super::{safe_filename, validate_product};

    #[test]
    fn test_validate_product() {
        assert_eq!(validate_product("Toor Dal", 9_900, 10).unwrap(), "toor dal");
        assert!(validate_product("  ", 9_900, 10).is_err());
        assert!(validate_product("Toor Dal", -1, 10).is_err());
        assert!(validate_product("Toor Dal", 9_900, -1).is_err());
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("mango.jpg"), "mango.jpg");
        assert_eq!(safe_filename("../../etc/passwd"), "..-..-etc-passwd");
        assert_eq!(safe_filename("///"), "upload");
    }
}
