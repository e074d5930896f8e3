//! # MongoDB & Redis
//!
//! MongoDB is the durable store, Redis the counter store.
//!
//! ## Requirements
//!
//! - Users looked up by email on every login and every authenticated request
//!   that touches the store, so email carries a unique index
//! - Orders addressed by their numeric order number from the storefront, so
//!   the number carries a unique index too
//! - Order numbers must be unique under concurrent checkouts
//!
//! ## Implementation
//!
//! - One database, three collections: `users`, `products`, `orders`
//! - Order numbers come from a single Redis `INCR` key. Atomic, monotonic,
//!   one O(1) call per checkout
use std::time::Duration;

use catalog::Product;
use futures::stream::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::{
    error::AppError,
    models::{Order, User},
};

pub const DB_NAME: &str = "freshmart";

pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";

const ORDER_SEQ_KEY: &str = "orders:seq";

pub async fn init_mongo(mongo_url: &str) -> Database {
    let options = ClientOptions::parse(mongo_url)
        .await
        .expect("Invalid MONGO_URL");
    let client = mongodb::Client::with_options(options).expect("Failed to build MongoDB client");

    client.database(DB_NAME)
}

pub async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let unique = |name: &str| {
        IndexOptions::builder()
            .unique(true)
            .name(name.to_string())
            .build()
    };

    users(db)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique("uniq_email"))
                .build(),
            None,
        )
        .await?;

    products(db)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "key": 1 })
                .options(unique("uniq_key"))
                .build(),
            None,
        )
        .await?;
    products(db)
        .create_index(IndexModel::builder().keys(doc! { "category": 1 }).build(), None)
        .await?;

    orders(db)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "orderNumber": 1 })
                .options(unique("uniq_order_number"))
                .build(),
            None,
        )
        .await?;
    orders(db)
        .create_index(
            IndexModel::builder().keys(doc! { "userEmail": 1 }).build(),
            None,
        )
        .await?;

    Ok(())
}

pub fn users(db: &Database) -> Collection<User> {
    db.collection::<User>(USERS)
}

pub fn products(db: &Database) -> Collection<Product> {
    db.collection::<Product>(PRODUCTS)
}

pub fn orders(db: &Database) -> Collection<Order> {
    db.collection::<Order>(ORDERS)
}

pub async fn all_products(db: &Database) -> mongodb::error::Result<Vec<Product>> {
    products(db).find(None, None).await?.try_collect().await
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

/// Allocate the next order number. Numbers start at 1 and never repeat.
pub async fn next_order_number(redis: &ConnectionManager) -> Result<i64, AppError> {
    let mut connection = redis.clone();
    let number: i64 = connection.incr(ORDER_SEQ_KEY, 1).await?;

    Ok(number)
}
