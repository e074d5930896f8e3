use std::sync::Arc;

use meilisearch_sdk::client::Client;
use redis::aio::ConnectionManager;

use super::{
    config::Config,
    database::{all_products, ensure_indexes, init_mongo, init_redis},
    search::init_meilisearch,
};

pub struct AppState {
    pub config: Config,
    pub db: mongodb::Database,
    pub redis_connection: ConnectionManager,
    pub meili_client: Arc<Client>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let db = init_mongo(&config.mongo_url).await;
        ensure_indexes(&db).await.expect("Index creation failed");

        let redis_connection = init_redis(&config.redis_url).await;

        let products = all_products(&db).await.expect("Failed to load catalog");
        let meili_client = init_meilisearch(&config.meili_url, &config.meili_key, &products).await;

        Arc::new(Self {
            config,
            db,
            redis_connection,
            meili_client,
            http_client: reqwest::Client::new(),
        })
    }
}
