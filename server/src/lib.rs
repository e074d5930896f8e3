//! Grocery storefront backend.
//!
//! # General Infrastructure
//! - Storefront SPA talks to this API over JSON, nothing else is exposed
//! - The cart lives in the browser; the server only quotes and reconciles
//!   pricing at checkout
//! - MongoDB holds users, products, and orders
//! - Redis hands out the numeric order numbers (atomic `INCR`)
//! - Meilisearch answers search-as-you-type, proxied through this server
//!
//! # Notes
//!
//! ## Redis + Meilisearch
//! Meilisearch could in theory hold the counter too, but it is fundamentally
//! a search engine, not a database. Order numbers need an atomic increment
//! that survives concurrent checkouts; Redis gives that in one O(1) call.
//!
//! Meilisearch in turn stays a read-side index. The product catalog in
//! MongoDB is the source of truth, and the index is re-upserted at startup
//! and by the seeder. Eventual consistency between the two is acceptable for
//! a storefront search box.
use std::{fs, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, patch, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod notify;
pub mod payment;
pub mod pricing;
pub mod routes;
pub mod search;
pub mod state;

use routes::{
    auth::{list_users, login, signup, social_stub, update_profile, verify},
    geo::reverse_geocode,
    orders::{
        admin_orders, cancel_order, cart_quote, checkout, get_order, list_orders, payment_session,
        update_order_status,
    },
    products::{
        create_product, delete_product, get_product, list_products, update_product, upload_image,
    },
    root,
    search::search_products_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    fs::create_dir_all(&state.config.upload_dir).expect("Failed to create upload directory");

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(root))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
        .route("/auth/profile", patch(update_profile))
        .route("/auth/google", get(social_stub))
        .route("/auth/github", get(social_stub))
        .route("/users", get(list_users))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/upload", post(upload_image))
        .route("/search", get(search_products_handler))
        .route("/cart/quote", post(cart_quote))
        .route("/orders", post(checkout).get(list_orders))
        .route("/orders/all", get(admin_orders))
        .route("/orders/:number", get(get_order))
        .route("/orders/:number/status", patch(update_order_status))
        .route("/orders/:number/cancel", post(cancel_order))
        .route("/payments/session", post(payment_session))
        .route("/geo/reverse", get(reverse_geocode))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
