use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub mongo_url: String,
    pub redis_url: String,
    pub meili_url: String,
    pub upload_dir: String,
    pub payment_url: String,
    pub mail_relay_url: String,
    pub geocoder_url: String,
    pub jwt_secret: String,
    pub meili_key: String,
    pub payment_api_key: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "8000"),
            mongo_url: try_load("MONGO_URL", "mongodb://localhost:27017"),
            redis_url: try_load("REDIS_URL", "redis://localhost:6379"),
            meili_url: try_load("MEILI_URL", "http://localhost:7700"),
            upload_dir: try_load("UPLOAD_DIR", "uploads"),
            payment_url: try_load("PAYMENT_URL", "https://sandbox.cashfree.com/pg"),
            mail_relay_url: try_load("MAIL_RELAY_URL", "http://localhost:8025/send"),
            geocoder_url: try_load("GEOCODER_URL", "https://nominatim.openstreetmap.org/reverse"),
            jwt_secret: read_secret("JWT_SECRET"),
            meili_key: read_secret("MEILI_ADMIN_KEY"),
            payment_api_key: read_secret("PAYMENT_API_KEY"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

pub fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

pub fn read_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .expect("Secrets misconfigured!")
}
