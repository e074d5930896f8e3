//! # Auth
//!
//! Argon2 password hashes at rest, HS256 bearer tokens on the wire. Tokens
//! carry the email and role, last 7 days, and are verified statelessly on
//! every protected request.
use std::sync::Arc;

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{Role, User},
    state::AppState,
};

pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(e.to_string().into()))?
        .to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(user: &User, secret: &[u8]) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
    let claims = Claims {
        sub: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Internal(e.to_string().into()))
}

pub fn decode_token(token: &str, secret: &[u8]) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

    decode_token(token, state.config.jwt_secret.as_bytes())
}

/// Any authenticated caller.
pub struct AuthUser(pub Claims);

/// Authenticated caller with the admin role.
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(bearer_claims(parts, state)?))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;

        if claims.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::{Claims, decode_token, hash_password, issue_token, verify_password};
    use crate::models::{Role, User};

    const SECRET: &[u8] = b"test-secret";

    fn user() -> User {
        User {
            id: None,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: String::new(),
            role: Role::User,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token(&user(), SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "asha@example.com");
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&user(), SECRET).unwrap();

        assert!(decode_token(&token, b"other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims {
            sub: "asha@example.com".to_string(),
            name: "Asha".to_string(),
            role: Role::User,
            exp: (Utc::now().timestamp() - 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn test_password_hash_verify() {
        let hash = hash_password("s3cret-pass").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong-pass", &hash));
        assert!(!verify_password("s3cret-pass", "not-a-hash"));
    }
}
