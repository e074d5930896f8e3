use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    auth::{AdminUser, AuthUser, hash_password, issue_token, verify_password},
    database::users,
    error::AppError,
    models::{PublicUser, Role, User},
    state::AppState,
};

use super::ApiMessage;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: PublicUser,
}

fn validate_signup(payload: &SignupRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::MalformedPayload("name is required"));
    }
    if !payload.email.contains('@') || payload.email.trim().len() < 3 {
        return Err(AppError::MalformedPayload("invalid email"));
    }
    if payload.password.len() < 8 {
        return Err(AppError::MalformedPayload(
            "password must be at least 8 characters",
        ));
    }

    Ok(())
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    validate_signup(&payload)?;

    let collection = users(&state.db);
    let email = payload.email.trim().to_lowercase();

    if collection
        .find_one(doc! { "email": &email }, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // Admins are provisioned directly in the store, never self-assigned here.
    let user = User {
        id: None,
        name: payload.name.trim().to_string(),
        email,
        password_hash: hash_password(&payload.password)?,
        role: Role::User,
        created_at: Utc::now().to_rfc3339(),
    };

    collection.insert_one(&user, None).await?;
    info!("New account: {}", user.email);

    let token = issue_token(&user, state.config.jwt_secret.as_bytes())?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();

    let user = users(&state.db)
        .find_one(doc! { "email": &email }, None)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    info!("Login: {} ({:?})", user.email, user.role);

    let token = issue_token(&user, state.config.jwt_secret.as_bytes())?;

    Ok(Json(TokenResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// The storefront's session-restore call: echoes the identity inside a
/// still-valid token.
pub async fn verify(AuthUser(claims): AuthUser) -> Json<PublicUser> {
    Json(PublicUser {
        name: claims.name,
        email: claims.sub,
        role: claims.role,
    })
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

pub async fn update_profile(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    let mut update = doc! {};

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if !name.is_empty() {
            update.insert("name", name);
        }
    }

    if let Some(password) = payload.password {
        if password.len() < 8 {
            return Err(AppError::MalformedPayload(
                "password must be at least 8 characters",
            ));
        }
        update.insert("passwordHash", hash_password(&password)?);
    }

    if update.is_empty() {
        return Err(AppError::MalformedPayload("no fields to update"));
    }

    let result = users(&state.db)
        .update_one(doc! { "email": &claims.sub }, doc! { "$set": update }, None)
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("User"));
    }

    Ok(ApiMessage::new("Profile updated"))
}

/// OAuth sign-in is wired up on the storefront but not implemented here.
pub async fn social_stub() -> (StatusCode, Json<ApiMessage>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        ApiMessage::new("Social login is not available yet"),
    )
}

pub async fn list_users(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let all: Vec<User> = users(&state.db)
        .find(None, None)
        .await?
        .try_collect()
        .await?;

    Ok(Json(all.iter().map(PublicUser::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::{SignupRequest, validate_signup};

    fn payload(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(validate_signup(&payload("Asha", "asha@example.com", "longenough")).is_ok());
    }

    #[test]
    fn test_rejects_blank_name() {
        assert!(validate_signup(&payload("   ", "asha@example.com", "longenough")).is_err());
    }

    #[test]
    fn test_rejects_bad_email() {
        assert!(validate_signup(&payload("Asha", "not-an-email", "longenough")).is_err());
    }

    #[test]
    fn test_rejects_short_password() {
        assert!(validate_signup(&payload("Asha", "asha@example.com", "short")).is_err());
    }
}
