use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use farepool_shared::{Masked, UserSummary};

use crate::error::AppError;
use crate::middleware::auth::RiderClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: Masked<String>,
}

/// POST /v1/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    let user = state
        .users
        .register(&req.phone_number, &req.full_name, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /v1/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .users
        .verify_credentials(&req.phone_number, &req.password)
        .await?
        .ok_or_else(|| {
            AppError::AuthenticationError("Invalid phone number or password".to_string())
        })?;

    let token = mint_token(&state, &user)?;

    Ok(Json(LoginResponse {
        access: token,
        user_id: user.id,
        full_name: user.full_name,
        phone_number: user.phone_number,
    }))
}

/// GET /v1/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
) -> Result<Json<UserSummary>, AppError> {
    let user = state.users.get(claims.user_id()?).await?;
    Ok(Json(user))
}

fn mint_token(state: &AppState, user: &UserSummary) -> Result<String, AppError> {
    let claims = RiderClaims {
        sub: user.id.to_string(),
        phone: user.phone_number.0.clone(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(state.auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}
