use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    auth,
    domain::{Role, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}

/// The user as the API exposes it; the password hash never leaves the store.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (email, password) = match (request.email.as_deref(), request.password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ))
        }
    };

    // Unknown email and wrong password answer identically.
    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, user.role)?;

    Ok(Json(LoginResponse {
        user: user.into(),
        token,
    }))
}
