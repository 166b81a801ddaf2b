use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::Role,
    error::{AppError, Result},
};

/// Issued tokens stay valid for a week; clients are expected to log in again
/// after that.
pub const TOKEN_TTL_DAYS: i64 = 7;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Returns false on mismatch and on an unparseable stored hash alike; callers
/// cannot tell the two apart.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub role: Role,
    pub exp: i64,
}

/// Signs and verifies the stateless session tokens. There is no server-side
/// session table; the signature and the `exp` claim are the whole contract.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String> {
        let claims = TokenClaims {
            user_id,
            role,
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Returns None for missing, malformed, expired, and badly signed tokens
    /// alike; the cause is deliberately not surfaced.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}
