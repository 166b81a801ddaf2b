use axum::{extract::OriginalUri, response::IntoResponse, Json};
use serde_json::json;

use crate::error::AppError;

pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Holiday Explorer API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth/*",
            "packages": "/api/packages",
            "bookings": "/api/bookings",
            "payments": "/api/payments/*",
            "admin": "/api/admin/*"
        }
    }))
}

/// Shared 404 for unknown paths and for known paths hit with a method that
/// has no handler.
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}
