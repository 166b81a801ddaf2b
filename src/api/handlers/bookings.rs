use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Booking,
    error::{AppError, Result},
};

/// Cap on the admin booking listing.
const RECENT_BOOKINGS_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Booking>> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Session ID required".to_string()))?;

    let booking = state
        .bookings
        .find_by_session_id(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(Json(booking))
}

pub async fn list_recent(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<Booking>>> {
    let bookings = state.bookings.list_recent(RECENT_BOOKINGS_LIMIT).await?;
    Ok(Json(bookings))
}
