use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::Result,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_packages: i64,
    pub total_bookings: i64,
    pub paid_bookings: i64,
    /// Major currency units, summed over paid bookings.
    pub total_revenue: i64,
    /// Paid/total as a percentage, rounded to one decimal.
    pub conversion_rate: f64,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<DashboardResponse>> {
    let total_packages = state.packages.count().await?;
    let total_bookings = state.bookings.count().await?;
    let paid_bookings = state.bookings.count_paid().await?;
    let total_revenue = state.bookings.paid_revenue().await?;

    let conversion_rate = if total_bookings > 0 {
        (paid_bookings as f64 / total_bookings as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(Json(DashboardResponse {
        total_packages,
        total_bookings,
        paid_bookings,
        total_revenue,
        conversion_rate,
    }))
}
