use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{Booking, CustomerInfo},
    error::{AppError, Result},
    payments::{CreateSessionParams, Currency, PaymentGateway},
};

const BOOKING_CURRENCY: Currency = Currency::INR;

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    #[serde(rename = "packageId", default)]
    pub package_id: Option<String>,
    #[serde(rename = "customerInfo", default)]
    pub customer_info: Option<CustomerInfo>,
    #[serde(rename = "customAmount", default)]
    pub custom_amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    pub url: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub status: String,
    pub payment_status: String,
    /// Major currency units; the processor reports minor units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: HashMap<String, String>,
}

pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>> {
    let gateway = payment_gateway(&state)?;

    // Amount comes from the referenced package or an explicit custom amount;
    // it is fixed here and never recomputed.
    let (amount, product_name, package_id) =
        if let Some(raw_id) = request.package_id.as_deref().filter(|s| !s.is_empty()) {
            let id = Uuid::parse_str(raw_id)
                .map_err(|_| AppError::NotFound("Package not found".to_string()))?;
            let package = state
                .packages
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
            (package.price, package.title, Some(package.id))
        } else if let Some(amount) = request.custom_amount.filter(|amount| *amount > 0) {
            (amount, "Custom Package".to_string(), None)
        } else {
            return Err(AppError::BadRequest(
                "Package ID or custom amount required".to_string(),
            ));
        };

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(&state.settings.server.base_url)
        .to_string();

    let customer = request.customer_info.clone().unwrap_or_default();
    let mut metadata = HashMap::new();
    metadata.insert(
        "packageId".to_string(),
        package_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "custom".to_string()),
    );
    metadata.insert(
        "customerName".to_string(),
        customer.name.clone().unwrap_or_default(),
    );
    metadata.insert(
        "customerPhone".to_string(),
        customer.phone.clone().unwrap_or_default(),
    );

    let session = gateway
        .create_checkout_session(CreateSessionParams {
            amount_minor: amount * 100,
            currency: BOOKING_CURRENCY,
            product_name,
            customer_email: customer.email.clone(),
            success_url: format!("{}/booking/success?session_id={{CHECKOUT_SESSION_ID}}", origin),
            cancel_url: format!("{}/booking/cancel", origin),
            metadata,
        })
        .await?;

    let booking = Booking::pending(
        session.session_id.clone(),
        package_id,
        amount,
        BOOKING_CURRENCY.to_string(),
        request.customer_info,
    );
    state.bookings.create(booking).await?;

    Ok(Json(CreateCheckoutResponse {
        url: session.url,
        session_id: session.session_id,
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>> {
    let gateway = payment_gateway(&state)?;

    let session = gateway.retrieve_session(&session_id).await?;

    // Last write wins; the processor is the source of truth for these fields.
    let matched = state
        .bookings
        .update_session_state(&session_id, &session.status, &session.payment_status)
        .await?;
    if !matched {
        tracing::debug!("No booking recorded for checkout session {}", session_id);
    }

    Ok(Json(SessionStatusResponse {
        status: session.status,
        payment_status: session.payment_status,
        amount_total: session.amount_total.map(|amount| amount / 100),
        currency: session.currency,
        metadata: session.metadata,
    }))
}

fn payment_gateway(state: &AppState) -> Result<&dyn PaymentGateway> {
    state
        .payments
        .as_deref()
        .ok_or_else(|| AppError::Internal("Payment gateway not configured".to_string()))
}
