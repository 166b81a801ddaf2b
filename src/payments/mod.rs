use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

pub mod stripe_gateway;

pub use stripe_gateway::StripeGateway;
pub use stripe::Currency;

/// Thin seam over the payment processor: one call out per operation, no
/// retries, no caching. Persistence of bookings stays with the caller so a
/// processor-side session can exist without a local record (reconcilable
/// later through the session poll).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<CheckoutSessionDetails>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSessionState>;
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    /// Minor currency units (paise), converted at the handler boundary.
    pub amount_minor: i64,
    pub currency: Currency,
    pub product_name: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionDetails {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionState {
    pub status: String,
    pub payment_status: String,
    /// Minor currency units as reported by the processor.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: HashMap<String, String>,
}
