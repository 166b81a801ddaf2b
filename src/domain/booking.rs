use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status starts at `pending`; after that both status fields mirror
/// whatever the payment processor reports, so they stay plain strings rather
/// than an enum of our own invention.
pub const BOOKING_STATUS_PENDING: &str = "pending";
pub const PAYMENT_STATUS_UNPAID: &str = "unpaid";
pub const PAYMENT_STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "packageId")]
    pub package_id: Option<Uuid>,
    pub amount: i64,
    pub currency: String,
    #[serde(rename = "customerInfo")]
    pub customer_info: Option<CustomerInfo>,
    pub status: String,
    #[serde(rename = "paymentStatus")]
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn pending(
        session_id: String,
        package_id: Option<Uuid>,
        amount: i64,
        currency: String,
        customer_info: Option<CustomerInfo>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session_id,
            package_id,
            amount,
            currency,
            customer_info,
            status: BOOKING_STATUS_PENDING.to_string(),
            payment_status: PAYMENT_STATUS_UNPAID.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
