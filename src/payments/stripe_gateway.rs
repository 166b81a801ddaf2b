use std::str::FromStr;

use async_trait::async_trait;
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, CreateCheckoutSessionPaymentMethodTypes,
};

use crate::{
    error::{AppError, Result},
    payments::{
        CheckoutSessionDetails, CheckoutSessionState, CreateSessionParams, PaymentGateway,
    },
};

pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CreateSessionParams,
    ) -> Result<CheckoutSessionDetails> {
        // Checkout session with inline price data; no pre-registered products.
        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.customer_email = request.customer_email.as_deref();
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: request.currency,
                unit_amount: Some(request.amount_minor),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.product_name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }]);

        params.metadata = Some(request.metadata.clone());

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        let url = session
            .url
            .ok_or_else(|| AppError::External("No checkout URL returned".to_string()))?;

        Ok(CheckoutSessionDetails {
            session_id: session.id.to_string(),
            url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSessionState> {
        let id = CheckoutSessionId::from_str(session_id)
            .map_err(|e| AppError::External(format!("Invalid checkout session id: {}", e)))?;

        let session = CheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        Ok(CheckoutSessionState {
            // Only sessions created on legacy API versions omit the status.
            status: session
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "open".to_string()),
            payment_status: session.payment_status.to_string(),
            amount_total: session.amount_total,
            currency: session.currency.map(|c| c.to_string()),
            metadata: session.metadata.unwrap_or_default(),
        })
    }
}
