use std::sync::Arc;

use crate::{
    auth::TokenService,
    config::Settings,
    payments::PaymentGateway,
    repository::{BookingRepository, PackageRepository, UserRepository},
};

/// Everything a handler can reach. Constructed once in the process entry
/// point and cloned per request; there is no other shared state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub packages: Arc<dyn PackageRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub tokens: Arc<TokenService>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        packages: Arc<dyn PackageRepository>,
        bookings: Arc<dyn BookingRepository>,
        tokens: Arc<TokenService>,
        payments: Option<Arc<dyn PaymentGateway>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            users,
            packages,
            bookings,
            tokens,
            payments,
            settings,
        }
    }
}
