use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod booking_repository;
pub mod package_repository;
pub mod user_repository;

pub use booking_repository::SqliteBookingRepository;
pub use package_repository::SqlitePackageRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn admin_exists(&self) -> Result<bool>;
}

#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn create(&self, package: Package) -> Result<Package>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>>;
    /// All packages, newest first.
    async fn list(&self) -> Result<Vec<Package>>;
    /// Merges the provided fields into the stored package and bumps
    /// `updated_at`. Returns None when no package matches the id.
    async fn update(&self, id: Uuid, update: UpdatePackageRequest) -> Result<Option<Package>>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: Booking) -> Result<Booking>;
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Booking>>;
    /// Projects the processor's session state onto the matching booking.
    /// Returns whether a booking matched; a miss is not an error because the
    /// processor, not this table, owns session ids.
    async fn update_session_state(
        &self,
        session_id: &str,
        status: &str,
        payment_status: &str,
    ) -> Result<bool>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Booking>>;
    async fn count(&self) -> Result<i64>;
    async fn count_paid(&self) -> Result<i64>;
    /// Sum of `amount` over paid bookings, in major currency units.
    async fn paid_revenue(&self) -> Result<i64>;
}
