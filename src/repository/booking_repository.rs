use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Booking, CustomerInfo, PAYMENT_STATUS_PAID},
    error::{AppError, Result},
    repository::BookingRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct BookingRow {
    id: String,
    session_id: String,
    package_id: Option<String>,
    amount: i64,
    currency: String,
    customer_info: Option<String>,
    status: String,
    payment_status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_booking(row: BookingRow) -> Result<Booking> {
        let package_id = match row.package_id {
            Some(raw) => {
                Some(Uuid::parse_str(&raw).map_err(|e| AppError::Database(e.to_string()))?)
            }
            None => None,
        };
        let customer_info: Option<CustomerInfo> = match row.customer_info {
            Some(raw) => {
                Some(serde_json::from_str(&raw).map_err(|e| AppError::Database(e.to_string()))?)
            }
            None => None,
        };

        Ok(Booking {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            session_id: row.session_id,
            package_id,
            amount: row.amount,
            currency: row.currency,
            customer_info,
            status: row.status,
            payment_status: row.payment_status,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create(&self, booking: Booking) -> Result<Booking> {
        let id_str = booking.id.to_string();
        let package_id_str = booking.package_id.map(|id| id.to_string());
        let customer_info_json = match &booking.customer_info {
            Some(info) => {
                Some(serde_json::to_string(info).map_err(|e| AppError::Database(e.to_string()))?)
            }
            None => None,
        };
        let created_at_naive = booking.created_at.naive_utc();
        let updated_at_naive = booking.updated_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, session_id, package_id, amount, currency,
                customer_info, status, payment_status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&booking.session_id)
        .bind(&package_id_str)
        .bind(booking.amount)
        .bind(&booking.currency)
        .bind(&customer_info_json)
        .bind(&booking.status)
        .bind(&booking.payment_status)
        .bind(created_at_naive)
        .bind(updated_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_session_id(&booking.session_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created booking".to_string()))
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, session_id, package_id, amount, currency,
                   customer_info, status, payment_status, created_at, updated_at
            FROM bookings
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_booking(r)?)),
            None => Ok(None),
        }
    }

    async fn update_session_state(
        &self,
        session_id: &str,
        status: &str,
        payment_status: &str,
    ) -> Result<bool> {
        let now_naive = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?,
                payment_status = ?,
                updated_at = ?
            WHERE session_id = ?
            "#,
        )
        .bind(status)
        .bind(payment_status)
        .bind(now_naive)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, session_id, package_id, amount, currency,
                   customer_info, status, payment_status, created_at, updated_at
            FROM bookings
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count_paid(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE payment_status = ?")
            .bind(PAYMENT_STATUS_PAID)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn paid_revenue(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0) FROM bookings WHERE payment_status = ?",
        )
        .bind(PAYMENT_STATUS_PAID)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
