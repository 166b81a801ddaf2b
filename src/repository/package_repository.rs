use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Package, UpdatePackageRequest},
    error::{AppError, Result},
    repository::PackageRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct PackageRow {
    id: String,
    title: String,
    description: String,
    price: i64,
    duration: String,
    image: String,
    highlights: String,
    rating: f64,
    category: String,
    featured: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePackageRepository {
    pool: SqlitePool,
}

impl SqlitePackageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_package(row: PackageRow) -> Result<Package> {
        Ok(Package {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            price: row.price,
            duration: row.duration,
            image: row.image,
            highlights: serde_json::from_str(&row.highlights)
                .map_err(|e| AppError::Database(e.to_string()))?,
            rating: row.rating,
            category: row.category,
            featured: row.featured != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn highlights_to_json(highlights: &[String]) -> Result<String> {
        serde_json::to_string(highlights).map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl PackageRepository for SqlitePackageRepository {
    async fn create(&self, package: Package) -> Result<Package> {
        let id_str = package.id.to_string();
        let highlights_json = Self::highlights_to_json(&package.highlights)?;
        let featured_int = if package.featured { 1i32 } else { 0i32 };
        let created_at_naive = package.created_at.naive_utc();
        let updated_at_naive = package.updated_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO packages (
                id, title, description, price, duration, image,
                highlights, rating, category, featured, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&package.title)
        .bind(&package.description)
        .bind(package.price)
        .bind(&package.duration)
        .bind(&package.image)
        .bind(&highlights_json)
        .bind(package.rating)
        .bind(&package.category)
        .bind(featured_int)
        .bind(created_at_naive)
        .bind(updated_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(package.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created package".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, PackageRow>(
            r#"
            SELECT id, title, description, price, duration, image,
                   highlights, rating, category, featured, created_at, updated_at
            FROM packages
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_package(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Package>> {
        let rows = sqlx::query_as::<_, PackageRow>(
            r#"
            SELECT id, title, description, price, duration, image,
                   highlights, rating, category, featured, created_at, updated_at
            FROM packages
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_package).collect()
    }

    async fn update(&self, id: Uuid, update: UpdatePackageRequest) -> Result<Option<Package>> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let id_str = id.to_string();
        let now_naive = Utc::now().naive_utc();
        let highlights_json = match &update.highlights {
            Some(highlights) => Some(Self::highlights_to_json(highlights)?),
            None => None,
        };
        let featured_int = update.featured.map(|f| if f { 1i32 } else { 0i32 });

        sqlx::query(
            r#"
            UPDATE packages
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                price = COALESCE(?, price),
                duration = COALESCE(?, duration),
                image = COALESCE(?, image),
                highlights = COALESCE(?, highlights),
                rating = COALESCE(?, rating),
                category = COALESCE(?, category),
                featured = COALESCE(?, featured),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.price)
        .bind(&update.duration)
        .bind(&update.image)
        .bind(&highlights_json)
        .bind(update.rating)
        .bind(&update.category)
        .bind(featured_int)
        .bind(now_naive)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated package".to_string())
        })?))
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM packages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
