use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Role, User},
    error::{AppError, Result},
    repository::UserRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    name: String,
    created_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            password_hash: row.password_hash,
            role: Self::parse_role(&row.role)?,
            name: row.name,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn parse_role(s: &str) -> Result<Role> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(AppError::Database(format!("Invalid role: {}", s))),
        }
    }

    fn role_to_str(role: &Role) -> &'static str {
        match role {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: User) -> Result<User> {
        let id_str = user.id.to_string();
        let role_str = Self::role_to_str(&user.role);
        let created_at_naive = user.created_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(role_str)
        .bind(&user.name)
        .bind(created_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_email(&user.email).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, role, name, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }

    async fn admin_exists(&self) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(Self::role_to_str(&Role::Admin))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }
}
