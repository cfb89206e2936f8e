//! User management service

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{validate_pagination, PaginatedResponse, Pagination, SortDirection, User, UserSortField};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// User service for account CRUD
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// User row without password material
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for updating a user; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub password: Option<String>,
}

impl CreateUserInput {
    /// Trim the name and e-mail and lower-case the e-mail
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

impl UpdateUserInput {
    /// Same normalization as on create, for the fields that are present
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            password: self.password,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Listing options
#[derive(Debug, Clone, Copy, Default)]
pub struct ListUsersOptions {
    pub pagination: Pagination,
    pub field: UserSortField,
    pub direction: SortDirection,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a user
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        let input = input.normalized();
        input.validate()?;

        let password_hash = hash_password(&input.password)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Created user {}", row.id);
        Ok(row.into())
    }

    /// List users, one page at a time
    pub async fn list_users(&self, options: ListUsersOptions) -> AppResult<PaginatedResponse<User>> {
        validate_pagination(&options.pagination)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let rows = sqlx::query_as::<_, UserRow>(&list_query(options.field, options.direction))
            .bind(options.pagination.limit as i64)
            .bind(options.pagination.offset())
            .fetch_all(&self.db)
            .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(User::from).collect(),
            options.pagination,
            total.max(0) as u64,
        ))
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(row.into())
    }

    /// Update the given fields of a user
    pub async fn update_user(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        let input = input.normalized();
        input.validate()?;

        let password_hash = input.password.as_deref().map(hash_password).transpose()?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(map_unique_violation)?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(row.into())
    }

    /// Delete a user
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!("Deleted user {}", user_id);
        Ok(())
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Listing query. Column and direction come from closed enums, so the
/// interpolated ORDER BY cannot carry caller text.
fn list_query(field: UserSortField, direction: SortDirection) -> String {
    format!(
        "SELECT id, name, email, created_at, updated_at FROM users \
         ORDER BY {} {}, id ASC LIMIT $1 OFFSET $2",
        field.column(),
        direction.as_sql()
    )
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateEntry("email".to_string())
        }
        _ => AppError::DatabaseError(e),
    }
}
