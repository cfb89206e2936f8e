//! User management HTTP handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{PaginatedResponse, Pagination, SortDirection, User, UserSortField};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::user::{CreateUserInput, ListUsersOptions, UpdateUserInput, UserService};
use crate::AppState;

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub field: Option<UserSortField>,
    pub direction: Option<SortDirection>,
}

impl From<ListUsersQuery> for ListUsersOptions {
    fn from(query: ListUsersQuery) -> Self {
        let defaults = Pagination::default();
        ListUsersOptions {
            pagination: Pagination {
                page: query.page.unwrap_or(defaults.page),
                limit: query.limit.unwrap_or(defaults.limit),
            },
            field: query.field.unwrap_or_default(),
            direction: query.direction.unwrap_or_default(),
        }
    }
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    input: Result<Json<CreateUserInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let service = UserService::new(state.db);
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    let Query(query) = query?;
    let service = UserService::new(state.db);
    let users = service.list_users(query.into()).await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<User>> {
    let Path(user_id) = path?;
    let service = UserService::new(state.db);
    let user = service.get_user(user_id).await?;
    Ok(Json(user))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    input: Result<Json<UpdateUserInput>, JsonRejection>,
) -> AppResult<Json<User>> {
    let Path(user_id) = path?;
    let Json(input) = input?;
    let service = UserService::new(state.db);
    let user = service.update_user(user_id, input).await?;
    Ok(Json(user))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(user_id) = path?;
    let service = UserService::new(state.db);
    service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
