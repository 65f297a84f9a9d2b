use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::require;
use super::types::{CreateUserRequest, ListParams, PageDto, UpdatePasswordRequest, UpdateUserRequest};
use super::{ApiError, ApiResponse, AppState, validation};
use crate::auth::{Claims, RequiredRole, RoleSet, authorize};
use crate::services::{NewUser, UserView};

/// POST /api/users (admin only).
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    require(authorize(RequiredRole::Admin, None, &claims))?;
    validation::validate_create_user(&payload)?;

    let user = state
        .users
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            roles: RoleSet::new(),
            addresses: payload.addresses.into_iter().map(Into::into).collect(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created successfully", user)),
    ))
}

/// GET /api/users (admin only), paginated and searchable.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<PageDto<UserView>>>, ApiError> {
    require(authorize(RequiredRole::Admin, None, &claims))?;

    let page = state.users.list_users(&params.to_page_request()).await?;

    Ok(Json(ApiResponse::success(
        "Users retrieved successfully",
        PageDto::from(page),
    )))
}

/// GET /api/users/me. Identity comes from the claims, not the route.
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    require(authorize(RequiredRole::User, None, &claims))?;

    let user = state.users.get_user(claims.subject_id).await?;

    Ok(Json(ApiResponse::success(
        "User retrieved successfully",
        user,
    )))
}

/// GET /api/users/{id} (admin or self).
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    require(authorize(RequiredRole::User, Some(id), &claims))?;

    let user = state.users.get_user(id).await?;

    Ok(Json(ApiResponse::success(
        "User retrieved successfully",
        user,
    )))
}

/// PUT /api/users/{id} (admin or self).
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    require(authorize(RequiredRole::User, Some(id), &claims))?;
    validation::validate_update_user(&payload)?;

    let user = state
        .users
        .update_profile(id, &payload.name, &payload.email)
        .await?;

    Ok(Json(ApiResponse::success("User updated successfully", user)))
}

/// PUT /api/users/{id}/password (admin or self).
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    require(authorize(RequiredRole::User, Some(id), &claims))?;
    validation::validate_update_password(&payload)?;

    let user = state.users.update_password(id, &payload.password).await?;

    Ok(Json(ApiResponse::success(
        "User password updated successfully",
        user,
    )))
}

/// DELETE /api/users/{id} (admin only).
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require(authorize(RequiredRole::Admin, None, &claims))?;

    state.users.delete_user(id).await?;

    Ok(Json(ApiResponse::success("User deleted successfully", ())))
}
