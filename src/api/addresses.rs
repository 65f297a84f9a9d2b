use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::require;
use super::types::{AddressRequest, ListParams, PageDto};
use super::{ApiError, ApiResponse, AppState, validation};
use crate::auth::{Claims, RequiredRole, authorize};
use crate::services::AddressView;

/// POST /api/users/{user_id}/addresses (admin or owner).
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
    Json(payload): Json<AddressRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AddressView>>), ApiError> {
    require(authorize(RequiredRole::User, Some(user_id), &claims))?;
    validation::validate_address(&payload)?;

    let address = state
        .addresses
        .create_address(user_id, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Address created successfully", address)),
    ))
}

/// GET /api/users/{user_id}/addresses (admin or owner), paginated.
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<PageDto<AddressView>>>, ApiError> {
    require(authorize(RequiredRole::User, Some(user_id), &claims))?;

    let page = state
        .addresses
        .list_addresses(user_id, &params.to_page_request())
        .await?;

    Ok(Json(ApiResponse::success(
        "Addresses retrieved successfully",
        PageDto::from(page),
    )))
}

/// GET /api/users/{user_id}/addresses/{address_id} (admin or owner).
pub async fn get_address(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((user_id, address_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<AddressView>>, ApiError> {
    require(authorize(RequiredRole::User, Some(user_id), &claims))?;

    let address = state.addresses.get_address(user_id, address_id).await?;

    Ok(Json(ApiResponse::success(
        "Address retrieved successfully",
        address,
    )))
}

/// PUT /api/users/{user_id}/addresses/{address_id} (admin or owner).
pub async fn update_address(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((user_id, address_id)): Path<(i64, i64)>,
    Json(payload): Json<AddressRequest>,
) -> Result<Json<ApiResponse<AddressView>>, ApiError> {
    require(authorize(RequiredRole::User, Some(user_id), &claims))?;
    validation::validate_address(&payload)?;

    let address = state
        .addresses
        .update_address(user_id, address_id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(
        "Address updated successfully",
        address,
    )))
}

/// DELETE /api/users/{user_id}/addresses/{address_id} (admin or owner).
pub async fn delete_address(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((user_id, address_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require(authorize(RequiredRole::User, Some(user_id), &claims))?;

    state.addresses.delete_address(user_id, address_id).await?;

    Ok(Json(ApiResponse::success(
        "Address deleted successfully",
        (),
    )))
}

/// GET /api/addresses (admin only), global paginated listing.
pub async fn list_all_addresses(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<PageDto<AddressView>>>, ApiError> {
    require(authorize(RequiredRole::Admin, None, &claims))?;

    let page = state
        .addresses
        .list_all_addresses(&params.to_page_request())
        .await?;

    Ok(Json(ApiResponse::success(
        "Addresses retrieved successfully",
        PageDto::from(page),
    )))
}
