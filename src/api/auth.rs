use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, validation};
use crate::api::types::{LoginRequest, SignupRequest};
use crate::auth::Decision;
use crate::services::{LoginResult, Signup, UserView};

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware for the protected routes: validates the
/// bearer token and stashes the claims for handlers. A missing or
/// failing token is `Unauthenticated` (401), which is distinct from an
/// authorization Deny (403) decided later in the handler.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthenticated("Missing bearer token"))?;

    let claims = state.tokens.validate(token)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Turns an authorization decision into the boundary error. Handlers
/// call this before touching any service, so a Deny has no side
/// effects.
pub fn require(decision: Decision) -> Result<(), ApiError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(ApiError::Forbidden("Access denied".to_string())),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    validation::validate_login(&payload)?;

    let result = state.auth.login(&payload.email, &payload.password).await?;

    Ok(Json(ApiResponse::success("Login successful", result)))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    validation::validate_signup(&payload)?;

    let user = state
        .auth
        .signup(Signup {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role_tags: payload.roles,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered successfully", user)),
    ))
}
