use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::clients::ViaCepClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AddressService, AuthService, CepService, SeaOrmAddressService, SeaOrmAuthService,
    SeaOrmUserService, UserService, ViaCepService,
};

mod addresses;
pub mod auth;
mod error;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub auth: Arc<dyn AuthService>,

    pub users: Arc<dyn UserService>,

    pub addresses: Arc<dyn AddressService>,
}

/// Builds the state with the real ViaCEP normalizer.
pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let client = ViaCepClient::new(
        &config.viacep.base_url,
        config.viacep.request_timeout_seconds,
    )?;
    let cep: Arc<dyn CepService> = Arc::new(ViaCepService::new(client));

    create_app_state_with_cep(config, cep).await
}

/// Builds the state around an injected normalizer. Exposed so tests can
/// script the external collaborator.
pub async fn create_app_state_with_cep(
    config: Config,
    cep: Arc<dyn CepService>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.security.clone(),
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    store.ensure_seed_data(&config.auth).await?;

    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    ));

    let addresses: Arc<dyn AddressService> =
        Arc::new(SeaOrmAddressService::new(store.clone(), cep.clone()));
    let users: Arc<dyn UserService> = Arc::new(SeaOrmUserService::new(
        store.clone(),
        cep,
        addresses.clone(),
    ));
    let auth: Arc<dyn AuthService> =
        Arc::new(SeaOrmAuthService::new(store.clone(), tokens.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        tokens,
        auth,
        users,
        addresses,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::current_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/password", put(users::update_password))
        .route("/users/{id}/addresses", post(addresses::create_address))
        .route("/users/{id}/addresses", get(addresses::list_addresses))
        .route(
            "/users/{id}/addresses/{address_id}",
            get(addresses::get_address),
        )
        .route(
            "/users/{id}/addresses/{address_id}",
            put(addresses::update_address),
        )
        .route(
            "/users/{id}/addresses/{address_id}",
            delete(addresses::delete_address),
        )
        .route("/addresses", get(addresses::list_all_addresses))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}
