use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub mod claims;
pub mod dto;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod service;

use gate::GateConfig;
use repo_types::Role;

/// Roles admitted by the gate on the profile-lifecycle routes (admin
/// targets bypass the list entirely).
pub const PROTECTED_ROLES: &[Role] = &[Role::JobSeeker, Role::Admin];

pub fn router(state: AppState) -> Router<AppState> {
    let gate_config = GateConfig::new(state, PROTECTED_ROLES);

    let protected = Router::new()
        .route("/update-user", put(handlers::update_user))
        .route("/delete-user", put(handlers::delete_user))
        .route("/restore-user", put(handlers::restore_user))
        .route_layer(middleware::from_fn_with_state(gate_config, gate::authorize));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", get(handlers::login))
        .route("/restore-password", put(handlers::restore_password))
        .route("/forgot-password", post(handlers::forgot_password))
        // same flow as restore-password, kept under its historical path
        .route("/refresh-tokens", post(handlers::restore_password))
        .merge(protected)
}
