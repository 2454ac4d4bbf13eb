pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod paystack;
pub mod services;
pub mod utils;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::auth::ApiKeys;
use crate::services::PaymentService;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub payments: PaymentService,
    pub api_keys: ApiKeys,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/payments/initiate",
            post(handlers::payments::initiate_payment),
        )
        .route(
            "/payments/verify/:reference",
            get(handlers::payments::verify_payment),
        )
        .route(
            "/payments/user/:email",
            get(handlers::payments::get_user_payments),
        )
        .route(
            "/payments/reference/:reference",
            get(handlers::payments::find_payment_by_reference),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
