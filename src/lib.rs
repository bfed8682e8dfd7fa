pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod mapping;
pub mod services;
pub mod startup;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::services::orchestrator::PaymentOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub orchestrator: PaymentOrchestrator,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/payments/methods", get(handlers::payments::list_methods))
        .route("/api/payments/create", post(handlers::payments::create_payment))
        .route(
            "/api/payments/status/:transaction_id",
            get(handlers::payments::check_status),
        )
        .route("/api/payments/webhook", post(handlers::payments::update_status))
        .route(
            "/api/payments/pay-simulate/:transaction_id",
            get(handlers::payments::simulate_success),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
