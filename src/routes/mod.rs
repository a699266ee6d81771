use axum::routing::{get, post};
use axum::Router;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{cron, events, health_check, organizer, transactions};
use crate::lifecycle::LifecycleService;

#[derive(Clone)]
pub struct AppState {
    pub service: LifecycleService,
}

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route(
            "/transactions",
            post(transactions::create_booking).get(transactions::list_my_transactions),
        )
        .route("/transactions/:id", get(transactions::get_transaction))
        .route(
            "/transactions/:id/payment-proof",
            post(transactions::upload_payment_proof),
        )
        .route(
            "/transactions/:id/approve",
            post(transactions::approve_transaction),
        )
        .route(
            "/transactions/:id/reject",
            post(transactions::reject_transaction),
        )
        .route(
            "/organizer/transactions",
            get(organizer::pending_transactions),
        )
        .route("/cron/expire-transactions", post(cron::expire_transactions))
        .with_state(state)
        .layer(create_cors_layer());

    apply_security_headers(router)
}
