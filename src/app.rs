use crate::controller::InvestmentController;
use crate::handlers;
use axum::{routing::{get, post}, Router};

pub fn router(controller: InvestmentController) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tabs/:tab", post(handlers::switch_tab))
        .route("/calculate/:tab", post(handlers::calculate))
        .route("/api/ui", get(handlers::get_ui))
        .route("/api/investment-types", get(handlers::investment_types))
        .route("/api/health", get(handlers::health))
        .route("/api/batch-compare", post(handlers::batch_compare))
        .with_state(controller)
}
