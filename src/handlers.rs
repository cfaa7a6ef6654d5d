use crate::controller::InvestmentController;
use crate::errors::{AppError, SubmitError};
use crate::form::FormData;
use crate::models::{BatchCompareRequest, HealthResponse, Tab, UiSnapshot};
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use serde_json::Value;
use tracing::info;

pub async fn index(State(controller): State<InvestmentController>) -> Html<String> {
    let ui = controller.ui().lock().await;
    Html(render_index(&ui))
}

pub async fn switch_tab(
    State(controller): State<InvestmentController>,
    Path(tab): Path<String>,
) -> Result<Redirect, AppError> {
    let tab = parse_tab(&tab)?;
    controller.switch_tab(tab).await;
    Ok(Redirect::to("/"))
}

pub async fn calculate(
    State(controller): State<InvestmentController>,
    Path(tab): Path<String>,
    Form(form): Form<FormData>,
) -> Result<Redirect, AppError> {
    let tab = parse_tab(&tab)?;
    match controller.submit(tab, &form).await {
        Ok(completion) => info!(%tab, ?completion, "calculation finished"),
        // already shown in the panel; request errors were logged by the client
        // and local validation failures are not logged at all
        Err(SubmitError::Request(_) | SubmitError::Validation(_)) => {}
    }
    Ok(Redirect::to("/"))
}

pub async fn get_ui(State(controller): State<InvestmentController>) -> Json<UiSnapshot> {
    Json(controller.snapshot().await)
}

pub async fn investment_types(
    State(controller): State<InvestmentController>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(controller.api().get_investment_types().await?))
}

pub async fn health(State(controller): State<InvestmentController>) -> Json<HealthResponse> {
    let (backend, backend_error) = match controller.api().health_check().await {
        Ok(value) => (Some(value), None),
        Err(err) => (None, Some(err.message)),
    };
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        backend,
        backend_error,
    })
}

pub async fn batch_compare(
    State(controller): State<InvestmentController>,
    Json(request): Json<BatchCompareRequest>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(controller.api().batch_compare(&request).await?))
}

fn parse_tab(raw: &str) -> Result<Tab, AppError> {
    raw.parse::<Tab>().map_err(|err| AppError::not_found(err.to_string()))
}
