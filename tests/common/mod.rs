//! Fake calculation backend shared by the integration tests.
//!
//! Runs on its own thread and runtime so it outlives any single
//! `#[tokio::test]` runtime.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Principal that makes the fake bond endpoint answer 500 with a `detail`.
pub const OVERLOADED_PRINCIPAL: &str = "500";
/// Principal that makes the fake bond endpoint answer 500 with a non-JSON body.
pub const BROKEN_PRINCIPAL: &str = "501";

#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<(String, Value)>>>);

impl Recorded {
    fn push(&self, endpoint: &str, body: Value) {
        self.0
            .lock()
            .expect("recorder lock")
            .push((endpoint.to_string(), body));
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Value> {
        self.0
            .lock()
            .expect("recorder lock")
            .iter()
            .filter(|(called, _)| called == endpoint)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

pub struct FakeBackend {
    /// Base URL including the `/api/v1` prefix.
    pub base_url: String,
    pub recorded: Recorded,
}

pub static BACKEND: Lazy<FakeBackend> = Lazy::new(start_backend);

fn start_backend() -> FakeBackend {
    let recorded = Recorded::default();
    let state = recorded.clone();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind fake backend");
            tx.send(listener.local_addr().expect("backend addr"))
                .expect("send backend addr");
            axum::serve(listener, backend_router(state))
                .await
                .expect("fake backend");
        });
    });

    let addr = rx.recv().expect("fake backend address");
    FakeBackend {
        base_url: format!("http://{addr}/api/v1"),
        recorded,
    }
}

fn backend_router(recorded: Recorded) -> Router {
    Router::new()
        .route("/api/v1/bond-deposit", post(bond))
        .route("/api/v1/etf-investment", post(etf))
        .route("/api/v1/financial-goal", post(goal))
        .route("/api/v1/stock-simulation", post(stock))
        .route("/api/v1/house-investment", post(house))
        .route("/api/v1/batch-compare", post(batch))
        .route("/api/v1/investment-types", get(investment_types))
        .route("/api/v1/health", get(health))
        .with_state(recorded)
}

async fn bond(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    recorded.push("/bond-deposit", body.clone());
    match body.get("principal").and_then(Value::as_f64) {
        Some(p) if p == 500.0 => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "overloaded" })),
        )
            .into_response(),
        Some(p) if p == 501.0 => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        principal => Json(json!({
            "success": true,
            "final_value": principal.unwrap_or(0.0) * 1.1,
            "real_value": 1021518.28,
            "nominal_return": 2.5,
            "real_return": 0.49,
            "inflation_impact": 109889.76,
            "total_interest": 131408.04,
            "inflation_loss": 109889.76
        }))
        .into_response(),
    }
}

async fn etf(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    recorded.push("/etf-investment", body);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [
                { "loc": ["body", "years"], "msg": "ensure this value is less than or equal to 50", "type": "value_error" }
            ]
        })),
    )
        .into_response()
}

async fn goal(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.push("/financial-goal", body.clone());
    Json(json!({
        "success": true,
        "goal_name": body.get("goal_name").cloned().unwrap_or(Value::Null),
        "final_amount": 12500000.0,
        "total_investment": 8200000.0,
        "total_return": 4300000.0,
        "average_annual_return": 2.62,
        "portfolio_risk": 12.3,
        "risk_adjusted_return": -2.1,
        "sharpe_ratio": 0.45,
        "goal_analysis": {
            "can_achieve_goal": true,
            "probability": 0.8,
            "shortfall_amount": 0.0,
            "required_monthly_increase": 0.0
        },
        "recommendations": [
            { "type": "diversify", "description": "Add bonds", "impact": "Lower risk", "priority": 2 },
            { "type": "increase", "description": "Save more", "impact": "Reach goal sooner", "priority": 1 }
        ],
        "chart_data": {
            "years": [1, 2, 3],
            "portfolio_values": [1100000.0, 1500000.0, 1900000.0],
            "total_investments": [1360000.0, 1720000.0, 2080000.0],
            "returns": [-260000.0, -220000.0, -180000.0]
        }
    }))
}

async fn stock(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.push("/stock-simulation", body);
    Json(json!({ "success": true, "mean": 8742633.0, "value_at_risk": 5234891.0 }))
}

async fn house(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.push("/house-investment", body);
    Json(json!({ "success": true, "scenario": "A", "profit": -1000.0 }))
}

async fn batch(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.push("/batch-compare", body.clone());
    Json(json!({
        "success": true,
        "received": body.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()).unwrap_or_default()
    }))
}

async fn investment_types() -> Json<Value> {
    Json(json!({
        "success": true,
        "investment_types": [
            { "id": "stock", "name": "Stock", "expected_return": "12%", "risk": "high",
              "description": "Equities", "min_amount": 10000.0, "liquidity": "high" }
        ]
    }))
}

/// Records what a GET carried so tests can check no body was sent.
async fn health(State(recorded): State<Recorded>, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    recorded.push(
        "/health",
        json!({ "body_len": body.len(), "content_length": content_length }),
    );
    Json(json!({ "status": "healthy" }))
}

/// Log sink for a thread-scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Captures every event at any level emitted on this thread until the
    /// guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
