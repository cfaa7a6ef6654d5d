//! Client for the investment calculation backend.
//!
//! Every call is a single attempt: no retries, no timeout beyond the
//! transport's own. Failures are logged with their endpoint here, so callers
//! only need to display them.

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::error;

use crate::errors::RequestError;
use crate::form::FormObject;
use crate::models::{BatchCompareRequest, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.into(),
        })
    }

    /// Sends one request to `endpoint` and returns the parsed JSON body.
    ///
    /// The body is attached only for non-GET methods that carry a payload.
    pub async fn call(
        &self,
        endpoint: &str,
        data: Option<&Value>,
        method: HttpMethod,
    ) -> Result<Value, RequestError> {
        self.send(endpoint, data, method).await.inspect_err(|err| {
            error!(endpoint, "API request failed: {err}");
        })
    }

    async fn send(
        &self,
        endpoint: &str,
        data: Option<&Value>,
        method: HttpMethod,
    ) -> Result<Value, RequestError> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut request = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        }
        .header(CONTENT_TYPE, "application/json");

        if method != HttpMethod::Get {
            if let Some(body) = data {
                let bytes = serde_json::to_vec(body).map_err(|e| RequestError::new(e.to_string()))?;
                request = request.body(bytes);
            }
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: reqwest::Response) -> Result<Value, RequestError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::new(error_message(status, &body)));
        }
        response.json().await.map_err(RequestError::from)
    }

    async fn post_form(&self, endpoint: &str, data: &FormObject) -> Result<Value, RequestError> {
        let body = serde_json::to_value(data).map_err(|e| RequestError::new(e.to_string()))?;
        self.call(endpoint, Some(&body), HttpMethod::Post).await
    }

    pub async fn calculate_bond_deposit(&self, data: &FormObject) -> Result<Value, RequestError> {
        self.post_form(Tab::Bond.endpoint(), data).await
    }

    pub async fn calculate_etf_investment(&self, data: &FormObject) -> Result<Value, RequestError> {
        self.post_form(Tab::Etf.endpoint(), data).await
    }

    pub async fn calculate_house_investment(&self, data: &FormObject) -> Result<Value, RequestError> {
        self.post_form(Tab::House.endpoint(), data).await
    }

    pub async fn calculate_stock_simulation(&self, data: &FormObject) -> Result<Value, RequestError> {
        self.post_form(Tab::Stock.endpoint(), data).await
    }

    pub async fn calculate_financial_goal(&self, data: &FormObject) -> Result<Value, RequestError> {
        self.post_form(Tab::Goal.endpoint(), data).await
    }

    /// Dispatches to the calculation wrapper of `tab`.
    pub async fn calculate(&self, tab: Tab, data: &FormObject) -> Result<Value, RequestError> {
        match tab {
            Tab::Bond => self.calculate_bond_deposit(data).await,
            Tab::Etf => self.calculate_etf_investment(data).await,
            Tab::House => self.calculate_house_investment(data).await,
            Tab::Stock => self.calculate_stock_simulation(data).await,
            Tab::Goal => self.calculate_financial_goal(data).await,
        }
    }

    pub async fn get_investment_types(&self) -> Result<Value, RequestError> {
        self.call("/investment-types", None, HttpMethod::Get).await
    }

    pub async fn health_check(&self) -> Result<Value, RequestError> {
        self.call("/health", None, HttpMethod::Get).await
    }

    pub async fn batch_compare(&self, request: &BatchCompareRequest) -> Result<Value, RequestError> {
        let body = serde_json::to_value(request).map_err(|e| RequestError::new(e.to_string()))?;
        self.call("/batch-compare", Some(&body), HttpMethod::Post).await
    }
}

/// Message for a non-success response.
///
/// Uses the body's `detail` when it is JSON: a string as-is, a validation
/// error list as its joined `msg` entries, anything else as JSON text.
/// Otherwise falls back to `HTTP <status>: <reason>`.
pub fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("detail").cloned());

    match detail {
        Some(Value::String(message)) => message,
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| match item.get("msg").and_then(Value::as_str) {
                Some(msg) => msg.to_string(),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::Null) | None => fallback_message(status),
        Some(other) => other.to_string(),
    }
}

fn fallback_message(status: reqwest::StatusCode) -> String {
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}
