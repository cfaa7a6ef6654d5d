use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::page::PanelContent;

/// One of the five calculation workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Bond,
    Etf,
    House,
    Stock,
    Goal,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Bond, Tab::Etf, Tab::House, Tab::Stock, Tab::Goal];

    pub fn id(self) -> &'static str {
        match self {
            Tab::Bond => "bond",
            Tab::Etf => "etf",
            Tab::House => "house",
            Tab::Stock => "stock",
            Tab::Goal => "goal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Bond => "Bond / Deposit",
            Tab::Etf => "ETF",
            Tab::House => "House",
            Tab::Stock => "Stock",
            Tab::Goal => "Financial Goal",
        }
    }

    /// Identifier of the container the tab renders into.
    pub fn result_container(self) -> String {
        format!("{}-result", self.id())
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Tab::Bond => "/bond-deposit",
            Tab::Etf => "/etf-investment",
            Tab::House => "/house-investment",
            Tab::Stock => "/stock-simulation",
            Tab::Goal => "/financial-goal",
        }
    }

    /// Fields the backend rejects a request without.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Tab::Bond => &["principal", "interest_rate", "years"],
            Tab::Etf => &[
                "initial_amount",
                "monthly_amount",
                "dividend_yield",
                "price_growth",
                "years",
            ],
            Tab::House => &[
                "house_price",
                "down_payment",
                "loan_rate",
                "loan_years",
                "appreciation_rate_a",
                "appreciation_rate_b",
                "annual_cost",
                "simulation_years",
            ],
            Tab::Stock => &[
                "initial_amount",
                "monthly_amount",
                "expected_return",
                "volatility",
                "years",
            ],
            Tab::Goal => &[
                "goal_name",
                "initial_amount",
                "monthly_amount",
                "investment_period",
            ],
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTab(pub String);

impl fmt::Display for UnknownTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tab '{}'", self.0)
    }
}

impl std::error::Error for UnknownTab {}

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id() == s)
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

/// Body of the backend's `/batch-compare` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCompareRequest {
    pub bond_request: Value,
    pub etf_request: Value,
    pub stock_request: Value,
}

#[derive(Debug, Serialize)]
pub struct PanelSnapshot {
    pub tab: Tab,
    pub container: String,
    pub visible: bool,
    pub content: PanelContent,
}

#[derive(Debug, Serialize)]
pub struct ChartSnapshot {
    pub handle: u64,
    pub points: usize,
}

#[derive(Debug, Serialize)]
pub struct UiSnapshot {
    pub active_tab: Tab,
    pub loading: bool,
    pub panels: Vec<PanelSnapshot>,
    pub chart: Option<ChartSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: Option<Value>,
    pub backend_error: Option<String>,
}
