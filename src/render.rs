//! Result templates, one per tab.
//!
//! Backend results are read by field name without schema validation. A
//! missing or non-numeric field renders as `N/A`; optional sections render
//! only when their field is present and non-empty.

use serde_json::Value;
use std::fmt::Write;

use crate::format::{format_currency, format_number, format_percentage};
use crate::models::Tab;
use crate::page::escape_html;

pub fn render_result(tab: Tab, result: &Value) -> String {
    match tab {
        Tab::Bond => render_bond(result),
        Tab::Etf => render_etf(result),
        Tab::House => render_house(result),
        Tab::Stock => render_stock(result),
        Tab::Goal => render_goal(result),
    }
}

fn num(result: &Value, field: &str) -> Option<f64> {
    result.get(field).and_then(Value::as_f64)
}

fn text<'a>(result: &'a Value, field: &str) -> Option<&'a str> {
    result.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Presentation class for a signed figure. The number itself is untouched.
fn sign_class(value: Option<f64>) -> &'static str {
    match value {
        Some(v) if v > 0.0 => "positive",
        Some(v) if v < 0.0 => "negative",
        _ => "neutral",
    }
}

enum Fmt {
    Currency,
    Percent,
    Number(u32),
}

struct Grid {
    html: String,
}

impl Grid {
    fn new(title: &str) -> Self {
        Self {
            html: format!(
                r#"<div class="result-section"><h3>{}</h3><div class="result-grid">"#,
                escape_html(title)
            ),
        }
    }

    fn row(mut self, label: &str, value: Option<f64>, fmt: Fmt) -> Self {
        self.push(label, value, fmt, "");
        self
    }

    fn signed(mut self, label: &str, value: Option<f64>, fmt: Fmt) -> Self {
        self.push(label, value, fmt, sign_class(value));
        self
    }

    fn text(mut self, label: &str, value: &str) -> Self {
        let _ = write!(
            self.html,
            r#"<div class="result-item"><span class="label">{}</span><span class="value">{}</span></div>"#,
            escape_html(label),
            escape_html(value)
        );
        self
    }

    fn push(&mut self, label: &str, value: Option<f64>, fmt: Fmt, class: &str) {
        let formatted = match fmt {
            Fmt::Currency => format_currency(value),
            Fmt::Percent => format_percentage(value, 2),
            Fmt::Number(decimals) => format_number(value, decimals),
        };
        let _ = write!(
            self.html,
            r#"<div class="result-item"><span class="label">{}</span><span class="value {class}">{formatted}</span></div>"#,
            escape_html(label)
        );
    }

    fn finish(mut self) -> String {
        self.html.push_str("</div></div>");
        self.html
    }
}

fn render_bond(r: &Value) -> String {
    Grid::new("Bond / Deposit Result")
        .row("Final value", num(r, "final_value"), Fmt::Currency)
        .row("Real value (after inflation)", num(r, "real_value"), Fmt::Currency)
        .signed("Nominal annual return", num(r, "nominal_return"), Fmt::Percent)
        .signed("Real annual return", num(r, "real_return"), Fmt::Percent)
        .signed("Total interest", num(r, "total_interest"), Fmt::Currency)
        .signed("Inflation impact", num(r, "inflation_impact"), Fmt::Currency)
        .finish()
}

fn render_etf(r: &Value) -> String {
    let mut html = Grid::new("ETF Investment Result")
        .row("Final value", num(r, "final_value"), Fmt::Currency)
        .row("Total investment", num(r, "total_investment"), Fmt::Currency)
        .signed("Profit", num(r, "profit"), Fmt::Currency)
        .signed("ROI", num(r, "roi"), Fmt::Percent)
        .signed("Annualized return", num(r, "annualized_return"), Fmt::Percent)
        .signed("IRR", num(r, "irr"), Fmt::Percent)
        .finish();
    html.push_str(
        &Grid::new("Return Breakdown")
            .signed("Dividend income", num(r, "dividend_income"), Fmt::Currency)
            .row("Dividend share", num(r, "dividend_ratio"), Fmt::Percent)
            .signed("Capital gain", num(r, "capital_gain"), Fmt::Currency)
            .row("Capital gain share", num(r, "capital_gain_ratio"), Fmt::Percent)
            .finish(),
    );
    html
}

fn render_house(r: &Value) -> String {
    let mut summary = Grid::new("House Investment Result");
    if let Some(scenario) = text(r, "scenario") {
        summary = summary.text("Scenario", scenario);
    }
    let mut html = summary
        .row("Actual cash outflow", num(r, "actual_cash_outflow"), Fmt::Currency)
        .row("Sale income", num(r, "actual_sale_income"), Fmt::Currency)
        .row("Current value", num(r, "current_value"), Fmt::Currency)
        .signed("Profit", num(r, "profit"), Fmt::Currency)
        .signed("ROI", num(r, "roi"), Fmt::Percent)
        .signed("Annual return", num(r, "annual_return"), Fmt::Percent)
        .finish();
    html.push_str(
        &Grid::new("Loan Details")
            .row("Loan amount", num(r, "loan_amount"), Fmt::Currency)
            .row("Monthly payment", num(r, "monthly_payment"), Fmt::Currency)
            .row("Loan term (years)", num(r, "loan_years"), Fmt::Number(0))
            .row("Interest paid", num(r, "interest_paid"), Fmt::Currency)
            .row("Total loan payments", num(r, "total_loan_payments"), Fmt::Currency)
            .row("Remaining principal", num(r, "remaining_principal"), Fmt::Currency)
            .row("Holding cost", num(r, "holding_cost"), Fmt::Currency)
            .row("Down payment ratio", num(r, "down_payment_ratio"), Fmt::Percent)
            .row("Leverage ratio", num(r, "leverage_ratio"), Fmt::Number(2))
            .finish(),
    );
    html
}

fn render_stock(r: &Value) -> String {
    let mut html = Grid::new("Monte Carlo Simulation")
        .row("Mean final value", num(r, "mean"), Fmt::Currency)
        .row("5th percentile", num(r, "percentile_5"), Fmt::Currency)
        .row("95th percentile", num(r, "percentile_95"), Fmt::Currency)
        .row("Total investment", num(r, "total_investment"), Fmt::Currency)
        .signed("Mean annual return", num(r, "mean_return"), Fmt::Percent)
        .signed("Worst case (annual)", num(r, "worst_case"), Fmt::Percent)
        .signed("Best case (annual)", num(r, "best_case"), Fmt::Percent)
        .finish();
    html.push_str(
        &Grid::new("Risk")
            .row("Value at risk (5%)", num(r, "value_at_risk"), Fmt::Currency)
            .row("Expected shortfall", num(r, "expected_shortfall"), Fmt::Currency)
            .row("Probability of profit", num(r, "probability_positive"), Fmt::Percent)
            .row("Realized volatility", num(r, "volatility_realized"), Fmt::Percent)
            .row("Simulations", num(r, "simulation_count"), Fmt::Number(0))
            .finish(),
    );
    html
}

fn render_goal(r: &Value) -> String {
    let mut summary = Grid::new("Financial Goal Projection");
    if let Some(goal_name) = text(r, "goal_name") {
        summary = summary.text("Goal", goal_name);
    }
    summary = summary
        .row("Final amount", num(r, "final_amount"), Fmt::Currency)
        .row("Total investment", num(r, "total_investment"), Fmt::Currency)
        .signed("Total return", num(r, "total_return"), Fmt::Currency)
        .signed("Average annual return", num(r, "average_annual_return"), Fmt::Percent)
        .row("Portfolio risk", num(r, "portfolio_risk"), Fmt::Percent)
        .signed("Risk-adjusted return", num(r, "risk_adjusted_return"), Fmt::Percent);
    if let Some(sharpe) = num(r, "sharpe_ratio") {
        summary = summary.text("Sharpe ratio", &format_number(sharpe, 2));
    }
    let mut html = summary.finish();

    if let Some(analysis) = r.get("goal_analysis").filter(|v| v.is_object()) {
        html.push_str(&render_goal_analysis(analysis));
    }
    if let Some(items) = r.get("recommendations").and_then(Value::as_array) {
        if !items.is_empty() {
            html.push_str(&render_recommendations(items));
        }
    }
    html
}

fn render_goal_analysis(analysis: &Value) -> String {
    let achievable = analysis
        .get("can_achieve_goal")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let verdict = if achievable {
        r#"<p class="goal-verdict positive">On track to reach the goal</p>"#
    } else {
        r#"<p class="goal-verdict negative">Goal not reached with the current plan</p>"#
    };

    let probability = num(analysis, "probability").map(|p| p * 100.0);
    let mut grid = Grid::new("Goal Achievement")
        .row("Probability", probability, Fmt::Percent);
    if !achievable {
        grid = grid
            .row("Shortfall", num(analysis, "shortfall_amount"), Fmt::Currency)
            .row(
                "Required monthly increase",
                num(analysis, "required_monthly_increase"),
                Fmt::Currency,
            );
    }
    let mut html = grid.finish();
    // the verdict goes right under the section heading
    if let Some(pos) = html.find("</h3>") {
        html.insert_str(pos + "</h3>".len(), verdict);
    }
    html
}

/// Renders recommendations ranked by priority (1 = high), keeping backend
/// order among equal priorities.
fn render_recommendations(items: &[Value]) -> String {
    let mut ranked: Vec<&Value> = items.iter().collect();
    ranked.sort_by_key(|item| item.get("priority").and_then(Value::as_u64).unwrap_or(u64::MAX));

    let mut html = String::from(r#"<div class="result-section"><h3>Recommendations</h3><ol class="recommendations">"#);
    for item in ranked {
        let priority = item.get("priority").and_then(Value::as_u64);
        let level = match priority {
            Some(1) => "high",
            Some(2) => "medium",
            _ => "low",
        };
        let _ = write!(
            html,
            r#"<li class="recommendation priority-{level}"><span class="rec-type">{}</span><p>{}</p><p class="rec-impact">{}</p></li>"#,
            escape_html(text(item, "type").unwrap_or("general")),
            escape_html(text(item, "description").unwrap_or_default()),
            escape_html(text(item, "impact").unwrap_or_default()),
        );
    }
    html.push_str("</ol></div>");
    html
}
