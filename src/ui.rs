use crate::models::Tab;
use crate::page::{PanelContent, escape_html};
use crate::state::UiState;
use chrono::Local;

enum Input {
    Number { min: Option<&'static str>, step: &'static str },
    Text,
    Checkbox,
    Select(&'static [(&'static str, &'static str)]),
}

struct Field {
    name: &'static str,
    label: &'static str,
    default: &'static str,
    input: Input,
}

const fn number(name: &'static str, label: &'static str, default: &'static str) -> Field {
    Field {
        name,
        label,
        default,
        input: Input::Number { min: Some("0"), step: "any" },
    }
}

const fn signed(name: &'static str, label: &'static str, default: &'static str) -> Field {
    Field {
        name,
        label,
        default,
        input: Input::Number { min: None, step: "any" },
    }
}

const BOND_FIELDS: &[Field] = &[
    number("principal", "Principal (TWD)", "1000000"),
    number("interest_rate", "Interest rate (%)", "2.5"),
    number("years", "Years", "5"),
    number("inflation_rate", "Inflation rate (%)", "2.0"),
    Field {
        name: "is_compound",
        label: "Compound interest",
        default: "true",
        input: Input::Checkbox,
    },
];

const ETF_FIELDS: &[Field] = &[
    number("initial_amount", "Initial amount (TWD)", "100000"),
    number("monthly_amount", "Monthly contribution (TWD)", "10000"),
    number("dividend_yield", "Dividend yield (%)", "3.0"),
    signed("price_growth", "Annual price growth (%)", "5.0"),
    number("years", "Years", "10"),
];

const HOUSE_FIELDS: &[Field] = &[
    number("house_price", "House price (TWD)", "10000000"),
    number("down_payment", "Down payment (TWD)", "2000000"),
    number("loan_rate", "Loan rate (%)", "2.0"),
    number("loan_years", "Loan term (years)", "20"),
    signed("appreciation_rate_a", "Scenario A total appreciation (%)", "40"),
    signed("appreciation_rate_b", "Scenario B total appreciation (%)", "60"),
    number("annual_cost", "Annual holding cost (TWD)", "50000"),
    number("simulation_years", "Simulation years", "10"),
    Field {
        name: "scenario",
        label: "Scenario",
        default: "A",
        input: Input::Select(&[("A", "A: sell early"), ("B", "B: hold until the loan is repaid")]),
    },
];

const STOCK_FIELDS: &[Field] = &[
    number("initial_amount", "Initial amount (TWD)", "2000000"),
    number("monthly_amount", "Yearly contribution (TWD)", "200000"),
    signed("expected_return", "Expected annual return (%)", "12"),
    number("volatility", "Volatility (%)", "15"),
    number("years", "Years", "10"),
    number("simulations", "Simulations", "10000"),
];

const GOAL_FIELDS: &[Field] = &[
    Field {
        name: "goal_name",
        label: "Goal name",
        default: "Retirement fund",
        input: Input::Text,
    },
    number("target_amount", "Target amount (TWD, optional)", "10000000"),
    number("initial_amount", "Initial amount (TWD)", "1000000"),
    number("monthly_amount", "Monthly contribution (TWD)", "30000"),
    number("investment_period", "Investment period (years)", "20"),
    Field {
        name: "risk_tolerance",
        label: "Risk tolerance",
        default: "medium",
        input: Input::Select(&[("low", "Low"), ("medium", "Medium"), ("high", "High")]),
    },
    number("stock_allocation", "Stocks (%)", "60"),
    number("bond_allocation", "Bonds (%)", "20"),
    number("etf_allocation", "ETFs (%)", "15"),
    number("deposit_allocation", "Deposits (%)", "5"),
];

fn fields(tab: Tab) -> &'static [Field] {
    match tab {
        Tab::Bond => BOND_FIELDS,
        Tab::Etf => ETF_FIELDS,
        Tab::House => HOUSE_FIELDS,
        Tab::Stock => STOCK_FIELDS,
        Tab::Goal => GOAL_FIELDS,
    }
}

pub fn render_index(state: &UiState) -> String {
    let active = state.active_tab();

    let buttons: String = Tab::ALL
        .into_iter()
        .map(|tab| {
            let class = if tab == active { "tab active" } else { "tab" };
            format!(
                r#"<form method="post" action="/tabs/{id}"><button class="{class}" type="submit" data-tab="{id}" role="tab" aria-selected="{}">{}</button></form>"#,
                tab == active,
                tab.label(),
                id = tab.id(),
            )
        })
        .collect();

    let panels: String = Tab::ALL
        .into_iter()
        .map(|tab| render_tab_content(state, tab, tab == active))
        .collect();

    let loading_class = if state.page().is_loading() { "loading show" } else { "loading" };

    // panels carry backend text, so they go in last
    INDEX_HTML
        .replace("{{LOADING_CLASS}}", loading_class)
        .replace("{{RENDERED_AT}}", &Local::now().format("%H:%M:%S").to_string())
        .replace("{{TABS}}", &buttons)
        .replace("{{PANELS}}", &panels)
}

fn render_tab_content(state: &UiState, tab: Tab, active: bool) -> String {
    let inputs: String = fields(tab).iter().map(|field| render_field(tab, field)).collect();
    let required = tab.required_fields();

    let container_id = tab.result_container();
    let container = state.page().container(&container_id);
    let (result_class, result_html) = match container {
        Some(container) if container.visible => ("result show", container.html()),
        Some(container) => ("result", container.html()),
        None => ("result", String::new()),
    };

    // the projection belongs to a rendered goal result, never to an error or empty panel
    let has_result = container.is_some_and(|c| matches!(c.content, PanelContent::Rendered(_)));
    let chart = match (tab, state.chart()) {
        (Tab::Goal, Some(chart)) if has_result => format!(
            r#"<div class="chart-card">{}{}</div>"#,
            chart.legend_html(),
            chart.render_svg()
        ),
        _ => String::new(),
    };

    let form = format!(
        r#"<form id="{id}-form" class="calc-form" method="post" action="/calculate/{id}">{inputs}<button class="btn-submit" type="submit">Calculate</button></form>"#,
        id = tab.id(),
    );
    // browsers enforce required fields before the request leaves the page
    let form = required.iter().fold(form, |form, name| {
        form.replace(&format!(r#"name="{name}""#), &format!(r#"name="{name}" required"#))
    });

    format!(
        r#"<section id="{id}" class="tab-content{active}" role="tabpanel">{form}<div id="{container_id}" class="{result_class}">{result_html}</div>{chart}</section>"#,
        id = tab.id(),
        active = if active { " active" } else { "" },
    )
}

fn render_field(tab: Tab, field: &Field) -> String {
    let id = format!("{}-{}", tab.id(), field.name.replace('_', "-"));
    let control = match &field.input {
        Input::Number { min, step } => format!(
            r#"<input id="{id}" type="number" name="{}" value="{}" step="{step}"{} />"#,
            field.name,
            field.default,
            min.map(|m| format!(r#" min="{m}""#)).unwrap_or_default()
        ),
        Input::Text => format!(
            r#"<input id="{id}" type="text" name="{}" value="{}" maxlength="100" />"#,
            field.name,
            escape_html(field.default)
        ),
        Input::Checkbox => format!(
            r#"<input id="{id}" type="checkbox" name="{}" value="{}" checked />"#,
            field.name, field.default
        ),
        Input::Select(options) => {
            let options: String = options
                .iter()
                .map(|(value, label)| {
                    let selected = if *value == field.default { " selected" } else { "" };
                    format!(r#"<option value="{value}"{selected}>{label}</option>"#)
                })
                .collect();
            format!(r#"<select id="{id}" name="{}">{options}</select>"#, field.name)
        }
    };
    format!(r#"<label class="field" for="{id}"><span>{}</span>{control}</label>"#, field.label)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Investment Simulator</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f0;
      --bg-2: #c9e3d6;
      --ink: #23302b;
      --accent: #2f8f6b;
      --accent-2: #2f4858;
      --negative: #c63b2b;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e4efe9 60%, #f4f7f5 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f6a65;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tabs form {
      margin: 0;
    }

    .tab {
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font: inherit;
      font-weight: 600;
      background: transparent;
      color: #6b645d;
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .tab-content {
      display: none;
      gap: 20px;
    }

    .tab-content.active {
      display: grid;
    }

    .calc-form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 14px;
    }

    .field {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #5f6a65;
    }

    .field input, .field select {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    .btn-submit {
      align-self: end;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font: inherit;
      font-weight: 600;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    .result {
      display: none;
    }

    .result.show {
      display: grid;
      gap: 16px;
    }

    .result-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 12px;
    }

    .result-item {
      background: white;
      border-radius: 16px;
      padding: 14px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 6px;
    }

    .result-item .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #8b857d;
    }

    .result-item .value {
      font-size: 1.3rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .positive {
      color: var(--accent) !important;
    }

    .negative {
      color: var(--negative) !important;
    }

    .message {
      padding: 14px 16px;
      border-radius: 14px;
    }

    .error-message {
      background: #fbe9e6;
      color: var(--negative);
    }

    .success-message {
      background: #e3f4ec;
      color: var(--accent);
    }

    .recommendations li {
      margin-bottom: 10px;
    }

    .priority-high .rec-type {
      color: var(--negative);
      font-weight: 600;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    #goal-chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke-width: 3;
    }

    .series-value { stroke: var(--accent); color: var(--accent); }
    .series-investment { stroke: var(--accent-2); color: var(--accent-2); }
    .series-return { stroke: #e0a03a; color: #e0a03a; }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .chart-legend {
      display: flex;
      gap: 16px;
      list-style: none;
      padding: 0;
      margin: 0 0 8px;
      font-size: 0.85rem;
    }

    .loading {
      display: none;
      color: #6b645d;
    }

    .loading.show {
      display: block;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.85rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Investment Simulator</h1>
      <p class="subtitle">Bonds, ETFs, property, stocks and long-term goals, calculated by the simulation API.</p>
    </header>

    <nav class="tabs" role="tablist">{{TABS}}</nav>

    <div id="loading" class="{{LOADING_CLASS}}">Calculating...</div>

    {{PANELS}}

    <p class="hint">Page rendered at {{RENDERED_AT}}. Results stay on each tab until it is recalculated or you switch away from it.</p>
  </main>
</body>
</html>
"#;
