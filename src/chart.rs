//! Line chart for the financial-goal projection, rendered as inline SVG.

use serde_json::Value;
use std::fmt::Write;

use crate::format::format_number;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 280.0;
const PADDING_X: f64 = 64.0;
const PADDING_Y: f64 = 34.0;
const TOP: f64 = 24.0;
const TICKS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub class: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Identifies this chart instance; a replacement always gets a new handle.
    pub handle: u64,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl LineChart {
    /// Builds a chart from a goal result's `chart_data`.
    ///
    /// Returns `None` unless `chart_data.years` is a non-empty array. Missing
    /// or non-numeric points in a series are plotted as zero.
    pub fn from_goal_result(handle: u64, result: &Value) -> Option<Self> {
        let chart_data = result.get("chart_data")?;
        let years = chart_data.get("years")?.as_array()?;
        if years.is_empty() {
            return None;
        }

        let labels = years
            .iter()
            .map(|year| match year {
                Value::Number(n) => format!("Year {n}"),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>();

        let series_of = |key: &str| -> Vec<f64> {
            let values = chart_data.get(key).and_then(Value::as_array);
            (0..labels.len())
                .map(|i| {
                    values
                        .and_then(|values| values.get(i))
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0)
                })
                .collect()
        };

        Some(Self {
            handle,
            series: vec![
                Series {
                    name: "Portfolio value",
                    class: "series-value",
                    values: series_of("portfolio_values"),
                },
                Series {
                    name: "Total investment",
                    class: "series-investment",
                    values: series_of("total_investments"),
                },
                Series {
                    name: "Cumulative return",
                    class: "series-return",
                    values: series_of("returns"),
                },
            ],
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn render_svg(&self) -> String {
        let all_values = self.series.iter().flat_map(|s| s.values.iter().copied());
        let (mut min, mut max) = all_values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min == max {
            min -= 1.0;
            max += 1.0;
        }

        let range = max - min;
        let count = self.labels.len();
        let x_step = if count > 1 {
            (WIDTH - PADDING_X * 2.0) / (count - 1) as f64
        } else {
            0.0
        };
        let scale_y = (HEIGHT - TOP - PADDING_Y) / range;
        let x = |index: usize| PADDING_X + index as f64 * x_step;
        let y = |value: f64| HEIGHT - PADDING_Y - (value - min) * scale_y;

        let mut svg = format!(
            r#"<svg id="goal-chart" data-chart-handle="{}" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Goal projection chart">"#,
            self.handle
        );

        for tick in 0..=TICKS {
            let value = min + range * tick as f64 / TICKS as f64;
            let y_pos = y(value);
            let _ = write!(
                svg,
                r#"<line class="chart-grid" x1="{PADDING_X}" y1="{y_pos:.2}" x2="{:.2}" y2="{y_pos:.2}" /><text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
                WIDTH - PADDING_X,
                PADDING_X - 8.0,
                y_pos + 4.0,
                format_number(value, 0)
            );
        }

        for series in &self.series {
            let path = series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("{} {:.2} {:.2}", if i == 0 { 'M' } else { 'L' }, x(i), y(*v)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(
                svg,
                r#"<path class="chart-line {}" d="{path}"><title>{}</title></path>"#,
                series.class, series.name
            );
        }

        let label_every = if count > 10 { count.div_ceil(10) } else { 1 };
        for (i, label) in self.labels.iter().enumerate().step_by(label_every) {
            let _ = write!(
                svg,
                r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                x(i),
                HEIGHT - PADDING_Y + 18.0,
                crate::page::escape_html(label)
            );
        }

        svg.push_str("</svg>");
        svg
    }

    pub fn legend_html(&self) -> String {
        let items: String = self
            .series
            .iter()
            .map(|s| format!(r#"<li class="{}">{}</li>"#, s.class, s.name))
            .collect();
        format!(r#"<ul class="chart-legend">{items}</ul>"#)
    }
}
