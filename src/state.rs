//! UI state owned by the controller.
//!
//! Submissions are split into `begin` and `finish` so the lock can be
//! released while the backend call is outstanding. Each `begin` bumps the
//! tab's generation; a response whose ticket is older than the tab's current
//! generation is dropped instead of overwriting the newer one.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::chart::LineChart;
use crate::errors::{SubmitError, ValidationError};
use crate::form::{FormData, FormObject, FormValue, form_data_to_object, validate_form_data};
use crate::models::{ChartSnapshot, PanelSnapshot, Tab, UiSnapshot};
use crate::page::Page;
use crate::render::render_result;

pub const ALLOCATION_FIELDS: [&str; 4] = [
    "stock_allocation",
    "bond_allocation",
    "etf_allocation",
    "deposit_allocation",
];
const ALLOCATION_TOLERANCE: f64 = 0.01;

/// Proof that a submission was started; handed back to [`UiState::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub tab: Tab,
    pub generation: u64,
}

#[derive(Debug)]
pub struct Submission {
    pub ticket: Ticket,
    pub request: FormObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    Failed,
    Superseded,
}

#[derive(Debug)]
pub struct UiState {
    active_tab: Tab,
    page: Page,
    chart: Option<LineChart>,
    next_chart_handle: u64,
    generations: BTreeMap<Tab, u64>,
    in_flight: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            active_tab: Tab::Bond,
            page: Page::new(),
            chart: None,
            next_chart_handle: 1,
            generations: Tab::ALL.into_iter().map(|tab| (tab, 0)).collect(),
            in_flight: 0,
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn chart(&self) -> Option<&LineChart> {
        self.chart.as_ref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Activates `tab`, clearing the previously active tab's result panel.
    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        self.page.clear_result(&self.active_tab.result_container());
        self.active_tab = tab;
    }

    /// Starts a submission: shows the loading indicator, coerces the form and
    /// runs the client-side checks. On a validation failure the error is
    /// already displayed in the tab's panel.
    pub fn begin(&mut self, tab: Tab, form: &FormData) -> Result<Submission, ValidationError> {
        self.page.show_loading();
        let generation = {
            let entry = self.generations.entry(tab).or_default();
            *entry += 1;
            *entry
        };

        match prepare_request(tab, form) {
            Ok(request) => {
                self.in_flight += 1;
                Ok(Submission {
                    ticket: Ticket { tab, generation },
                    request,
                })
            }
            Err(err) => {
                if self.in_flight == 0 {
                    self.page.hide_loading();
                }
                self.page.show_error(&tab.result_container(), &err.to_string());
                Err(err)
            }
        }
    }

    /// Applies the outcome of a backend call started by [`UiState::begin`].
    pub fn finish(&mut self, ticket: Ticket, outcome: &Result<Value, SubmitError>) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.page.hide_loading();
        }

        let current = self.generations.get(&ticket.tab).copied().unwrap_or_default();
        if ticket.generation < current {
            debug!(
                tab = %ticket.tab,
                generation = ticket.generation,
                current,
                "dropping superseded response"
            );
            return Completion::Superseded;
        }

        let container = ticket.tab.result_container();
        match outcome {
            Ok(result) => {
                self.page.show_result(&container, render_result(ticket.tab, result));
                if ticket.tab == Tab::Goal {
                    self.replace_chart(result);
                }
                Completion::Rendered
            }
            Err(err) => {
                self.page.show_error(&container, &err.to_string());
                Completion::Failed
            }
        }
    }

    /// Releases a submission whose backend call was abandoned before
    /// [`UiState::finish`] ran. The tab's panel is left as it was.
    pub fn cancel(&mut self, ticket: Ticket) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.page.hide_loading();
        }
        debug!(
            tab = %ticket.tab,
            generation = ticket.generation,
            "submission cancelled"
        );
    }

    fn replace_chart(&mut self, result: &Value) {
        let Some(chart) = LineChart::from_goal_result(self.next_chart_handle, result) else {
            return;
        };
        self.next_chart_handle += 1;
        if let Some(previous) = self.chart.replace(chart) {
            debug!(handle = previous.handle, "destroyed previous goal chart");
        }
    }

    pub fn snapshot(&self) -> UiSnapshot {
        UiSnapshot {
            active_tab: self.active_tab,
            loading: self.page.is_loading(),
            panels: Tab::ALL
                .into_iter()
                .filter_map(|tab| {
                    let container = tab.result_container();
                    self.page.container(&container).map(|c| PanelSnapshot {
                        tab,
                        visible: c.visible,
                        content: c.content.clone(),
                        container,
                    })
                })
                .collect(),
            chart: self.chart.as_ref().map(|chart| ChartSnapshot {
                handle: chart.handle,
                points: chart.len(),
            }),
        }
    }
}

/// Builds the request body for `tab` and runs the client-side checks.
pub fn prepare_request(tab: Tab, form: &FormData) -> Result<FormObject, ValidationError> {
    let mut request = form_data_to_object(form);

    if tab == Tab::Bond {
        let checked = form
            .get("is_compound")
            .is_some_and(|value| !value.is_empty() && value != "false");
        request.insert("is_compound".to_string(), FormValue::Bool(checked));
    }

    let missing = validate_form_data(&request, tab.required_fields());
    if !missing.is_empty() {
        return Err(ValidationError::from_messages(missing));
    }

    if tab == Tab::Goal {
        check_allocation(&request)?;
    }

    Ok(request)
}

/// Allocations must sum to 100 within 0.01. Missing or non-numeric
/// allocations count as zero.
pub fn check_allocation(request: &FormObject) -> Result<(), ValidationError> {
    let total: f64 = ALLOCATION_FIELDS
        .iter()
        .map(|field| request.get(*field).and_then(FormValue::as_f64).unwrap_or(0.0))
        .sum();

    if (total - 100.0).abs() > ALLOCATION_TOLERANCE {
        return Err(ValidationError::new(format!(
            "Investment allocation must total 100%, currently {total}%"
        )));
    }
    Ok(())
}
