use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::api::ApiClient;
use crate::errors::SubmitError;
use crate::form::FormData;
use crate::models::{Tab, UiSnapshot};
use crate::state::{Completion, Ticket, UiState};

/// Drives tab switching and the submit, load, render cycle.
#[derive(Clone)]
pub struct InvestmentController {
    api: ApiClient,
    ui: Arc<Mutex<UiState>>,
}

impl InvestmentController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            ui: Arc::new(Mutex::new(UiState::new())),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn ui(&self) -> &Arc<Mutex<UiState>> {
        &self.ui
    }

    pub async fn switch_tab(&self, tab: Tab) {
        self.ui.lock().await.switch_tab(tab);
    }

    pub async fn snapshot(&self) -> UiSnapshot {
        self.ui.lock().await.snapshot()
    }

    /// Submits `form` for `tab`.
    ///
    /// The outcome is rendered into the tab's result panel before this
    /// returns; the returned value only reports what happened.
    pub async fn submit(&self, tab: Tab, form: &FormData) -> Result<Completion, SubmitError> {
        let submission = self.ui.lock().await.begin(tab, form)?;
        let pending = PendingTicket::new(Arc::clone(&self.ui), submission.ticket);

        // the lock is not held while the backend works
        let outcome = self
            .api
            .calculate(tab, &submission.request)
            .await
            .map_err(SubmitError::from);

        let completion = self.ui.lock().await.finish(submission.ticket, &outcome);
        pending.disarm();
        outcome.map(|_| completion)
    }
}

/// Cancels its ticket when dropped before [`PendingTicket::disarm`], so a
/// request abandoned mid-call (client disconnect) still leaves the in-flight
/// count.
struct PendingTicket {
    ui: Arc<Mutex<UiState>>,
    ticket: Option<Ticket>,
}

impl PendingTicket {
    fn new(ui: Arc<Mutex<UiState>>, ticket: Ticket) -> Self {
        Self {
            ui,
            ticket: Some(ticket),
        }
    }

    fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for PendingTicket {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        if let Ok(mut ui) = self.ui.try_lock() {
            ui.cancel(ticket);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let ui = Arc::clone(&self.ui);
                handle.spawn(async move {
                    ui.lock().await.cancel(ticket);
                });
            }
            Err(_) => warn!(tab = %ticket.tab, "no runtime to release cancelled submission"),
        }
    }
}
