//! In-memory model of the page's mutable regions.
//!
//! Each tab owns one result container; a single loading indicator is shared
//! by all tabs. The helpers here mirror direct DOM mutation: they replace a
//! container's content and toggle its visibility.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Tab;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PanelContent {
    #[default]
    Empty,
    Error(String),
    Success(String),
    /// Pre-rendered, already escaped result markup.
    Rendered(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub content: PanelContent,
    pub visible: bool,
}

impl Container {
    pub fn html(&self) -> String {
        match &self.content {
            PanelContent::Empty => String::new(),
            PanelContent::Error(message) => format!(
                r#"<div class="message error-message"><strong>Error:</strong> {}</div>"#,
                escape_html(message)
            ),
            PanelContent::Success(message) => format!(
                r#"<div class="message success-message">{}</div>"#,
                escape_html(message)
            ),
            PanelContent::Rendered(markup) => markup.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    containers: BTreeMap<String, Container>,
    loading: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// A page with one empty, hidden result container per tab.
    pub fn new() -> Self {
        let containers = Tab::ALL
            .into_iter()
            .map(|tab| (tab.result_container(), Container::default()))
            .collect();
        Self {
            containers,
            loading: false,
        }
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn show_error(&mut self, id: &str, message: &str) {
        self.replace(id, PanelContent::Error(message.to_string()));
    }

    pub fn show_success(&mut self, id: &str, message: &str) {
        self.replace(id, PanelContent::Success(message.to_string()));
    }

    pub fn show_result(&mut self, id: &str, markup: String) {
        self.replace(id, PanelContent::Rendered(markup));
    }

    pub fn clear_result(&mut self, id: &str) {
        if let Some(container) = self.containers.get_mut(id) {
            *container = Container::default();
        }
    }

    pub fn show_loading(&mut self) {
        self.loading = true;
    }

    pub fn hide_loading(&mut self) {
        self.loading = false;
    }

    // Unknown ids are ignored, like a lookup of a missing element.
    fn replace(&mut self, id: &str, content: PanelContent) {
        if let Some(container) = self.containers.get_mut(id) {
            container.content = content;
            container.visible = true;
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
