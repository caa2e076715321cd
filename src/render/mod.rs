//! Pure projections from records to HTML fragments, plus the full-list
//! renderer that pushes them into a container.
//!
//! There is no diffing: every render replaces the container contents.

pub mod rule_changes;
pub mod rules;
pub mod updates;

use crate::util::escape_html;

/// Receives the complete contents of a list container.
pub trait ViewSink {
    fn replace_contents(&mut self, html: &str);
}

impl ViewSink for String {
    fn replace_contents(&mut self, html: &str) {
        self.clear();
        self.push_str(html);
    }
}

/// Keeps every write, newest last.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub writes: Vec<String>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }
}

impl ViewSink for RecordingSink {
    fn replace_contents(&mut self, html: &str) {
        self.writes.push(html.to_string());
    }
}

/// Placeholder shown instead of an empty list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: Option<&'static str>,
}

impl EmptyState {
    pub fn to_html(&self) -> String {
        let hint = self
            .hint
            .map(|h| format!("<p>{}</p>", escape_html(h)))
            .unwrap_or_default();
        format!(
            r#"<div class="empty-state"><h3>{}</h3>{hint}</div>"#,
            escape_html(self.title)
        )
    }
}

/// What a render produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Empty(EmptyState),
    Items(Vec<String>),
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    pub fn to_html(&self) -> String {
        match self {
            Self::Empty(state) => state.to_html(),
            Self::Items(fragments) => fragments.concat(),
        }
    }
}

/// Projects a collection into a list container.
pub struct ListRenderer<R> {
    empty: EmptyState,
    project: fn(&R) -> String,
}

impl<R> ListRenderer<R> {
    pub const fn new(empty: EmptyState, project: fn(&R) -> String) -> Self {
        Self { empty, project }
    }

    /// Empty state for no records, else one fragment per record in order.
    pub fn view(&self, records: &[R]) -> ListView {
        if records.is_empty() {
            ListView::Empty(self.empty)
        } else {
            ListView::Items(records.iter().map(self.project).collect())
        }
    }

    /// Replaces the container contents wholesale and returns what was shown.
    pub fn render(&self, records: &[R], sink: &mut dyn ViewSink) -> ListView {
        let view = self.view(records);
        sink.replace_contents(&view.to_html());
        tracing::debug!(count = records.len(), "Rendered list");
        view
    }
}
