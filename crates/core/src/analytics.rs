use crate::traits::AnalyticsSink;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const SEARCH_CATEGORY: &str = "Search";
pub const STARTED_NEW_SEARCH: &str = "Started new search";
pub const LOADED_MORE_RESULTS: &str = "Loaded more search results";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsEvent {
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub emitted_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: None,
            emitted_at: Utc::now(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn search_started(query: &str) -> Self {
        Self::new(SEARCH_CATEGORY, STARTED_NEW_SEARCH).with_label(query)
    }

    pub fn next_batch_requested() -> Self {
        Self::new(SEARCH_CATEGORY, LOADED_MORE_RESULTS)
    }
}

/// Writes events to the `analytics` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn emit(&self, event: AnalyticsEvent) {
        info!(
            target: "analytics",
            category = %event.category,
            action = %event.action,
            label = event.label.as_deref().unwrap_or_default(),
            emitted_at = %event.emitted_at.to_rfc3339(),
            "analytics event"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn emit(&self, _event: AnalyticsEvent) {}
}

impl<T> AnalyticsSink for Arc<T>
where
    T: AnalyticsSink + ?Sized,
{
    fn emit(&self, event: AnalyticsEvent) {
        (**self).emit(event)
    }
}
