//! Machine-readable report summary.

use serde::{Deserialize, Serialize};

/// Per-category item counts, sent in the `X-Report-Summary` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub publications: usize,
    pub projects: usize,
    pub lectures: usize,
    pub workshops: usize,
    pub total_items: usize,

    /// Records left out under the skip policy
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped: usize,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl ReportSummary {
    pub fn new(publications: usize, projects: usize, lectures: usize, workshops: usize) -> Self {
        Self {
            publications,
            projects,
            lectures,
            workshops,
            total_items: publications + projects + lectures + workshops,
            skipped: 0,
        }
    }

    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    /// Compact JSON for the response header
    pub fn to_header_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
