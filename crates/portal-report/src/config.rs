//! Report compiler settings.
//!
//! Resolved once by the caller (server or CLI) and handed to the compiler.
//! Nothing here reads the process environment.

use portal_pptx::SlideContract;
use serde::{Deserialize, Serialize};

/// What to do with a record that cannot be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRecordPolicy {
    /// Abort the report
    #[default]
    Fail,

    /// Leave the record out and count it as skipped
    Skip,
}

/// Department identity used in titles, branding and file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentConfig {
    /// Full name shown on the slides
    #[serde(default = "default_department_name")]
    pub name: String,

    /// Short name used as the file-name prefix and deck title
    #[serde(default = "default_department_short")]
    pub short_name: String,
}

fn default_department_name() -> String {
    "Department of Computer Science and Engineering".to_string()
}

fn default_department_short() -> String {
    "CSE".to_string()
}

impl Default for DepartmentConfig {
    fn default() -> Self {
        Self {
            name: default_department_name(),
            short_name: default_department_short(),
        }
    }
}

/// Report content settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub department: DepartmentConfig,

    /// Prefix for project amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Items of the closing slide's numbered list
    #[serde(default = "default_ongoing_activities")]
    pub ongoing_activities: Vec<String>,

    #[serde(default)]
    pub malformed_records: MalformedRecordPolicy,

    /// Deck styling
    #[serde(default)]
    pub deck: SlideContract,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_ongoing_activities() -> Vec<String> {
    [
        "Curriculum revision and new elective courses",
        "Faculty development programmes",
        "Industry collaboration and consultancy",
        "Student research and innovation projects",
        "Accreditation and quality assurance",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            department: DepartmentConfig::default(),
            currency_symbol: default_currency_symbol(),
            ongoing_activities: default_ongoing_activities(),
            malformed_records: MalformedRecordPolicy::default(),
            deck: SlideContract::default(),
        }
    }
}

impl ReportConfig {
    /// Title of the first slide
    pub fn report_title(&self) -> String {
        format!("{} Activity Report", self.department.short_name)
    }

    pub fn with_policy(mut self, policy: MalformedRecordPolicy) -> Self {
        self.malformed_records = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.malformed_records, MalformedRecordPolicy::Fail);
        assert_eq!(config.ongoing_activities.len(), 5);
        assert_eq!(config.report_title(), "CSE Activity Report");
    }

    #[test]
    fn test_partial_deserialize() {
        let json = r#"{
            "department": {"name": "Department of Electrical Engineering", "short_name": "EE"},
            "malformed_records": "skip"
        }"#;

        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.department.short_name, "EE");
        assert_eq!(config.malformed_records, MalformedRecordPolicy::Skip);
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.deck.meta.locale, "en-US");
    }
}
