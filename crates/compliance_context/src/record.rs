use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::ContextError;

/// One compliance framework entry (GDPR, HIPAA, ISO 27001, ...).
///
/// Only `name` and `description` are expected on every record; the rest is
/// optional and simply scores nothing when absent. Unknown keys are kept in
/// `extra` so they still reach the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ComplianceRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    pub fn domains(&self) -> &[String] {
        self.domains.as_deref().unwrap_or(&[])
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

pub fn parse_records(raw: &str) -> Result<Vec<ComplianceRecord>, ContextError> {
    let val: JsonValue =
        serde_json::from_str(raw).map_err(|e| ContextError::InvalidRecords(e.to_string()))?;
    if !val.is_array() {
        return Err(ContextError::InvalidRecords("expected a JSON array".to_string()));
    }
    serde_json::from_value(val).map_err(|e| ContextError::InvalidRecords(e.to_string()))
}

/// Read and parse a records document. A missing file is reported as
/// `ContextError::Io`; deciding whether that is fatal is up to the caller.
pub fn load_records(path: &Path) -> Result<Vec<ComplianceRecord>, ContextError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ContextError::Io(format!("{}: {e}", path.display())))?;
    let records = parse_records(&raw)?;
    tracing::debug!(path = %path.display(), count = records.len(), "parsed compliance records");
    Ok(records)
}

/// Distinct categories in first-seen order.
pub fn categories(records: &[ComplianceRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cat in records.iter().filter_map(|r| r.category.as_ref()) {
        if !out.iter().any(|c| c == cat) {
            out.push(cat.clone());
        }
    }
    out
}
