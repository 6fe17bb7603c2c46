use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One backed-up package as persisted in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub repo: Option<String>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>, repo: Option<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            repo,
        }
    }

    /// Builds a record from a parsed package descriptor.
    ///
    /// Returns `None` unless both `name` and `version` are non-empty strings.
    pub fn from_descriptor(descriptor: &Value) -> Option<Self> {
        let name = non_empty_str(descriptor.get("name"))?;
        let version = non_empty_str(descriptor.get("version"))?;
        let repo = descriptor.get("repository").and_then(repository_url);

        Some(Self::new(name, version, repo))
    }
}

// npm descriptors carry either `"repository": "<url>"` or `{ "type": .., "url": .. }`.
fn repository_url(repository: &Value) -> Option<String> {
    match repository {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(fields) => non_empty_str(fields.get("url")).map(str::to_string),
        _ => None,
    }
}

pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
