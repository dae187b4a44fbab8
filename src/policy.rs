use crate::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Values the caller expects the provenance to attest to.
///
/// Loaded from JSON with camelCase keys, or built in code:
///
/// ```
/// use provenance_verification::Policy;
///
/// let policy = Policy::new("0ae7e4fa", "github.com/some/repo")
///     .with_builder_id("https://github.com/some/builder@v1")
///     .with_versioned_tag("v1.2")
///     .with_workflow_input("release_version", "v1.2.3");
/// assert_eq!(policy.expected_versioned_tag.as_deref(), Some("v1.2"));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Lower-case hex SHA-256 of the artifact being verified.
    pub expected_digest: String,
    /// `github.com/{org}/{repo}`, with or without scheme.
    pub expected_source_uri: String,
    /// Accept a source material without an `@ref` suffix.
    pub allow_no_material_ref: bool,
    pub expected_builder_id: Option<String>,
    pub expected_branch: Option<String>,
    pub expected_tag: Option<String>,
    /// Semver constraint such as `v1` or `v1.2`.
    pub expected_versioned_tag: Option<String>,
    pub expected_workflow_inputs: BTreeMap<String, String>,
}

impl Policy {
    pub fn new(expected_digest: impl Into<String>, expected_source_uri: impl Into<String>) -> Self {
        Self {
            expected_digest: expected_digest.into(),
            expected_source_uri: expected_source_uri.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn allow_no_material_ref(mut self) -> Self {
        self.allow_no_material_ref = true;
        self
    }

    pub fn with_builder_id(mut self, builder_id: impl Into<String>) -> Self {
        self.expected_builder_id = Some(builder_id.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.expected_branch = Some(branch.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.expected_tag = Some(tag.into());
        self
    }

    pub fn with_versioned_tag(mut self, tag: impl Into<String>) -> Self {
        self.expected_versioned_tag = Some(tag.into());
        self
    }

    pub fn with_workflow_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected_workflow_inputs.insert(key.into(), value.into());
        self
    }
}
