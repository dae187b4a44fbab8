//! Provenance produced by the slsa-github-generator delegator ("bring your
//! own builder"). The caller-defined parameters are free-form JSON, so every
//! field is checked where it is read.

use super::common::{
    UPPERCASE_KEYS, as_object, refs_from_source_uri, workflow_inputs_from_environment,
};
use super::v1::{PredicateV1, first_dependency_uri};
use super::{Provenance, Statement, Subject, WorkflowInputs, non_empty_subjects};
use crate::{ProvenanceError, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub const BYOB_BUILD_TYPE: &str =
    "https://github.com/slsa-framework/slsa-github-generator/delegator-generic@v0";

/// Legacy generic workflow build type, read with the same free-form layout.
pub const GENERIC_GHA_BUILD_TYPE: &str =
    "https://github.com/Attestations/GitHubActionsWorkflow@v1";

/// Build types decoded by [`ByobProvenanceV1`].
pub const DELEGATED_BUILD_TYPES: &[&str] = &[BYOB_BUILD_TYPE, GENERIC_GHA_BUILD_TYPE];

pub type ByobPredicate = PredicateV1<Value, Value>;

/// The `workflow` entry of the external parameters.
struct TriggerInfo<'a> {
    repository: &'a str,
    git_ref: &'a str,
    path: &'a str,
}

#[derive(Debug, Clone)]
pub struct ByobProvenanceV1 {
    statement: Statement<ByobPredicate>,
}

impl ByobProvenanceV1 {
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let statement: Statement<ByobPredicate> = serde_json::from_slice(payload).map_err(|e| {
            ProvenanceError::InvalidDssePayload(format!(
                "failed to parse SLSA v1.0 delegated statement: {}",
                e
            ))
        })?;
        Ok(Self { statement })
    }

    pub fn predicate(&self) -> &ByobPredicate {
        &self.statement.predicate
    }

    fn internal_parameters(&self) -> Result<&Map<String, Value>> {
        as_object(
            &self.predicate().build_definition.internal_parameters,
            "internal parameters",
        )
    }

    fn trigger_info(&self) -> Result<TriggerInfo<'_>> {
        let external = as_object(
            &self.predicate().build_definition.external_parameters,
            "external parameters",
        )?;
        let workflow = external.get("workflow").ok_or_else(|| {
            ProvenanceError::InvalidDssePayload("no workflow in external parameters".into())
        })?;
        let workflow = as_object(workflow, "external parameters workflow")?;

        let git_ref = get_validated_key(workflow, "ref").map_err(ProvenanceError::MalformedUri)?;
        let repository =
            get_validated_key(workflow, "repository").map_err(ProvenanceError::MalformedUri)?;
        let path =
            get_validated_key(workflow, "path").map_err(ProvenanceError::InvalidDssePayload)?;

        Ok(TriggerInfo {
            repository,
            git_ref,
            path,
        })
    }
}

/// Non-empty string at `key`; the error is a bare message so callers can
/// pick the error kind.
fn get_validated_key<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a str, String> {
    let value = map.get(key).ok_or_else(|| format!("no '{}' in workflow", key))?;
    let value = value
        .as_str()
        .ok_or_else(|| format!("workflow '{}' is not a string: {}", key, value))?;
    if value.is_empty() {
        return Err(format!("empty workflow '{}'", key));
    }
    Ok(value)
}

impl Provenance for ByobProvenanceV1 {
    fn predicate_type(&self) -> &str {
        &self.statement.predicate_type
    }

    fn builder_id(&self) -> Result<String> {
        Ok(self.predicate().run_details.builder.id.clone())
    }

    fn source_uri(&self) -> Result<String> {
        first_dependency_uri(&self.predicate().build_definition.resolved_dependencies)
    }

    fn trigger_uri(&self) -> Result<String> {
        let info = self.trigger_info()?;
        Ok(format!("{}@{}", info.repository, info.git_ref))
    }

    fn subjects(&self) -> Result<&[Subject]> {
        non_empty_subjects(&self.statement.subject)
    }

    fn branch(&self) -> Result<String> {
        Ok(refs_from_source_uri(&self.source_uri()?)?.0)
    }

    fn tag(&self) -> Result<String> {
        Ok(refs_from_source_uri(&self.source_uri()?)?.1)
    }

    fn build_trigger_path(&self) -> Result<String> {
        Ok(self.trigger_info()?.path.to_string())
    }

    fn system_parameters(&self) -> Result<Map<String, Value>> {
        self.internal_parameters().cloned()
    }

    fn workflow_inputs(&self) -> Result<WorkflowInputs> {
        workflow_inputs_from_environment(self.internal_parameters()?, &UPPERCASE_KEYS)
    }

    fn build_invocation_id(&self) -> Result<String> {
        Ok(self.predicate().run_details.metadata.invocation_id.clone())
    }

    fn build_start_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.predicate().run_details.metadata.started_on)
    }

    fn build_finish_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.predicate().run_details.metadata.finished_on)
    }

    fn number_resolved_dependencies(&self) -> Result<usize> {
        Ok(self.predicate().build_definition.resolved_dependencies.len())
    }
}
