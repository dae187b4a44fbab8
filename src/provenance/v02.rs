use super::common::{
    LOWERCASE_KEYS, as_object, branch_from_environment, tag_from_environment,
    workflow_inputs_from_environment,
};
use super::{DigestSet, Provenance, Statement, Subject, WorkflowInputs, non_empty_subjects};
use crate::{ProvenanceError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const PREDICATE_TYPE: &str = "https://slsa.dev/provenance/v0.2";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredicateV02 {
    pub builder: Builder,
    #[serde(default)]
    pub build_type: String,
    #[serde(default)]
    pub invocation: Invocation,
    #[serde(default)]
    pub build_config: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Builder {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default)]
    pub config_source: ConfigSource,
    #[serde(default)]
    pub parameters: Option<Value>,
    /// GitHub context of the run, keyed `github_*`.
    #[serde(default)]
    pub environment: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub digest: DigestSet,
    #[serde(default)]
    pub entry_point: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, rename = "buildInvocationID")]
    pub build_invocation_id: String,
    pub build_started_on: Option<DateTime<Utc>>,
    pub build_finished_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completeness: Completeness,
    #[serde(default)]
    pub reproducible: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Completeness {
    #[serde(default)]
    pub parameters: bool,
    #[serde(default)]
    pub environment: bool,
    #[serde(default)]
    pub materials: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub digest: DigestSet,
}

/// SLSA v0.2 provenance as produced by the GitHub generators.
#[derive(Debug, Clone)]
pub struct ProvenanceV02 {
    statement: Statement<PredicateV02>,
}

impl ProvenanceV02 {
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let statement: Statement<PredicateV02> = serde_json::from_slice(payload).map_err(|e| {
            ProvenanceError::InvalidDssePayload(format!(
                "failed to parse SLSA v0.2 statement: {}",
                e
            ))
        })?;
        Ok(Self { statement })
    }

    pub fn predicate(&self) -> &PredicateV02 {
        &self.statement.predicate
    }

    fn environment(&self) -> Result<&Map<String, Value>> {
        let env = self
            .predicate()
            .invocation
            .environment
            .as_ref()
            .ok_or_else(|| {
                ProvenanceError::InvalidDssePayload("no invocation environment".into())
            })?;
        as_object(env, "invocation environment")
    }
}

impl Provenance for ProvenanceV02 {
    fn predicate_type(&self) -> &str {
        &self.statement.predicate_type
    }

    fn builder_id(&self) -> Result<String> {
        Ok(self.predicate().builder.id.clone())
    }

    fn source_uri(&self) -> Result<String> {
        let material = self
            .predicate()
            .materials
            .first()
            .ok_or_else(|| ProvenanceError::InvalidDssePayload("no material".into()))?;
        if material.uri.is_empty() {
            return Err(ProvenanceError::MalformedUri("empty material uri".into()));
        }
        Ok(material.uri.clone())
    }

    fn trigger_uri(&self) -> Result<String> {
        Ok(self.predicate().invocation.config_source.uri.clone())
    }

    fn subjects(&self) -> Result<&[Subject]> {
        non_empty_subjects(&self.statement.subject)
    }

    fn branch(&self) -> Result<String> {
        branch_from_environment(self.environment()?, &LOWERCASE_KEYS)
    }

    fn tag(&self) -> Result<String> {
        tag_from_environment(self.environment()?, &LOWERCASE_KEYS)
    }

    fn build_trigger_path(&self) -> Result<String> {
        Ok(self.predicate().invocation.config_source.entry_point.clone())
    }

    fn system_parameters(&self) -> Result<Map<String, Value>> {
        self.environment().cloned()
    }

    fn workflow_inputs(&self) -> Result<WorkflowInputs> {
        workflow_inputs_from_environment(self.environment()?, &LOWERCASE_KEYS)
    }

    fn build_invocation_id(&self) -> Result<String> {
        Ok(self
            .predicate()
            .metadata
            .as_ref()
            .map(|m| m.build_invocation_id.clone())
            .unwrap_or_default())
    }

    fn build_start_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.predicate().metadata.as_ref().and_then(|m| m.build_started_on))
    }

    fn build_finish_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.predicate().metadata.as_ref().and_then(|m| m.build_finished_on))
    }

    fn number_resolved_dependencies(&self) -> Result<usize> {
        Ok(self.predicate().materials.len())
    }
}
