use super::common::{WORKFLOW_DISPATCH_EVENT, refs_from_source_uri};
use super::{
    DigestSet, InputValue, Provenance, Statement, Subject, WorkflowInputs, non_empty_subjects,
};
use crate::{ProvenanceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const PREDICATE_TYPE: &str = "https://slsa.dev/provenance/v1";

/// Build types whose parameters follow the GitHub Actions workflow layout.
pub const GITHUB_WORKFLOW_BUILD_TYPES: &[&str] = &[
    "https://actions.github.io/buildtypes/workflow/v1",
    "https://slsa-framework.github.io/github-actions-buildtypes/workflow/v1",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "E: Deserialize<'de>, I: Deserialize<'de> + Default")
)]
pub struct PredicateV1<E, I> {
    pub build_definition: BuildDefinition<E, I>,
    pub run_details: RunDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "E: Deserialize<'de>, I: Deserialize<'de> + Default")
)]
pub struct BuildDefinition<E, I> {
    pub build_type: String,
    pub external_parameters: E,
    #[serde(default)]
    pub internal_parameters: I,
    #[serde(default)]
    pub resolved_dependencies: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub digest: DigestSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDetails {
    pub builder: Builder,
    #[serde(default)]
    pub metadata: BuildMetadata,
    #[serde(default)]
    pub byproducts: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Builder {
    pub id: String,
    #[serde(default)]
    pub version: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    #[serde(default)]
    pub invocation_id: String,
    pub started_on: Option<DateTime<Utc>>,
    pub finished_on: Option<DateTime<Utc>>,
}

/// Workflow file whose run produced the build.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowReference {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowExternalParameters {
    pub workflow: WorkflowReference,
    #[serde(default)]
    pub inputs: Option<BTreeMap<String, InputValue>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowInternalParameters {
    #[serde(default)]
    pub github: GitHubContext,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubContext {
    #[serde(default)]
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_environment: Option<String>,
}

pub type WorkflowPredicate = PredicateV1<WorkflowExternalParameters, WorkflowInternalParameters>;

/// SLSA v1.0 provenance for GitHub Actions workflow builds.
#[derive(Debug, Clone)]
pub struct ProvenanceV1 {
    statement: Statement<WorkflowPredicate>,
}

impl ProvenanceV1 {
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let statement: Statement<WorkflowPredicate> =
            serde_json::from_slice(payload).map_err(|e| {
                ProvenanceError::InvalidDssePayload(format!(
                    "failed to parse SLSA v1.0 statement: {}",
                    e
                ))
            })?;
        Ok(Self { statement })
    }

    pub fn predicate(&self) -> &WorkflowPredicate {
        &self.statement.predicate
    }

    fn workflow(&self) -> &WorkflowReference {
        &self.predicate().build_definition.external_parameters.workflow
    }
}

/// First resolved dependency is the source that was built.
pub(crate) fn first_dependency_uri(dependencies: &[ResourceDescriptor]) -> Result<String> {
    let dependency = dependencies
        .first()
        .ok_or_else(|| ProvenanceError::InvalidDssePayload("empty resolvedDependencies".into()))?;
    if dependency.uri.is_empty() {
        return Err(ProvenanceError::MalformedUri("empty resolved dependency uri".into()));
    }
    Ok(dependency.uri.clone())
}

impl Provenance for ProvenanceV1 {
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
        let workflow = self.workflow();
        if workflow.repository.is_empty() || workflow.git_ref.is_empty() {
            return Err(ProvenanceError::MalformedUri(
                "workflow repository or ref is empty".into(),
            ));
        }
        Ok(format!("{}@{}", workflow.repository, workflow.git_ref))
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
        Ok(self.workflow().path.clone())
    }

    fn system_parameters(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(&self.predicate().build_definition.internal_parameters) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ProvenanceError::InvalidDssePayload(
                "internal parameters are not an object".into(),
            )),
            Err(e) => Err(ProvenanceError::InvalidDssePayload(format!(
                "internal parameters: {}",
                e
            ))),
        }
    }

    fn workflow_inputs(&self) -> Result<WorkflowInputs> {
        let definition = &self.predicate().build_definition;
        let event_name = &definition.internal_parameters.github.event_name;
        if event_name != WORKFLOW_DISPATCH_EVENT {
            return Err(ProvenanceError::MismatchWorkflowInputs(format!(
                "expected '{}' trigger, got '{}'",
                WORKFLOW_DISPATCH_EVENT, event_name
            )));
        }
        Ok(definition.external_parameters.inputs.clone().unwrap_or_default())
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
