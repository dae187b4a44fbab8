//! The canonical read contract over SLSA provenance and its schema adapters.
//!
//! Each predicate generation has its own module that maps the concrete JSON
//! shape onto [`Provenance`]. Verifiers only ever see the trait.

pub mod byob;
mod common;
pub mod v02;
pub mod v1;

use crate::{ProvenanceError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub use byob::ByobProvenanceV1;
pub use v02::ProvenanceV02;
pub use v1::ProvenanceV1;

/// Algorithm name to hex digest, e.g. `sha256 -> 0ae7...`.
pub type DigestSet = BTreeMap<String, String>;

/// Inputs supplied to a manually dispatched workflow run.
pub type WorkflowInputs = BTreeMap<String, InputValue>;

/// An in-toto statement with a typed predicate.
#[derive(Debug, Clone, Deserialize)]
pub struct Statement<P> {
    #[serde(rename = "_type")]
    pub statement_type: String,
    #[serde(default)]
    pub subject: Vec<Subject>,
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
    pub predicate: P,
}

/// An artifact the attestation makes claims about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub digest: DigestSet,
}

/// A scalar workflow input as it was recorded in the provenance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Bool(b) => write!(f, "{}", b),
            InputValue::Number(n) => match n.as_f64() {
                // Integral floats (`1.0`) print like integers.
                Some(x) if n.is_f64() && x.fract() == 0.0 && x.abs() < 1e21 => {
                    write!(f, "{:.0}", x)
                }
                _ => write!(f, "{}", n),
            },
            InputValue::String(s) => f.write_str(s),
        }
    }
}

impl TryFrom<&Value> for InputValue {
    type Error = ProvenanceError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(InputValue::Bool(*b)),
            Value::Number(n) => Ok(InputValue::Number(n.clone())),
            Value::String(s) => Ok(InputValue::String(s.clone())),
            other => Err(ProvenanceError::InvalidDssePayload(format!(
                "workflow input is not a scalar: {}",
                other
            ))),
        }
    }
}

/// Read-only view every provenance schema exposes to the verifiers.
///
/// Accessors fail independently: a document may have a usable builder ID
/// and still be unable to produce a branch.
pub trait Provenance: Send + Sync {
    /// Predicate type URI of the underlying statement.
    fn predicate_type(&self) -> &str;

    /// ID of the builder, including any `@version` suffix.
    fn builder_id(&self) -> Result<String>;

    /// Locator of the source that was built, usually with an `@ref` suffix.
    fn source_uri(&self) -> Result<String>;

    /// Locator of the workflow definition whose run triggered the build.
    fn trigger_uri(&self) -> Result<String>;

    /// Never empty on success.
    fn subjects(&self) -> Result<&[Subject]>;

    /// Fully-qualified branch ref (`refs/heads/...`), or empty.
    fn branch(&self) -> Result<String>;

    /// Fully-qualified tag ref (`refs/tags/...`), or empty.
    fn tag(&self) -> Result<String>;

    /// Path of the workflow file inside the source repository.
    fn build_trigger_path(&self) -> Result<String>;

    fn system_parameters(&self) -> Result<Map<String, Value>>;

    /// Fails with `MismatchWorkflowInputs` when the run was not a manual
    /// dispatch.
    fn workflow_inputs(&self) -> Result<WorkflowInputs>;

    fn build_invocation_id(&self) -> Result<String>;

    fn build_start_time(&self) -> Result<Option<DateTime<Utc>>>;

    fn build_finish_time(&self) -> Result<Option<DateTime<Utc>>>;

    fn number_resolved_dependencies(&self) -> Result<usize>;
}

/// One decoded provenance document, tagged by schema.
#[derive(Debug, Clone)]
pub enum SlsaProvenance {
    V02(ProvenanceV02),
    V1(ProvenanceV1),
    Byob(ByobProvenanceV1),
}

impl SlsaProvenance {
    fn inner(&self) -> &dyn Provenance {
        match self {
            SlsaProvenance::V02(p) => p,
            SlsaProvenance::V1(p) => p,
            SlsaProvenance::Byob(p) => p,
        }
    }

    /// Short schema name for logging.
    pub fn schema_name(&self) -> &'static str {
        match self {
            SlsaProvenance::V02(_) => "SLSA v0.2",
            SlsaProvenance::V1(_) => "SLSA v1.0",
            SlsaProvenance::Byob(_) => "SLSA v1.0 BYOB",
        }
    }
}

impl Provenance for SlsaProvenance {
    fn predicate_type(&self) -> &str {
        self.inner().predicate_type()
    }

    fn builder_id(&self) -> Result<String> {
        self.inner().builder_id()
    }

    fn source_uri(&self) -> Result<String> {
        self.inner().source_uri()
    }

    fn trigger_uri(&self) -> Result<String> {
        self.inner().trigger_uri()
    }

    fn subjects(&self) -> Result<&[Subject]> {
        self.inner().subjects()
    }

    fn branch(&self) -> Result<String> {
        self.inner().branch()
    }

    fn tag(&self) -> Result<String> {
        self.inner().tag()
    }

    fn build_trigger_path(&self) -> Result<String> {
        self.inner().build_trigger_path()
    }

    fn system_parameters(&self) -> Result<Map<String, Value>> {
        self.inner().system_parameters()
    }

    fn workflow_inputs(&self) -> Result<WorkflowInputs> {
        self.inner().workflow_inputs()
    }

    fn build_invocation_id(&self) -> Result<String> {
        self.inner().build_invocation_id()
    }

    fn build_start_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.inner().build_start_time()
    }

    fn build_finish_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.inner().build_finish_time()
    }

    fn number_resolved_dependencies(&self) -> Result<usize> {
        self.inner().number_resolved_dependencies()
    }
}

/// Shared subject check for all schemas.
pub(crate) fn non_empty_subjects(subjects: &[Subject]) -> Result<&[Subject]> {
    if subjects.is_empty() {
        return Err(ProvenanceError::InvalidDssePayload("no subjects".into()));
    }
    Ok(subjects)
}
