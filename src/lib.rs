use thiserror::Error;

pub mod envelope;
pub mod policy;
pub mod provenance;
pub mod statement;
pub mod utils;
pub mod verifiers;

// Re-export commonly used types
pub use envelope::{DsseEnvelope, load_envelopes, parse_envelope_line};
pub use policy::Policy;
pub use provenance::{InputValue, Provenance, SlsaProvenance, Subject, WorkflowInputs};
pub use statement::{provenance_from_envelope, provenance_from_payload, provenance_from_statement};
pub use verifiers::{
    VerificationResult, verify_branch, verify_builder_id_exact_match, verify_digest,
    verify_source_uri, verify_tag, verify_versioned_tag, verify_workflow_inputs,
};

/// Reasons a provenance document can fail verification.
///
/// Every variant carries a human-readable detail; callers should match on the
/// variant and surface it as-is.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// The attestation does not have the shape needed to read a field.
    #[error("invalid DSSE payload: {0}")]
    InvalidDssePayload(String),

    #[error("malformed URI: {0}")]
    MalformedUri(String),

    #[error("artifact hash does not match provenance subject: {0}")]
    MismatchHash(String),

    #[error("source does not match: {0}")]
    MismatchSource(String),

    #[error("builder ID does not match: {0}")]
    MismatchBuilderId(String),

    #[error("branch does not match: {0}")]
    MismatchBranch(String),

    #[error("tag does not match: {0}")]
    MismatchTag(String),

    #[error("versioned tag does not match: {0}")]
    MismatchVersionedTag(String),

    #[error("invalid semantic version: {0}")]
    InvalidSemver(String),

    #[error("workflow inputs do not match: {0}")]
    MismatchWorkflowInputs(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProvenanceError>;

/// Verify decoded provenance against a policy.
///
/// Checks run in a fixed order (digest, source, builder, refs, inputs) and
/// the first failure is returned.
pub fn verify_provenance(
    provenance: &dyn Provenance,
    policy: &Policy,
) -> Result<VerificationResult> {
    verifiers::run_checklist(provenance, policy)
}

/// Decode an in-toto envelope and verify its provenance against a policy.
pub fn verify_envelope(envelope: &DsseEnvelope, policy: &Policy) -> Result<VerificationResult> {
    let provenance = provenance_from_envelope(envelope)?;
    verify_provenance(&provenance, policy)
}
