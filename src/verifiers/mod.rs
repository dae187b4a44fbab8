mod builder;
mod digest;
mod inputs;
mod refs;
mod source;

pub use builder::verify_builder_id_exact_match;
pub use digest::verify_digest;
pub use inputs::verify_workflow_inputs;
pub use refs::{verify_branch, verify_tag, verify_versioned_tag};
pub use source::verify_source_uri;

use crate::Result;
use crate::policy::Policy;
use crate::provenance::Provenance;
use log::debug;

/// What a successful verification established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Builder ID as attested
    pub builder_id: String,
    /// Source material URI as attested
    pub source_uri: String,
    /// Attested branch ref, if any
    pub branch: Option<String>,
    /// Attested tag ref, if any
    pub tag: Option<String>,
    /// One line per check that passed
    pub messages: Vec<String>,
}

/// Run every check the policy asks for, stopping at the first failure.
pub(crate) fn run_checklist(
    provenance: &dyn Provenance,
    policy: &Policy,
) -> Result<VerificationResult> {
    debug!("Verifying {} provenance", provenance.predicate_type());
    let mut messages = Vec::new();

    verify_digest(provenance, &policy.expected_digest)?;
    messages.push(format!("Artifact digest verified: {}", policy.expected_digest));

    verify_source_uri(
        provenance,
        &policy.expected_source_uri,
        policy.allow_no_material_ref,
    )?;
    messages.push(format!("Source verified: {}", policy.expected_source_uri));

    if let Some(builder_id) = &policy.expected_builder_id {
        verify_builder_id_exact_match(provenance, builder_id)?;
        messages.push(format!("Builder verified: {}", builder_id));
    }

    if let Some(branch) = &policy.expected_branch {
        verify_branch(provenance, branch)?;
        messages.push(format!("Branch verified: {}", branch));
    }

    if let Some(tag) = &policy.expected_tag {
        verify_tag(provenance, tag)?;
        messages.push(format!("Tag verified: {}", tag));
    }

    if let Some(tag) = &policy.expected_versioned_tag {
        verify_versioned_tag(provenance, tag)?;
        messages.push(format!("Versioned tag verified: {}", tag));
    }

    if !policy.expected_workflow_inputs.is_empty() {
        verify_workflow_inputs(provenance, &policy.expected_workflow_inputs)?;
        messages.push(format!(
            "Workflow inputs verified: {}",
            policy.expected_workflow_inputs.len()
        ));
    }

    Ok(VerificationResult {
        builder_id: provenance.builder_id()?,
        source_uri: provenance.source_uri()?,
        branch: non_empty(provenance.branch().ok()),
        tag: non_empty(provenance.tag().ok()),
        messages,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
