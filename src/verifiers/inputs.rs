use crate::provenance::Provenance;
use crate::{ProvenanceError, Result};
use log::debug;
use std::collections::BTreeMap;

/// Every expected input must be attested with the same canonical string.
/// Extra attested inputs are ignored.
pub fn verify_workflow_inputs(
    provenance: &dyn Provenance,
    expected_inputs: &BTreeMap<String, String>,
) -> Result<()> {
    let inputs = provenance.workflow_inputs()?;

    for (key, expected) in expected_inputs {
        let value = inputs.get(key).ok_or_else(|| {
            ProvenanceError::MismatchWorkflowInputs(format!("no input '{}' in provenance", key))
        })?;
        let value = value.to_string();
        if &value != expected {
            return Err(ProvenanceError::MismatchWorkflowInputs(format!(
                "input '{}': expected '{}', got '{}'",
                key, expected, value
            )));
        }
    }

    debug!("{} workflow input(s) verified", expected_inputs.len());
    Ok(())
}
