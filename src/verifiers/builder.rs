use crate::provenance::Provenance;
use crate::{ProvenanceError, Result};
use log::debug;

/// Exact string comparison, `@version` suffix included.
pub fn verify_builder_id_exact_match(
    provenance: &dyn Provenance,
    expected_builder_id: &str,
) -> Result<()> {
    let builder_id = provenance.builder_id()?;

    if builder_id.is_empty() || expected_builder_id.is_empty() || builder_id != expected_builder_id
    {
        return Err(ProvenanceError::MismatchBuilderId(format!(
            "expected '{}', got '{}'",
            expected_builder_id, builder_id
        )));
    }

    debug!("Builder ID verified: {}", builder_id);
    Ok(())
}
