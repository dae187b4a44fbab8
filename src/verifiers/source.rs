use crate::provenance::Provenance;
use crate::utils::GitUri;
use crate::{ProvenanceError, Result};
use log::debug;

const EXPECTED_SOURCE_HOST: &str = "github.com";

/// Check that the build consumed and was triggered from `expected_source_uri`.
///
/// The trigger must carry a ref. The source material must too unless
/// `allow_no_material_ref` is set; when both carry one they must agree.
pub fn verify_source_uri(
    provenance: &dyn Provenance,
    expected_source_uri: &str,
    allow_no_material_ref: bool,
) -> Result<()> {
    let expected = parse_expected_source(expected_source_uri)?;

    let trigger_uri = provenance.trigger_uri()?;
    let trigger = GitUri::parse(&trigger_uri)?;
    let trigger_ref = trigger.git_ref.as_deref().ok_or_else(|| {
        ProvenanceError::MalformedUri(format!("trigger '{}' has no ref", trigger_uri))
    })?;
    if !trigger.same_repository(&expected) {
        return Err(ProvenanceError::MismatchSource(format!(
            "expected source '{}', trigger is '{}'",
            expected.repository(),
            trigger_uri
        )));
    }

    let source_uri = provenance.source_uri()?;
    if source_uri.is_empty() {
        return Err(ProvenanceError::InvalidDssePayload(
            "no source material".into(),
        ));
    }
    let source = GitUri::parse(&source_uri)?;
    if source.git_ref.is_none() && !allow_no_material_ref {
        return Err(ProvenanceError::MalformedUri(format!(
            "source material '{}' has no ref",
            source_uri
        )));
    }
    if !source.same_repository(&expected) {
        return Err(ProvenanceError::MismatchSource(format!(
            "expected source '{}', material is '{}'",
            expected.repository(),
            source_uri
        )));
    }

    if let Some(source_ref) = source.git_ref.as_deref() {
        if source_ref != trigger_ref {
            return Err(ProvenanceError::InvalidDssePayload(format!(
                "material ref '{}' does not match trigger ref '{}'",
                source_ref, trigger_ref
            )));
        }
    }

    debug!(
        "Source '{}' verified at ref '{}'",
        expected.repository(),
        trigger_ref
    );
    Ok(())
}

fn parse_expected_source(expected_source_uri: &str) -> Result<GitUri> {
    let expected = GitUri::parse(expected_source_uri)?;
    if let Some(git_ref) = &expected.git_ref {
        return Err(ProvenanceError::MalformedUri(format!(
            "expected source '{}' must not carry a ref ('{}')",
            expected_source_uri, git_ref
        )));
    }
    if expected.host != EXPECTED_SOURCE_HOST {
        return Err(ProvenanceError::MalformedUri(format!(
            "expected source must be a {} repository, got '{}'",
            EXPECTED_SOURCE_HOST, expected_source_uri
        )));
    }
    Ok(expected)
}
