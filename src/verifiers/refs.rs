use crate::provenance::Provenance;
use crate::utils::TagVersion;
use crate::utils::git_ref::{TAG_PREFIX, qualify_branch, qualify_tag};
use crate::{ProvenanceError, Result};
use log::debug;

/// Exact, case-sensitive branch match. `expected_branch` may be given with
/// or without `refs/heads/`.
pub fn verify_branch(provenance: &dyn Provenance, expected_branch: &str) -> Result<()> {
    let branch = provenance.branch()?;
    let expected = qualify_branch(expected_branch);

    if branch != expected {
        return Err(ProvenanceError::MismatchBranch(format!(
            "expected '{}', got '{}'",
            expected, branch
        )));
    }

    debug!("Branch verified: {}", branch);
    Ok(())
}

/// Exact, case-sensitive tag match with no semver interpretation.
pub fn verify_tag(provenance: &dyn Provenance, expected_tag: &str) -> Result<()> {
    let tag = provenance.tag()?;
    let expected = qualify_tag(expected_tag);

    if tag != expected {
        return Err(ProvenanceError::MismatchTag(format!(
            "expected '{}', got '{}'",
            expected, tag
        )));
    }

    debug!("Tag verified: {}", tag);
    Ok(())
}

/// Match the attested tag against a semver constraint such as `v1` or
/// `v1.2.0`. Build metadata is ignored on both sides.
pub fn verify_versioned_tag(provenance: &dyn Provenance, expected_tag: &str) -> Result<()> {
    let expected = TagVersion::parse(expected_tag)?;
    let tag = provenance.tag()?;

    let attested_name = tag.strip_prefix(TAG_PREFIX).unwrap_or(&tag);
    let attested = TagVersion::parse(attested_name).map_err(|_| {
        ProvenanceError::InvalidSemver(format!("attested tag '{}' is not a version", tag))
    })?;

    if !attested.satisfies(&expected) {
        return Err(ProvenanceError::MismatchVersionedTag(format!(
            "expected '{}', got '{}'",
            expected_tag, attested_name
        )));
    }

    debug!("Versioned tag {} satisfies {}", attested_name, expected_tag);
    Ok(())
}
