use crate::provenance::Provenance;
use crate::{ProvenanceError, Result};
use log::debug;

const SHA256: &str = "sha256";

/// Succeed when any subject's `sha256` digest equals `expected_hex`.
///
/// Subjects without a `sha256` entry are skipped, but at least one subject
/// must carry one.
pub fn verify_digest(provenance: &dyn Provenance, expected_hex: &str) -> Result<()> {
    let subjects = provenance.subjects()?;

    let mut found_sha256 = false;
    for subject in subjects {
        let Some(digest) = subject.digest.get(SHA256) else {
            continue;
        };
        found_sha256 = true;
        if digest == expected_hex {
            debug!("Artifact digest matches subject '{}'", subject.name);
            return Ok(());
        }
    }

    if !found_sha256 {
        return Err(ProvenanceError::InvalidDssePayload(
            "no sha256 subject digest".into(),
        ));
    }

    Err(ProvenanceError::MismatchHash(format!(
        "expected digest '{}' not found in {} subject(s)",
        expected_hex,
        subjects.len()
    )))
}
