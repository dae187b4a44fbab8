use crate::envelope::DsseEnvelope;
use crate::provenance::byob::DELEGATED_BUILD_TYPES;
use crate::provenance::v1::GITHUB_WORKFLOW_BUILD_TYPES;
use crate::provenance::{ByobProvenanceV1, ProvenanceV02, ProvenanceV1, SlsaProvenance, v02, v1};
use crate::{ProvenanceError, Result};
use log::debug;
use serde::Deserialize;

const STATEMENT_TYPE_PREFIX: &str = "https://in-toto.io/Statement/v";

/// Just enough of a statement to pick the schema adapter.
#[derive(Debug, Deserialize)]
struct StatementHeader {
    #[serde(rename = "_type")]
    statement_type: String,
    #[serde(rename = "predicateType")]
    predicate_type: String,
    #[serde(default)]
    predicate: PredicateHeader,
}

#[derive(Debug, Default, Deserialize)]
struct PredicateHeader {
    #[serde(rename = "buildDefinition")]
    build_definition: Option<BuildDefinitionHeader>,
}

#[derive(Debug, Deserialize)]
struct BuildDefinitionHeader {
    #[serde(rename = "buildType", default)]
    build_type: String,
}

fn parse_header(payload: &[u8]) -> Result<StatementHeader> {
    let header: StatementHeader = serde_json::from_slice(payload).map_err(|e| {
        ProvenanceError::InvalidDssePayload(format!("failed to parse payload: {}", e))
    })?;

    if !header.statement_type.starts_with(STATEMENT_TYPE_PREFIX) {
        return Err(ProvenanceError::InvalidDssePayload(format!(
            "not an in-toto statement: '{}'",
            header.statement_type
        )));
    }
    Ok(header)
}

/// Decode a payload whose predicate type is read from the statement itself.
pub fn provenance_from_payload(payload: &[u8]) -> Result<SlsaProvenance> {
    let header = parse_header(payload)?;
    provenance_from_statement(&header.predicate_type, payload)
}

/// Decode a payload declared to carry `predicate_type`.
///
/// Fails with `InvalidDssePayload` when the type is not a supported SLSA
/// predicate, when the statement disagrees with the declared type, or when
/// the payload does not fit the selected schema.
pub fn provenance_from_statement(predicate_type: &str, payload: &[u8]) -> Result<SlsaProvenance> {
    let header = parse_header(payload)?;
    if header.predicate_type != predicate_type {
        return Err(ProvenanceError::InvalidDssePayload(format!(
            "declared predicate type '{}' but statement has '{}'",
            predicate_type, header.predicate_type
        )));
    }

    let provenance = match predicate_type {
        v02::PREDICATE_TYPE => SlsaProvenance::V02(ProvenanceV02::from_slice(payload)?),
        v1::PREDICATE_TYPE => {
            let build_type = header
                .predicate
                .build_definition
                .map(|d| d.build_type)
                .ok_or_else(|| {
                    ProvenanceError::InvalidDssePayload("missing buildDefinition".into())
                })?;

            if DELEGATED_BUILD_TYPES.contains(&build_type.as_str()) {
                SlsaProvenance::Byob(ByobProvenanceV1::from_slice(payload)?)
            } else if GITHUB_WORKFLOW_BUILD_TYPES.contains(&build_type.as_str()) {
                SlsaProvenance::V1(ProvenanceV1::from_slice(payload)?)
            } else {
                return Err(ProvenanceError::InvalidDssePayload(format!(
                    "unsupported build type: '{}'",
                    build_type
                )));
            }
        }
        other => {
            return Err(ProvenanceError::InvalidDssePayload(format!(
                "unexpected predicate type: '{}'",
                other
            )));
        }
    };

    debug!("Decoded {} provenance", provenance.schema_name());
    Ok(provenance)
}

/// Decode the provenance carried by an in-toto DSSE envelope.
pub fn provenance_from_envelope(envelope: &DsseEnvelope) -> Result<SlsaProvenance> {
    let payload = envelope.decode_payload()?;
    provenance_from_payload(&payload)
}
