use crate::{ProvenanceError, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const INTOTO_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// A DSSE envelope wrapping an in-toto statement.
///
/// Signatures are carried along for the caller; nothing here checks them.
#[derive(Debug, Deserialize, Clone)]
pub struct DsseEnvelope {
    pub payload: String,
    #[serde(rename = "payloadType")]
    pub payload_type: String,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Signature {
    pub sig: String,
    pub keyid: Option<String>,
}

impl DsseEnvelope {
    pub fn new(payload_type: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            payload: BASE64.encode(payload),
            payload_type: payload_type.into(),
            signatures: Vec::new(),
        }
    }

    /// Base64-decode the payload of an in-toto envelope.
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        if self.payload_type != INTOTO_PAYLOAD_TYPE {
            return Err(ProvenanceError::InvalidDssePayload(format!(
                "expected payload type '{}', got '{}'",
                INTOTO_PAYLOAD_TYPE, self.payload_type
            )));
        }
        BASE64.decode(&self.payload).map_err(|e| {
            ProvenanceError::InvalidDssePayload(format!("failed to decode payload: {}", e))
        })
    }
}

/// Parse one JSON document holding either a bare DSSE envelope or a sigstore
/// bundle with a `dsseEnvelope` member.
pub fn parse_envelope_line(line: &str) -> Result<DsseEnvelope> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        ProvenanceError::InvalidDssePayload(format!("failed to parse envelope: {}", e))
    })?;

    let envelope = match value.get("dsseEnvelope") {
        Some(inner) => {
            log::trace!(
                "Found sigstore bundle with media type {:?}",
                value.get("mediaType").and_then(|m| m.as_str())
            );
            inner.clone()
        }
        None => value,
    };

    serde_json::from_value(envelope)
        .map_err(|e| ProvenanceError::InvalidDssePayload(format!("not a DSSE envelope: {}", e)))
}

/// Load every envelope of a `.intoto.jsonl` file, one document per line.
pub fn load_envelopes(path: &Path) -> Result<Vec<DsseEnvelope>> {
    let content = fs::read_to_string(path)?;

    let mut envelopes = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        log::trace!("Parsing line of length: {}", line.len());
        envelopes.push(parse_envelope_line(line)?);
    }

    if envelopes.is_empty() {
        return Err(ProvenanceError::InvalidDssePayload(format!(
            "no envelopes in {}",
            path.display()
        )));
    }

    Ok(envelopes)
}
