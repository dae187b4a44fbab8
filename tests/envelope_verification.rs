mod common;

use common::*;
use provenance_verification::{
    Policy, ProvenanceError, load_envelopes, parse_envelope_line, provenance_from_envelope,
    verify_envelope, verify_provenance,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::io::Write;
use tempfile::NamedTempFile;

fn envelope_line(statement: &serde_json::Value) -> String {
    let envelope = envelope(statement);
    json!({
        "payloadType": envelope.payload_type,
        "payload": envelope.payload,
        "signatures": [{ "keyid": "", "sig": "MEUCIQDf" }]
    })
    .to_string()
}

fn bundle_line(statement: &serde_json::Value) -> String {
    let envelope = envelope(statement);
    json!({
        "mediaType": "application/vnd.dev.sigstore.bundle+json;version=0.2",
        "verificationMaterial": {},
        "dsseEnvelope": {
            "payloadType": envelope.payload_type,
            "payload": envelope.payload,
            "signatures": [{ "sig": "MEUCIQDf" }]
        }
    })
    .to_string()
}

fn artifact_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

#[test]
fn test_load_envelopes_from_jsonl() -> provenance_verification::Result<()> {
    let v02 = v02_statement("refs/heads/main", v02_branch_env("refs/heads/main"));
    let v1 = v1_statement("refs/tags/v1.2.3", "push", None);

    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", envelope_line(&v02))?;
    writeln!(file)?;
    writeln!(file, "{}", bundle_line(&v1))?;

    let envelopes = load_envelopes(file.path())?;
    assert_eq!(envelopes.len(), 2);
    assert_eq!(envelopes[0].signatures.len(), 1);

    let first = provenance_from_envelope(&envelopes[0])?;
    let second = provenance_from_envelope(&envelopes[1])?;
    assert_eq!(first.schema_name(), "SLSA v0.2");
    assert_eq!(second.schema_name(), "SLSA v1.0");

    Ok(())
}

#[test]
fn test_load_envelopes_empty_file() {
    let file = NamedTempFile::new().unwrap();

    let result = load_envelopes(file.path());
    assert!(matches!(result, Err(ProvenanceError::InvalidDssePayload(_))));
}

#[test]
fn test_load_envelopes_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let result = load_envelopes(&dir.path().join("missing.intoto.jsonl"));
    assert!(matches!(result, Err(ProvenanceError::Io(_))));
}

#[test]
fn test_parse_envelope_line_rejects_other_documents() {
    assert!(matches!(
        parse_envelope_line("{\"hello\": \"world\"}"),
        Err(ProvenanceError::InvalidDssePayload(_))
    ));
    assert!(matches!(
        parse_envelope_line("not json"),
        Err(ProvenanceError::InvalidDssePayload(_))
    ));
}

#[test]
fn test_verify_envelope_end_to_end() -> provenance_verification::Result<()> {
    let artifact = b"#!/bin/sh\necho hello\n";
    let digest = artifact_digest(artifact);

    let mut statement = v1_statement(
        "refs/tags/v1.2.3",
        "workflow_dispatch",
        Some(json!({ "release_version": "v1.2.3" })),
    );
    statement["subject"] = json!([subject("hello.sh", &digest)]);

    let policy = Policy::new(digest, REPO)
        .with_builder_id(V1_BUILDER_ID)
        .with_tag("v1.2.3")
        .with_versioned_tag("v1.2")
        .with_workflow_input("release_version", "v1.2.3");

    let result = verify_envelope(&envelope(&statement), &policy)?;
    assert_eq!(result.builder_id, V1_BUILDER_ID);
    assert_eq!(result.source_uri, git_uri("refs/tags/v1.2.3"));
    assert_eq!(result.tag.as_deref(), Some("refs/tags/v1.2.3"));
    assert_eq!(result.branch, None);
    assert_eq!(result.messages.len(), 6);

    Ok(())
}

#[test]
fn test_verify_provenance_stops_at_first_failure() {
    let statement = v02_statement("refs/heads/main", v02_branch_env("refs/heads/main"));
    let provenance = decode(&statement);

    // Wrong digest and wrong builder: only the digest is reported.
    let policy = Policy::new("00", REPO).with_builder_id("https://example.com/builder@v1");
    assert!(matches!(
        verify_provenance(&provenance, &policy),
        Err(ProvenanceError::MismatchHash(_))
    ));

    let policy = Policy::new(DIGEST, REPO).with_builder_id("https://example.com/builder@v1");
    assert!(matches!(
        verify_provenance(&provenance, &policy),
        Err(ProvenanceError::MismatchBuilderId(_))
    ));

    let policy = Policy::new(DIGEST, REPO).with_branch("release");
    assert!(matches!(
        verify_provenance(&provenance, &policy),
        Err(ProvenanceError::MismatchBranch(_))
    ));
}

#[test]
fn test_verify_provenance_minimal_policy() {
    let statement = byob_statement("refs/heads/main", byob_environment("push", json!({})));
    let provenance = decode(&statement);

    let result = verify_provenance(&provenance, &Policy::new(DIGEST, REPO)).unwrap();
    assert_eq!(result.builder_id, BYOB_BUILDER_ID);
    assert_eq!(result.branch.as_deref(), Some("refs/heads/main"));
    assert_eq!(result.tag, None);
    assert_eq!(result.messages.len(), 2);
}

#[test]
fn test_policy_from_file() -> provenance_verification::Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        "{}",
        json!({
            "expectedDigest": DIGEST,
            "expectedSourceUri": REPO,
            "expectedBuilderId": V02_BUILDER_ID,
            "expectedBranch": "main",
            "expectedWorkflowInputs": { "release_version": "v1.2.3" }
        })
    )?;

    let policy = Policy::from_file(file.path())?;
    assert_eq!(policy.expected_digest, DIGEST);
    assert_eq!(policy.expected_builder_id.as_deref(), Some(V02_BUILDER_ID));
    assert_eq!(policy.expected_branch.as_deref(), Some("main"));
    assert!(!policy.allow_no_material_ref);
    assert_eq!(policy.expected_tag, None);
    assert_eq!(policy.expected_workflow_inputs["release_version"], "v1.2.3");

    Ok(())
}

#[test]
fn test_policy_from_invalid_json() {
    assert!(matches!(
        Policy::from_json("{ not json"),
        Err(ProvenanceError::Json(_))
    ));
}
