//! Helpers for the GitHub environment maps carried by the loosely-typed
//! schemas. Every lookup validates the type it reads and reports a precise
//! error instead of handing raw JSON onward.

use super::{InputValue, WorkflowInputs};
use crate::utils::git_ref::{BRANCH_PREFIX, qualify_branch};
use crate::utils::{GitRef, GitUri};
use crate::{ProvenanceError, Result};
use serde_json::{Map, Value};

pub(crate) const WORKFLOW_DISPATCH_EVENT: &str = "workflow_dispatch";

/// Key names of the GitHub context inside an environment map.
pub(crate) struct EnvironmentKeys {
    pub event_name: &'static str,
    pub ref_type: &'static str,
    pub git_ref: &'static str,
    pub base_ref: &'static str,
    pub event_payload: &'static str,
}

/// `invocation.environment` of SLSA v0.2 documents.
pub(crate) const LOWERCASE_KEYS: EnvironmentKeys = EnvironmentKeys {
    event_name: "github_event_name",
    ref_type: "github_ref_type",
    git_ref: "github_ref",
    base_ref: "github_base_ref",
    event_payload: "github_event_payload",
};

/// `internalParameters` of delegated SLSA v1.0 documents.
pub(crate) const UPPERCASE_KEYS: EnvironmentKeys = EnvironmentKeys {
    event_name: "GITHUB_EVENT_NAME",
    ref_type: "GITHUB_REF_TYPE",
    git_ref: "GITHUB_REF",
    base_ref: "GITHUB_BASE_REF",
    event_payload: "GITHUB_EVENT_PAYLOAD",
};

pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ProvenanceError::InvalidDssePayload(format!("{} is not an object", what)))
}

pub(crate) fn get_as_string<'a>(env: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    let value = env
        .get(key)
        .ok_or_else(|| ProvenanceError::InvalidDssePayload(format!("no '{}' entry", key)))?;
    value
        .as_str()
        .ok_or_else(|| ProvenanceError::InvalidDssePayload(format!("'{}' is not a string", key)))
}

/// Like [`get_as_string`] but a missing key or `null` reads as `None`.
fn get_optional_string<'a>(env: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match env.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ProvenanceError::InvalidDssePayload(format!(
            "'{}' is not a string",
            key
        ))),
    }
}

fn event_payload<'a>(
    env: &'a Map<String, Value>,
    keys: &EnvironmentKeys,
) -> Result<&'a Map<String, Value>> {
    let payload = env.get(keys.event_payload).ok_or_else(|| {
        ProvenanceError::InvalidDssePayload(format!("no '{}' entry", keys.event_payload))
    })?;
    as_object(payload, keys.event_payload)
}

/// Branch the build ran on, derived from the GitHub ref type.
///
/// Tag builds report the branch they were cut from when GitHub recorded it.
pub(crate) fn branch_from_environment(
    env: &Map<String, Value>,
    keys: &EnvironmentKeys,
) -> Result<String> {
    let ref_type = get_as_string(env, keys.ref_type)?;
    match ref_type {
        "branch" => Ok(get_as_string(env, keys.git_ref)?.to_string()),
        "tag" => base_ref(env, keys),
        other => Err(ProvenanceError::InvalidDssePayload(format!(
            "unknown ref type '{}'",
            other
        ))),
    }
}

fn base_ref(env: &Map<String, Value>, keys: &EnvironmentKeys) -> Result<String> {
    if let Some(base) = get_optional_string(env, keys.base_ref)?.filter(|b| !b.is_empty()) {
        return Ok(qualify_branch(base));
    }

    // Only push events carry a base_ref in their payload.
    if get_as_string(env, keys.event_name)? != "push" {
        return Ok(String::new());
    }
    let payload = event_payload(env, keys)?;
    if !payload.contains_key("base_ref") {
        return Err(ProvenanceError::InvalidDssePayload(
            "no 'base_ref' in push event payload".into(),
        ));
    }
    Ok(get_optional_string(payload, "base_ref")?
        .filter(|b| !b.is_empty())
        .map(qualify_branch)
        .unwrap_or_default())
}

pub(crate) fn tag_from_environment(
    env: &Map<String, Value>,
    keys: &EnvironmentKeys,
) -> Result<String> {
    let ref_type = get_as_string(env, keys.ref_type)?;
    match ref_type {
        "tag" => Ok(get_as_string(env, keys.git_ref)?.to_string()),
        "branch" => Ok(String::new()),
        other => Err(ProvenanceError::InvalidDssePayload(format!(
            "unknown ref type '{}'",
            other
        ))),
    }
}

pub(crate) fn workflow_inputs_from_environment(
    env: &Map<String, Value>,
    keys: &EnvironmentKeys,
) -> Result<WorkflowInputs> {
    let event_name = get_as_string(env, keys.event_name)?;
    if event_name != WORKFLOW_DISPATCH_EVENT {
        return Err(ProvenanceError::MismatchWorkflowInputs(format!(
            "expected '{}' trigger, got '{}'",
            WORKFLOW_DISPATCH_EVENT, event_name
        )));
    }

    let payload = event_payload(env, keys)?;
    let inputs = payload
        .get("inputs")
        .ok_or_else(|| ProvenanceError::InvalidDssePayload("no 'inputs' in event payload".into()))?;
    inputs_from_map(as_object(inputs, "inputs")?)
}

pub(crate) fn inputs_from_map(inputs: &Map<String, Value>) -> Result<WorkflowInputs> {
    inputs
        .iter()
        .map(|(key, value)| InputValue::try_from(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Branch or tag ref carried by a source URI's `@ref` suffix.
///
/// A URI without a ref yields empty strings for both; a ref that is neither
/// a branch nor a tag is rejected.
pub(crate) fn refs_from_source_uri(source_uri: &str) -> Result<(String, String)> {
    let uri = GitUri::parse(source_uri)?;
    let Some(full_ref) = uri.git_ref.as_deref() else {
        return Ok((String::new(), String::new()));
    };
    match GitRef::classify(full_ref) {
        GitRef::Branch(_) => Ok((full_ref.to_string(), String::new())),
        GitRef::Tag(_) => Ok((String::new(), full_ref.to_string())),
        GitRef::Other(other) => Err(ProvenanceError::InvalidDssePayload(format!(
            "unknown ref type '{}', expected a '{}' or tag ref",
            other, BRANCH_PREFIX
        ))),
    }
}
