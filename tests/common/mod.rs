#![allow(dead_code)]

use chrono::{DateTime, Utc};
use provenance_verification::envelope::INTOTO_PAYLOAD_TYPE;
use provenance_verification::{
    DsseEnvelope, Provenance, ProvenanceError, Result, SlsaProvenance, Subject, WorkflowInputs,
    provenance_from_payload,
};
use serde_json::{Map, Value, json};

pub const DIGEST: &str = "0ae7e4fa71686538440012ee36a2634dbaa19df2dd16a466f52411fb348bbc4e";
pub const REPO: &str = "github.com/slsa-framework/example-package";
pub const WORKFLOW_PATH: &str = ".github/workflows/release.yml";
pub const V02_BUILDER_ID: &str =
    "https://github.com/slsa-framework/slsa-github-generator/.github/workflows/generator_generic_slsa3.yml@refs/tags/v1.4.0";
pub const V1_BUILDER_ID: &str =
    "https://github.com/slsa-framework/slsa-github-generator/.github/workflows/builder_go_slsa3.yml@refs/tags/v1.9.0";
pub const BYOB_BUILDER_ID: &str =
    "https://github.com/slsa-framework/slsa-github-generator/.github/workflows/delegator_generic_slsa3.yml@refs/tags/v1.9.0";

pub fn git_uri(git_ref: &str) -> String {
    format!("git+https://{}@{}", REPO, git_ref)
}

pub fn subject(name: &str, sha256: &str) -> Value {
    json!({ "name": name, "digest": { "sha256": sha256 } })
}

/// SLSA v0.2 statement built from `git_ref` and a GitHub environment.
pub fn v02_statement(git_ref: &str, environment: Value) -> Value {
    json!({
        "_type": "https://in-toto.io/Statement/v0.1",
        "subject": [subject("binary-linux-amd64", DIGEST)],
        "predicateType": "https://slsa.dev/provenance/v0.2",
        "predicate": {
            "builder": { "id": V02_BUILDER_ID },
            "buildType": "https://github.com/slsa-framework/slsa-github-generator/generic@v1",
            "invocation": {
                "configSource": {
                    "uri": git_uri(git_ref),
                    "digest": { "sha1": "5e8bd0ed2fa2a5e9b5e9a1925cf0d1ac90ec0dcb" },
                    "entryPoint": WORKFLOW_PATH
                },
                "parameters": {},
                "environment": environment
            },
            "metadata": {
                "buildInvocationID": "4128571590-1",
                "buildStartedOn": "2023-02-10T11:03:00Z",
                "buildFinishedOn": "2023-02-10T11:05:30Z",
                "completeness": { "parameters": true, "environment": false, "materials": false },
                "reproducible": false
            },
            "materials": [{
                "uri": git_uri(git_ref),
                "digest": { "sha1": "5e8bd0ed2fa2a5e9b5e9a1925cf0d1ac90ec0dcb" }
            }]
        }
    })
}

pub fn v02_branch_env(branch_ref: &str) -> Value {
    json!({
        "github_event_name": "push",
        "github_ref": branch_ref,
        "github_ref_type": "branch",
        "github_base_ref": "",
        "github_event_payload": {}
    })
}

pub fn v02_tag_env(tag_ref: &str, payload_base_ref: Value) -> Value {
    json!({
        "github_event_name": "push",
        "github_ref": tag_ref,
        "github_ref_type": "tag",
        "github_base_ref": "",
        "github_event_payload": { "base_ref": payload_base_ref }
    })
}

pub fn v02_dispatch_env(event_name: &str, inputs: Value) -> Value {
    json!({
        "github_event_name": event_name,
        "github_ref": "refs/heads/main",
        "github_ref_type": "branch",
        "github_base_ref": "",
        "github_event_payload": { "inputs": inputs }
    })
}

/// SLSA v1.0 statement with the GitHub Actions workflow build type.
pub fn v1_statement(git_ref: &str, event_name: &str, inputs: Option<Value>) -> Value {
    let mut external = json!({
        "workflow": {
            "ref": git_ref,
            "repository": format!("https://{}", REPO),
            "path": WORKFLOW_PATH
        }
    });
    if let Some(inputs) = inputs {
        external["inputs"] = inputs;
    }

    json!({
        "_type": "https://in-toto.io/Statement/v1",
        "subject": [subject("binary-linux-amd64", DIGEST)],
        "predicateType": "https://slsa.dev/provenance/v1",
        "predicate": {
            "buildDefinition": {
                "buildType": "https://actions.github.io/buildtypes/workflow/v1",
                "externalParameters": external,
                "internalParameters": {
                    "github": {
                        "event_name": event_name,
                        "repository_id": "567074231",
                        "repository_owner_id": "80431187",
                        "runner_environment": "github-hosted"
                    }
                },
                "resolvedDependencies": [{
                    "uri": git_uri(git_ref),
                    "digest": { "gitCommit": "5e8bd0ed2fa2a5e9b5e9a1925cf0d1ac90ec0dcb" }
                }]
            },
            "runDetails": {
                "builder": { "id": V1_BUILDER_ID },
                "metadata": {
                    "invocationId": "https://github.com/slsa-framework/example-package/actions/runs/4128571590/attempts/1",
                    "startedOn": "2023-02-10T11:03:00Z",
                    "finishedOn": "2023-02-10T11:05:30Z"
                }
            }
        }
    })
}

/// Delegated (BYOB) SLSA v1.0 statement.
pub fn byob_statement(git_ref: &str, internal_parameters: Value) -> Value {
    json!({
        "_type": "https://in-toto.io/Statement/v1",
        "subject": [subject("binary-linux-amd64", DIGEST)],
        "predicateType": "https://slsa.dev/provenance/v1",
        "predicate": {
            "buildDefinition": {
                "buildType": "https://github.com/slsa-framework/slsa-github-generator/delegator-generic@v0",
                "externalParameters": {
                    "inputs": { "name1": "value1" },
                    "workflow": {
                        "ref": git_ref,
                        "repository": format!("git+https://{}", REPO),
                        "path": WORKFLOW_PATH
                    }
                },
                "internalParameters": internal_parameters,
                "resolvedDependencies": [{
                    "uri": git_uri(git_ref),
                    "digest": { "sha1": "5e8bd0ed2fa2a5e9b5e9a1925cf0d1ac90ec0dcb" }
                }]
            },
            "runDetails": {
                "builder": { "id": BYOB_BUILDER_ID },
                "metadata": {
                    "invocationId": "https://github.com/slsa-framework/example-package/actions/runs/4128571590/attempts/2"
                }
            }
        }
    })
}

pub fn byob_environment(event_name: &str, inputs: Value) -> Value {
    json!({
        "GITHUB_ACTOR_ID": "1234",
        "GITHUB_EVENT_NAME": event_name,
        "GITHUB_REF": "refs/heads/main",
        "GITHUB_REF_TYPE": "branch",
        "GITHUB_EVENT_PAYLOAD": { "inputs": inputs }
    })
}

pub fn payload(statement: &Value) -> Vec<u8> {
    serde_json::to_vec(statement).unwrap()
}

pub fn envelope(statement: &Value) -> DsseEnvelope {
    DsseEnvelope::new(INTOTO_PAYLOAD_TYPE, &payload(statement))
}

pub fn decode(statement: &Value) -> SlsaProvenance {
    provenance_from_payload(&payload(statement)).unwrap()
}

/// Hand-filled provenance for verifier tests that do not need a document.
#[derive(Debug, Default)]
pub struct TestProvenance {
    pub builder_id: String,
    pub source_uri: String,
    pub trigger_uri: String,
    pub subjects: Vec<Subject>,
    pub branch: String,
    pub tag: String,
    pub workflow_inputs: Option<WorkflowInputs>,
}

impl Provenance for TestProvenance {
    fn predicate_type(&self) -> &str {
        "test"
    }

    fn builder_id(&self) -> Result<String> {
        Ok(self.builder_id.clone())
    }

    fn source_uri(&self) -> Result<String> {
        Ok(self.source_uri.clone())
    }

    fn trigger_uri(&self) -> Result<String> {
        Ok(self.trigger_uri.clone())
    }

    fn subjects(&self) -> Result<&[Subject]> {
        Ok(&self.subjects)
    }

    fn branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn tag(&self) -> Result<String> {
        Ok(self.tag.clone())
    }

    fn build_trigger_path(&self) -> Result<String> {
        Ok(String::new())
    }

    fn system_parameters(&self) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }

    fn workflow_inputs(&self) -> Result<WorkflowInputs> {
        self.workflow_inputs
            .clone()
            .ok_or_else(|| ProvenanceError::MismatchWorkflowInputs("not a dispatch".into()))
    }

    fn build_invocation_id(&self) -> Result<String> {
        Ok(String::new())
    }

    fn build_start_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(None)
    }

    fn build_finish_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(None)
    }

    fn number_resolved_dependencies(&self) -> Result<usize> {
        Ok(0)
    }
}
