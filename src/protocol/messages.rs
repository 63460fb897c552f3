// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// A request to verify one file.
///
/// Immutable once submitted; its identity is its arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub fname: String,
    /// Replaces the file's contents for this request only.
    #[serde(default)]
    pub fcontents: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl VerifyRequest {
    pub fn new(fname: impl Into<String>, fcontents: Option<String>, args: Vec<String>) -> Self {
        Self {
            fname: fname.into(),
            fcontents,
            args,
        }
    }
}

/// Messages the host sends to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Verify(VerifyRequest),
}

/// Terminal result of a one-shot verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CompletionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Messages the worker sends to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Bootstrap finished; sent exactly once, before any completion.
    Ready,
    /// Human-readable status; `None` clears the previous one.
    Progress(Option<String>),
    Stdout(String),
    Stderr(String),
    VerificationComplete(CompletionResult),
    /// Bootstrap failed; `Ready` will never follow.
    BootstrapFailed(String),
}

impl WorkerMessage {
    /// Wire name of the message kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Ready => "READY",
            WorkerMessage::Progress(_) => "PROGRESS",
            WorkerMessage::Stdout(_) => "STDOUT",
            WorkerMessage::Stderr(_) => "STDERR",
            WorkerMessage::VerificationComplete(_) => "VERIFICATION_COMPLETE",
            WorkerMessage::BootstrapFailed(_) => "BOOTSTRAP_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_request_wire_shape() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "kind": "VERIFY",
            "payload": {"fname": "A.fst", "fcontents": "module A", "args": ["--admit_smt_queries", "true"]}
        }))
        .unwrap();

        let ClientMessage::Verify(request) = msg;
        assert_eq!(request.fname, "A.fst");
        assert_eq!(request.fcontents.as_deref(), Some("module A"));
        assert_eq!(request.args, vec!["--admit_smt_queries", "true"]);
    }

    #[test]
    fn test_verify_request_optional_fields_default() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "kind": "VERIFY",
            "payload": {"fname": "B.fst"}
        }))
        .unwrap();

        let ClientMessage::Verify(request) = msg;
        assert_eq!(request, VerifyRequest::new("B.fst", None, vec![]));
    }

    #[test]
    fn test_ready_has_no_payload() {
        assert_eq!(
            serde_json::to_value(WorkerMessage::Ready).unwrap(),
            json!({"kind": "READY"})
        );
    }

    #[test]
    fn test_progress_clear_is_null_payload() {
        assert_eq!(
            serde_json::to_value(WorkerMessage::Progress(None)).unwrap(),
            json!({"kind": "PROGRESS", "payload": null})
        );
    }

    #[test]
    fn test_completion_uses_camel_case_exit_code() {
        let msg = WorkerMessage::VerificationComplete(CompletionResult {
            exit_code: 1,
            stdout: vec!["line".to_string()],
            stderr: vec![],
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "kind": "VERIFICATION_COMPLETE",
                "payload": {"exitCode": 1, "stdout": ["line"], "stderr": []}
            })
        );
        assert_eq!(msg.kind(), "VERIFICATION_COMPLETE");
    }

    #[test]
    fn test_bootstrap_failed_kind() {
        let value = serde_json::to_value(WorkerMessage::BootstrapFailed("no solver".into())).unwrap();
        assert_eq!(value["kind"], "BOOTSTRAP_FAILED");
        assert_eq!(value["payload"], "no solver");
    }
}
