//! Identifies where a run's inputs and outputs live.
//!
//! Uploads and artifacts are scoped twice: by the contract (or draft) they
//! belong to, and by the individual test or run session within it. The pair
//! keeps concurrent sessions against the same contract from seeing each
//! other's files.

use serde::{Deserialize, Serialize};

/// What the session hangs off: a saved contract or an unsaved draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Contract,
    Draft,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::Contract => "contract",
            ScopeKind::Draft => "draft",
        }
    }
}

/// Whether the session is a design-time test or a production run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Test,
    Run,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Test => "test",
            SessionKind::Run => "run",
        }
    }
}

/// Full address of one session's staging area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    /// Id of the contract or draft the session belongs to.
    pub scope_id: String,
    pub scope: ScopeKind,
    pub session: SessionKind,
    /// Caller-chosen id, unique within the scope.
    pub session_id: String,
}

impl SessionRef {
    pub fn new(
        scope: ScopeKind,
        scope_id: impl Into<String>,
        session: SessionKind,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            scope_id: scope_id.into(),
            scope,
            session,
            session_id: session_id.into(),
        }
    }

    /// Session for running a saved contract.
    pub fn contract_run(scope_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self::new(ScopeKind::Contract, scope_id, SessionKind::Run, session_id)
    }

    /// Session for test-driving an unsaved draft.
    pub fn draft_test(scope_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self::new(ScopeKind::Draft, scope_id, SessionKind::Test, session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_fill_kinds() {
        let run = SessionRef::contract_run("monthly", "s-1");
        assert_eq!(run.scope, ScopeKind::Contract);
        assert_eq!(run.session, SessionKind::Run);
        assert_eq!(run.scope_id, "monthly");
        assert_eq!(run.session_id, "s-1");

        let test = SessionRef::draft_test("draft-9", "s-2");
        assert_eq!(test.scope, ScopeKind::Draft);
        assert_eq!(test.session, SessionKind::Test);
    }

    #[test]
    fn serializes_lowercase() {
        let session = SessionRef::draft_test("draft-9", "s-2");
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains(r#""scope":"draft""#));
        assert!(json.contains(r#""session":"test""#));
        assert!(json.contains(r#""scopeId":"draft-9""#));
    }
}
