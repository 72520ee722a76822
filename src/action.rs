//! Governed action adapter: the one call surface collaborators use.
//!
//! A pure facade over [`crate::gate::execute_governed`]. It performs no
//! validation of its own; it only flattens the gate's verdict into a
//! stable four-way status with a payload present for ALLOW and DEGRADE.

use crate::authority::AuthorityInstance;
use crate::constraint::{EnforcementAction, Imperative};
use crate::decision::DecisionDraft;
use crate::gate::{self, GateVerdict};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Allow,
    Degrade,
    Block,
    Escalate,
}

impl From<EnforcementAction> for ActionStatus {
    fn from(action: EnforcementAction) -> Self {
        match action {
            EnforcementAction::Allow => ActionStatus::Allow,
            EnforcementAction::Degrade => ActionStatus::Degrade,
            EnforcementAction::Block => ActionStatus::Block,
            EnforcementAction::Escalate => ActionStatus::Escalate,
        }
    }
}

/// Result of one governed action. `result` is `Some` only for
/// ALLOW/DEGRADE; refused actions carry the status alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome<T> {
    pub status: ActionStatus,
    pub result: Option<T>,
}

/// Package `(trace, authority, policy, effect)` into one gated call.
pub fn governed_action<T, E, F>(
    trace: &DecisionDraft,
    authority: Option<&AuthorityInstance>,
    policy: &[Imperative],
    effect: F,
) -> ActionOutcome<T>
where
    F: FnOnce() -> Result<T, E>,
{
    match gate::execute_governed(trace, authority, policy, effect) {
        GateVerdict::Executed {
            result,
            enforcement,
        } => ActionOutcome {
            status: enforcement.into(),
            result: Some(result),
        },
        GateVerdict::Refused { enforcement } => ActionOutcome {
            status: enforcement.into(),
            result: None,
        },
    }
}
