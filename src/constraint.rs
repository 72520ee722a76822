//! Constraint compiler: declarative imperatives to an enforcement verdict.
//!
//! Compilation is a pure function over an already-validated record and an
//! optional authority. Each imperative either holds (no output) or emits
//! one [`CompiledConstraint`]; the verdict is the most severe action
//! present, so a refusal can never be downgraded by a later, softer rule.

use crate::authority::{AuthorityInstance, AuthorityRole};
use crate::decision::DecisionRecord;
use serde::{Deserialize, Serialize};

/// Named policy rules the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Imperative {
    Truth,
    Accountability,
    NonCoerciveCompassion,
    HumanStopAuthority,
    ReversibilityRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnforcementAction {
    Allow,
    Degrade,
    Escalate,
    Block,
}

impl EnforcementAction {
    /// Fixed total order for verdict reduction: BLOCK > ESCALATE > DEGRADE > ALLOW.
    fn severity(self) -> u8 {
        match self {
            EnforcementAction::Allow => 0,
            EnforcementAction::Degrade => 1,
            EnforcementAction::Escalate => 2,
            EnforcementAction::Block => 3,
        }
    }
}

/// Per-evaluation derived value: one violated imperative and the action
/// it demands. Never persisted by the kernel itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledConstraint {
    pub imperative: Imperative,
    pub action: EnforcementAction,
    pub reason: String,
}

/// Compile `policy` against a validated record. Satisfied imperatives
/// produce no entry.
pub fn compile_constraints(
    policy: &[Imperative],
    record: &DecisionRecord,
    authority: Option<&AuthorityInstance>,
) -> Vec<CompiledConstraint> {
    let mut compiled = Vec::new();

    for imperative in policy {
        match imperative {
            // Low confidence softens output rather than silencing it.
            Imperative::Truth => {
                let value = record.confidence().value;
                if value < 0.5 {
                    compiled.push(CompiledConstraint {
                        imperative: Imperative::Truth,
                        action: EnforcementAction::Degrade,
                        reason: format!("confidence {:.2} is below the 0.5 truth floor", value),
                    });
                }
            }
            // Every accountable action traces to a ratifying authority or
            // an explicitly declared dead end.
            Imperative::Accountability => {
                if record.authority_ratification().is_none()
                    && !record.exhaustion_flag().exhausted
                {
                    compiled.push(CompiledConstraint {
                        imperative: Imperative::Accountability,
                        action: EnforcementAction::Block,
                        reason: "no ratifying authority and no exhaustion declaration".to_string(),
                    });
                }
            }
            // Suppression is never auto-approved.
            Imperative::NonCoerciveCompassion => {
                if record.suppression().suppressed {
                    compiled.push(CompiledConstraint {
                        imperative: Imperative::NonCoerciveCompassion,
                        action: EnforcementAction::Escalate,
                        reason: "suppressed output requires oversight review".to_string(),
                    });
                }
            }
            Imperative::HumanStopAuthority => {
                let human_present =
                    authority.is_some_and(|a| a.role == AuthorityRole::Human);
                if !human_present {
                    compiled.push(CompiledConstraint {
                        imperative: Imperative::HumanStopAuthority,
                        action: EnforcementAction::Block,
                        reason: "no human stop authority is present".to_string(),
                    });
                }
            }
            Imperative::ReversibilityRequired => {
                if !record.outcome().reversible {
                    compiled.push(CompiledConstraint {
                        imperative: Imperative::ReversibilityRequired,
                        action: EnforcementAction::Block,
                        reason: "outcome is not reversible".to_string(),
                    });
                }
            }
        }
    }

    compiled
}

/// Reduce compiled constraints to the single governing verdict. An empty
/// list is ALLOW.
pub fn evaluate_constraints(constraints: &[CompiledConstraint]) -> EnforcementAction {
    constraints
        .iter()
        .fold(EnforcementAction::Allow, |verdict, constraint| {
            if constraint.action.severity() > verdict.severity() {
                constraint.action
            } else {
                verdict
            }
        })
}
