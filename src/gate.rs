//! Execution gate: the refusal-first firewall around governed side effects.
//!
//! One pass per invocation: validate the candidate record, compile and
//! evaluate constraints, then either run the caller's effect exactly once
//! or refuse without running it. Every failure mode - malformed record,
//! refusal-class verdict, failing effect - folds into a refusal; nothing
//! is ever re-thrown past the gate (fail-closed).
//!
//! The gate never touches the audit log. Appending the decision afterward
//! is the caller's responsibility, so a slow or unavailable log can never
//! stall a verdict.

use crate::authority::AuthorityInstance;
use crate::constraint::{self, EnforcementAction, Imperative};
use crate::decision::{DecisionDraft, DecisionRecord};

/// Outcome of the bare gate: the effect either completed or was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    Completed(T),
    Refused,
}

/// Outcome of the integrated gate. `Executed` carries ALLOW or DEGRADE;
/// `Refused` carries BLOCK or ESCALATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict<T> {
    Executed {
        result: T,
        enforcement: EnforcementAction,
    },
    Refused {
        enforcement: EnforcementAction,
    },
}

impl<T> GateVerdict<T> {
    pub fn enforcement(&self) -> EnforcementAction {
        match self {
            GateVerdict::Executed { enforcement, .. } => *enforcement,
            GateVerdict::Refused { enforcement } => *enforcement,
        }
    }
}

/// Bare gate: run `effect` only if `candidate` reconstructs into a valid
/// decision record. The effect's error type is opaque to the gate; any
/// `Err` becomes a refusal.
pub fn run_gated<T, E, F>(candidate: &DecisionDraft, effect: F) -> GateOutcome<T>
where
    F: FnOnce() -> Result<T, E>,
{
    if DecisionRecord::new(candidate.clone()).is_err() {
        return GateOutcome::Refused;
    }
    match effect() {
        Ok(result) => GateOutcome::Completed(result),
        Err(_) => GateOutcome::Refused,
    }
}

/// Integrated gate: validate, compile, evaluate, then conditionally execute.
///
/// An invalid record refuses with BLOCK before any constraint is compiled.
/// BLOCK and ESCALATE verdicts never invoke the effect. On ALLOW and
/// DEGRADE the effect runs exactly once; a failing effect refuses with
/// BLOCK, identically to a policy refusal.
pub fn execute_governed<T, E, F>(
    candidate: &DecisionDraft,
    authority: Option<&AuthorityInstance>,
    policy: &[Imperative],
    effect: F,
) -> GateVerdict<T>
where
    F: FnOnce() -> Result<T, E>,
{
    let record = match DecisionRecord::new(candidate.clone()) {
        Ok(record) => record,
        Err(_) => {
            return GateVerdict::Refused {
                enforcement: EnforcementAction::Block,
            };
        }
    };

    let compiled = constraint::compile_constraints(policy, &record, authority);
    let verdict = constraint::evaluate_constraints(&compiled);

    match verdict {
        EnforcementAction::Block | EnforcementAction::Escalate => GateVerdict::Refused {
            enforcement: verdict,
        },
        EnforcementAction::Allow | EnforcementAction::Degrade => match effect() {
            Ok(result) => GateVerdict::Executed {
                result,
                enforcement: verdict,
            },
            Err(_) => GateVerdict::Refused {
                enforcement: EnforcementAction::Block,
            },
        },
    }
}
