//! Mandate: a governed execution kernel.
//!
//! Mandate gates arbitrary side-effecting operations behind an immutable,
//! schema-validated decision record, an authority/ratification model with
//! emergency override, a deterministic constraint compiler, and a
//! tamper-evident append-only audit trail.
//!
//! # Core principles
//!
//! - **Refusal-first**: no side effect runs without a structurally valid,
//!   policy-evaluated decision record. Malformed input is a BLOCK, never
//!   an exception escaping the gate.
//! - **Fail-closed**: a failing effect is indistinguishable from a policy
//!   refusal to callers.
//! - **Pure evaluation**: record construction, constraint compilation, and
//!   verdict reduction are synchronous, re-entrant functions with no
//!   shared state; the audit log is the only persistence and sits outside
//!   the gate's critical path.
//! - **Forensic replay**: every decision reaching a verdict is appended to
//!   a hash chain; `AuditLog::verify` detects any insertion, deletion,
//!   reorder, or edit.
//!
//! # Entry points
//!
//! Collaborators use three calls: [`governed_action`] to run an effect
//! under policy, [`AuditLog::append`] after every verdict, and
//! [`AuditLog::verify`] from operational tooling.
//!
//! ```no_run
//! use mandate::{governed_action, ActionStatus, AuditLog, Imperative};
//! # fn draft() -> mandate::DecisionDraft { unimplemented!() }
//!
//! let log = AuditLog::new("decisions.audit.jsonl");
//! let trace = draft();
//! let outcome = governed_action(&trace, None, &[Imperative::Truth], || {
//!     Ok::<_, std::io::Error>("message sent")
//! });
//! log.append(&trace)?;
//! if outcome.status == ActionStatus::Escalate {
//!     // hand off to an oversight workflow; the kernel only reports intent
//! }
//! # Ok::<(), mandate::MandateError>(())
//! ```
//!
//! # Crate structure
//!
//! - [`decision`]: decision record schema, constructor, canonical form
//! - [`authority`]: authority instances, ratification, break-glass
//! - [`constraint`]: imperative compiler and verdict reduction
//! - [`gate`]: refusal-first execution gate and its integration
//! - [`action`]: the one-call facade for collaborators
//! - [`audit`]: hash-chained append-only audit log

pub mod action;
pub mod audit;
pub mod authority;
pub mod constraint;
pub mod decision;
pub mod error;
pub mod gate;
pub mod time;

pub use action::{ActionOutcome, ActionStatus, governed_action};
pub use audit::{AUDIT_SCHEMA_VERSION, AuditEntry, AuditLog, GENESIS_HASH};
pub use authority::{
    AuthorityInstance, AuthorityRole, AuthorityScope, BreakGlassEvent, BreakGlassReason,
    RatificationMode, validate_authority_instance, validate_break_glass, validate_ratification,
};
pub use constraint::{
    CompiledConstraint, EnforcementAction, Imperative, compile_constraints, evaluate_constraints,
};
pub use decision::{
    Confidence, ConstraintRef, DecayCurve, DecisionDraft, DecisionRecord, DetectionReason,
    ExhaustionFlag, InputRef, Outcome, OutcomeStatus, Ratification, Suppression, TerminalState,
};
pub use error::MandateError;
pub use gate::{GateOutcome, GateVerdict, execute_governed, run_gated};

/// Machine-readable descriptor of the kernel's components and storage.
pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "mandate",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Governed execution kernel: decision records, authority model, constraint compiler, execution gate, audit chain",
        "components": [
            { "name": "decision", "description": "Immutable, schema-validated decision records" },
            { "name": "authority", "description": "Authority instances, ratification, break-glass override" },
            { "name": "constraint", "description": "Imperative compiler and BLOCK > ESCALATE > DEGRADE > ALLOW verdict reduction" },
            { "name": "gate", "description": "Refusal-first execution gate; fail-closed effect invocation" },
            { "name": "action", "description": "Single-call governed action facade" },
            { "name": "audit", "description": "Hash-chained append-only decision trail" }
        ],
        "storage": ["append-only JSONL audit chain, one stream per deployment"],
        "audit_schema_version": audit::AUDIT_SCHEMA_VERSION
    })
}
