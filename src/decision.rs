//! Decision record schema, validation, and canonical serialization.
//!
//! A [`DecisionDraft`] is an unvalidated candidate supplied by a caller.
//! [`DecisionRecord::new`] either returns a frozen record or fails with a
//! `ValidationError` naming the first invariant violated - there is no
//! partial construction and no silent coercion. Once constructed, a record
//! exposes read-only accessors; nothing in the crate can mutate it.

use crate::error::MandateError;
use crate::time;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Version-4 UUID shape, the only accepted decision-id format.
static DECISION_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .unwrap()
});

/// Opaque reference to data that informed a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub provenance: String,
}

/// Reference to a policy rule that was considered, pinned to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRef {
    pub id: String,
    pub version: String,
}

/// Whether output was withheld, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    pub suppressed: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecayCurve {
    Linear,
    Exponential,
    Step,
    Custom,
}

/// Write-once confidence attached to the decision. `value` must lie in
/// `[0, 1]`; `decay_params` is a sorted map so canonical serialization
/// stays deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub value: f64,
    pub decay_curve: DecayCurve,
    #[serde(default)]
    pub decay_params: BTreeMap<String, serde_json::Value>,
}

/// Signed, timestamped binding of an authority to this decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratification {
    pub authority_id: String,
    pub ratified_at: String,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalState {
    Halt,
    SafeMode,
    DeadEndRefusal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionReason {
    NoValidAuthority,
    CircularEscalation,
    SaturatedEscalation,
}

/// Declares that every escalation avenue was exhausted. An exhausted
/// decision must say how it terminated and how the dead end was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustionFlag {
    pub exhausted: bool,
    #[serde(default)]
    pub terminal_state: Option<TerminalState>,
    #[serde(default)]
    pub detection_reason: Option<DetectionReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Full,
    Partial,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub reversible: bool,
    #[serde(default)]
    pub expiry: Option<String>,
}

/// Unvalidated candidate decision record, exactly as a caller supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDraft {
    pub decision_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub inputs: Vec<InputRef>,
    pub constraints_applied: Vec<ConstraintRef>,
    #[serde(default)]
    pub suppression: Suppression,
    pub confidence: Confidence,
    pub authority_ratification: Option<Ratification>,
    #[serde(default)]
    pub escalation_path: Vec<String>,
    #[serde(default)]
    pub exhaustion_flag: ExhaustionFlag,
    pub outcome: Outcome,
}

/// A validated, frozen decision record.
///
/// The inner draft is private; the only way in is [`DecisionRecord::new`]
/// and the only way out is the read-only accessors (or [`Self::as_draft`]
/// for audit hashing). Serializes identically to the draft it was built
/// from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionRecord {
    draft: DecisionDraft,
}

impl DecisionRecord {
    /// Validate `draft` and freeze it. Checks run in a fixed order and the
    /// error names the first invariant violated.
    pub fn new(draft: DecisionDraft) -> Result<Self, MandateError> {
        validate_draft(&draft)?;
        Ok(DecisionRecord { draft })
    }

    pub fn decision_id(&self) -> &str {
        &self.draft.decision_id
    }

    pub fn timestamp(&self) -> &str {
        &self.draft.timestamp
    }

    pub fn inputs(&self) -> &[InputRef] {
        &self.draft.inputs
    }

    pub fn constraints_applied(&self) -> &[ConstraintRef] {
        &self.draft.constraints_applied
    }

    pub fn suppression(&self) -> &Suppression {
        &self.draft.suppression
    }

    pub fn confidence(&self) -> &Confidence {
        &self.draft.confidence
    }

    pub fn authority_ratification(&self) -> Option<&Ratification> {
        self.draft.authority_ratification.as_ref()
    }

    pub fn escalation_path(&self) -> &[String] {
        &self.draft.escalation_path
    }

    pub fn exhaustion_flag(&self) -> &ExhaustionFlag {
        &self.draft.exhaustion_flag
    }

    pub fn outcome(&self) -> &Outcome {
        &self.draft.outcome
    }

    /// Borrow the underlying draft, e.g. for audit-log hashing.
    pub fn as_draft(&self) -> &DecisionDraft {
        &self.draft
    }
}

/// Deterministic serialization of a decision, the payload the audit log
/// hashes. Field order follows the struct definition and all maps are
/// sorted, so equal decisions always canonicalize to equal bytes.
pub fn canonical_json(draft: &DecisionDraft) -> Result<String, MandateError> {
    Ok(serde_json::to_string(draft)?)
}

fn validate_draft(draft: &DecisionDraft) -> Result<(), MandateError> {
    if !DECISION_ID_RE.is_match(&draft.decision_id) {
        return Err(MandateError::invalid(format!(
            "decision_id '{}' is not a version-4 UUID",
            draft.decision_id
        )));
    }

    time::parse_rfc3339("timestamp", &draft.timestamp)?;

    if draft.constraints_applied.is_empty() {
        return Err(MandateError::invalid(
            "constraints_applied is empty: a decision must trace to at least one rule",
        ));
    }

    if !(0.0..=1.0).contains(&draft.confidence.value) {
        return Err(MandateError::invalid(format!(
            "confidence.value {} is outside [0, 1]",
            draft.confidence.value
        )));
    }

    let mut seen = HashSet::new();
    for authority_id in &draft.escalation_path {
        if !seen.insert(authority_id.as_str()) {
            return Err(MandateError::invalid(format!(
                "escalation_path contains duplicate authority '{}'",
                authority_id
            )));
        }
    }

    if draft.authority_ratification.is_none() && !draft.exhaustion_flag.exhausted {
        return Err(MandateError::invalid(
            "decision carries neither an authority ratification nor an exhaustion flag",
        ));
    }

    if draft.exhaustion_flag.exhausted && draft.outcome.status != OutcomeStatus::None {
        return Err(MandateError::invalid(
            "an exhausted decision must carry outcome status NONE",
        ));
    }

    if let Some(expiry) = &draft.outcome.expiry {
        time::parse_rfc3339("outcome.expiry", expiry)?;
    }

    if let Some(ratification) = &draft.authority_ratification {
        if ratification.authority_id.trim().is_empty() {
            return Err(MandateError::invalid(
                "authority_ratification.authority_id is blank",
            ));
        }
        time::parse_rfc3339(
            "authority_ratification.ratified_at",
            &ratification.ratified_at,
        )?;
        if ratification.signature.trim().is_empty() {
            return Err(MandateError::invalid(
                "authority_ratification.signature is blank",
            ));
        }
    }

    let exhaustion = &draft.exhaustion_flag;
    if exhaustion.exhausted
        && (exhaustion.terminal_state.is_none() || exhaustion.detection_reason.is_none())
    {
        return Err(MandateError::invalid(
            "an exhausted decision must declare both terminal_state and detection_reason",
        ));
    }
    if !exhaustion.exhausted
        && (exhaustion.terminal_state.is_some() || exhaustion.detection_reason.is_some())
    {
        return Err(MandateError::invalid(
            "terminal_state/detection_reason are only valid on an exhausted decision",
        ));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal valid ratified draft used across the crate's unit tests.
    pub(crate) fn ratified_draft() -> DecisionDraft {
        DecisionDraft {
            decision_id: time::new_decision_id(),
            timestamp: time::now_rfc3339(),
            inputs: vec![InputRef {
                id: "input-1".to_string(),
                kind: "observation".to_string(),
                provenance: "source://unit-test".to_string(),
            }],
            constraints_applied: vec![ConstraintRef {
                id: "rule-1".to_string(),
                version: "1.0.0".to_string(),
            }],
            suppression: Suppression::default(),
            confidence: Confidence {
                value: 0.9,
                decay_curve: DecayCurve::Linear,
                decay_params: BTreeMap::new(),
            },
            authority_ratification: Some(Ratification {
                authority_id: "auth-human-1".to_string(),
                ratified_at: time::now_rfc3339(),
                signature: "sig:unit-test".to_string(),
            }),
            escalation_path: vec!["auth-human-1".to_string()],
            exhaustion_flag: ExhaustionFlag::default(),
            outcome: Outcome {
                status: OutcomeStatus::Full,
                reversible: true,
                expiry: None,
            },
        }
    }

    /// Minimal valid exhausted draft (no ratification, outcome NONE).
    pub(crate) fn exhausted_draft() -> DecisionDraft {
        let mut draft = ratified_draft();
        draft.authority_ratification = None;
        draft.exhaustion_flag = ExhaustionFlag {
            exhausted: true,
            terminal_state: Some(TerminalState::SafeMode),
            detection_reason: Some(DetectionReason::NoValidAuthority),
        };
        draft.outcome.status = OutcomeStatus::None;
        draft
    }

    #[test]
    fn test_valid_ratified_draft_freezes() {
        let draft = ratified_draft();
        let record = DecisionRecord::new(draft.clone()).unwrap();
        assert_eq!(record.decision_id(), draft.decision_id);
        assert_eq!(record.as_draft(), &draft);
    }

    #[test]
    fn test_valid_exhausted_draft_freezes() {
        let record = DecisionRecord::new(exhausted_draft()).unwrap();
        assert!(record.exhaustion_flag().exhausted);
        assert_eq!(record.outcome().status, OutcomeStatus::None);
    }

    #[test]
    fn test_accepts_well_formed_v4_uuid() {
        // Known-good v4 UUID with the full 8-4-4-4-12 shape.
        let mut draft = ratified_draft();
        draft.decision_id = "f47ac10b-58cc-4372-a567-0e02b2c3d479".to_string();
        assert!(DecisionRecord::new(draft.clone()).is_ok());

        // Uppercase hex is accepted too.
        draft.decision_id = "F47AC10B-58CC-4372-A567-0E02B2C3D479".to_string();
        assert!(DecisionRecord::new(draft.clone()).is_ok());

        // Ids minted by the crate itself must always pass.
        draft.decision_id = time::new_decision_id();
        assert!(DecisionRecord::new(draft).is_ok());
    }

    #[test]
    fn test_rejects_malformed_decision_id() {
        let mut draft = ratified_draft();
        draft.decision_id = "not-a-uuid".to_string();
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("decision_id"));
    }

    #[test]
    fn test_rejects_non_v4_uuid() {
        let mut draft = ratified_draft();
        // Valid UUID shape but version nibble is 1, not 4.
        draft.decision_id = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_string();
        assert!(DecisionRecord::new(draft).is_err());
    }

    #[test]
    fn test_rejects_malformed_timestamp() {
        let mut draft = ratified_draft();
        draft.timestamp = "yesterday".to_string();
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_rejects_empty_constraints() {
        let mut draft = ratified_draft();
        draft.constraints_applied.clear();
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("constraints_applied"));
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        for bad in [-0.01, 1.01, f64::NAN] {
            let mut draft = ratified_draft();
            draft.confidence.value = bad;
            assert!(DecisionRecord::new(draft).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_accepts_confidence_bounds() {
        for ok in [0.0, 1.0] {
            let mut draft = ratified_draft();
            draft.confidence.value = ok;
            assert!(DecisionRecord::new(draft).is_ok());
        }
    }

    #[test]
    fn test_rejects_duplicate_escalation_entries() {
        let mut draft = ratified_draft();
        draft.escalation_path = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("escalation_path"));
    }

    #[test]
    fn test_rejects_unaccountable_decision() {
        let mut draft = ratified_draft();
        draft.authority_ratification = None;
        // exhaustion_flag stays default (not exhausted)
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("neither"));
    }

    #[test]
    fn test_rejects_exhausted_with_non_none_outcome() {
        let mut draft = exhausted_draft();
        draft.outcome.status = OutcomeStatus::Partial;
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("NONE"));
    }

    #[test]
    fn test_rejects_malformed_expiry() {
        let mut draft = ratified_draft();
        draft.outcome.expiry = Some("soon".to_string());
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("outcome.expiry"));
    }

    #[test]
    fn test_rejects_blank_ratification_signature() {
        let mut draft = ratified_draft();
        draft.authority_ratification.as_mut().unwrap().signature = "  ".to_string();
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("signature"));
    }

    #[test]
    fn test_rejects_exhaustion_missing_subfields() {
        let mut draft = exhausted_draft();
        draft.exhaustion_flag.detection_reason = None;
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("detection_reason"));
    }

    #[test]
    fn test_rejects_stray_exhaustion_subfields() {
        let mut draft = ratified_draft();
        draft.exhaustion_flag.terminal_state = Some(TerminalState::Halt);
        assert!(DecisionRecord::new(draft).is_err());
    }

    #[test]
    fn test_validation_order_reports_first_violation() {
        // Both the id and the timestamp are bad; the id check runs first.
        let mut draft = ratified_draft();
        draft.decision_id = "bad".to_string();
        draft.timestamp = "also bad".to_string();
        let err = DecisionRecord::new(draft).unwrap_err();
        assert!(err.to_string().contains("decision_id"));
    }

    #[test]
    fn test_canonical_json_is_deterministic() {
        let mut draft = ratified_draft();
        draft
            .confidence
            .decay_params
            .insert("half_life".to_string(), serde_json::json!(3600));
        draft
            .confidence
            .decay_params
            .insert("floor".to_string(), serde_json::json!(0.1));
        let a = canonical_json(&draft).unwrap();
        let b = canonical_json(&draft.clone()).unwrap();
        assert_eq!(a, b);
        // Sorted map keys: floor before half_life.
        assert!(a.find("floor").unwrap() < a.find("half_life").unwrap());
    }

    #[test]
    fn test_record_serializes_like_its_draft() {
        let draft = ratified_draft();
        let record = DecisionRecord::new(draft.clone()).unwrap();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            serde_json::to_string(&draft).unwrap()
        );
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&DecayCurve::Exponential).unwrap(),
            "\"EXPONENTIAL\""
        );
        assert_eq!(
            serde_json::to_string(&TerminalState::DeadEndRefusal).unwrap(),
            "\"DEAD_END_REFUSAL\""
        );
        assert_eq!(
            serde_json::to_string(&DetectionReason::CircularEscalation).unwrap(),
            "\"CIRCULAR_ESCALATION\""
        );
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::None).unwrap(),
            "\"NONE\""
        );
    }
}
