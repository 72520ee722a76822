//! Authority model: roles, scopes, ratification, and break-glass override.
//!
//! The three validators here are pure predicates. They never log, never
//! touch state, and never decide what to do about a failure - callers
//! (the gate, or an external escalation workflow) own that.

use crate::decision::Ratification;
use crate::error::MandateError;
use crate::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityRole {
    Human,
    System,
    Oversight,
    BreakGlass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityScope {
    System,
    Domain,
    Workspace,
    Operation,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatificationMode {
    Explicit,
    MultiParty,
    TimeDelayed,
}

/// A role empowered to ratify or block decisions within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityInstance {
    pub authority_id: String,
    pub role: AuthorityRole,
    pub scope: AuthorityScope,
    pub ratification_mode: RatificationMode,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakGlassReason {
    ImminentHarm,
    SystemFailure,
    LegalRequirement,
}

/// Time-bounded emergency override, invocable only by a BREAK_GLASS role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakGlassEvent {
    pub authority_id: String,
    pub invoked_at: String,
    pub reason: BreakGlassReason,
    pub expires_at: String,
}

/// An authority is usable only if its id is well-formed, it is active,
/// and a BREAK_GLASS role is paired with the EMERGENCY scope.
pub fn validate_authority_instance(authority: &AuthorityInstance) -> Result<(), MandateError> {
    if authority.authority_id.trim().is_empty() {
        return Err(MandateError::invalid("authority_id is blank"));
    }
    if !authority.active {
        return Err(MandateError::invalid(format!(
            "authority '{}' is inactive",
            authority.authority_id
        )));
    }
    if authority.role == AuthorityRole::BreakGlass && authority.scope != AuthorityScope::Emergency {
        return Err(MandateError::invalid(format!(
            "BREAK_GLASS authority '{}' must have EMERGENCY scope",
            authority.authority_id
        )));
    }
    Ok(())
}

/// A ratification binds to exactly one authority: ids must match, the
/// timestamp must parse, and the signature must be non-blank.
pub fn validate_ratification(
    authority: &AuthorityInstance,
    ratification: &Ratification,
) -> Result<(), MandateError> {
    validate_authority_instance(authority)?;
    if ratification.authority_id != authority.authority_id {
        return Err(MandateError::invalid(format!(
            "ratification authority_id '{}' does not match authority '{}'",
            ratification.authority_id, authority.authority_id
        )));
    }
    time::parse_rfc3339("ratified_at", &ratification.ratified_at)?;
    if ratification.signature.trim().is_empty() {
        return Err(MandateError::invalid("ratification signature is blank"));
    }
    Ok(())
}

/// A break-glass invocation is valid only inside its window: invoked in
/// the past, expiring strictly after invocation, and not yet expired at
/// `now`. Only a BREAK_GLASS role may invoke it at all.
pub fn validate_break_glass(
    authority: &AuthorityInstance,
    event: &BreakGlassEvent,
    now: DateTime<Utc>,
) -> Result<(), MandateError> {
    validate_authority_instance(authority)?;
    if authority.role != AuthorityRole::BreakGlass {
        return Err(MandateError::invalid(format!(
            "authority '{}' lacks the BREAK_GLASS role",
            authority.authority_id
        )));
    }
    let invoked_at = time::parse_rfc3339("invoked_at", &event.invoked_at)?;
    let expires_at = time::parse_rfc3339("expires_at", &event.expires_at)?;
    if invoked_at > now {
        return Err(MandateError::invalid(
            "break-glass invoked_at is in the future",
        ));
    }
    if expires_at <= invoked_at {
        return Err(MandateError::invalid(
            "break-glass expires_at must be strictly after invoked_at",
        ));
    }
    if now >= expires_at {
        return Err(MandateError::invalid("break-glass event has expired"));
    }
    Ok(())
}
