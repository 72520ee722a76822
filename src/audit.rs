//! Tamper-evident audit log: append-only, hash-chained JSONL.
//!
//! One line per governed decision. Each entry's hash commits to the
//! previous entry's hash, so inserting, deleting, reordering, or editing
//! any line breaks the chain at or after that point. The log sits outside
//! the gate's critical path: callers append after receiving a verdict.
//!
//! Read-last-line-then-append is a check-then-act sequence, so every
//! operation runs under the handle's internal lock - one `AuditLog` per
//! stream is the required single-writer discipline.

use crate::decision::{self, DecisionDraft};
use crate::error::MandateError;
use crate::time;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Sentinel `prev_hash` of the first entry in a chain.
pub const GENESIS_HASH: &str = "GENESIS";

/// Entry format version, committed into `entry_hash` so the verification
/// logic can evolve without silently breaking old logs.
pub const AUDIT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub schema_version: String,
    pub index: u64,
    pub timestamp: String,
    pub decision_id: String,
    pub trace_hash: String,
    pub prev_hash: String,
    pub entry_hash: String,
}

/// Handle to one append-only audit stream.
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AuditLog {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one decision to the chain and return the entry written.
    ///
    /// Accepts a draft rather than a frozen record so refused candidates
    /// reach the trail too - every decision with a verdict gets logged.
    /// I/O failures propagate: silently dropping an audit entry would be
    /// worse than a loud error.
    pub fn append(&self, decision: &DecisionDraft) -> Result<AuditEntry, MandateError> {
        let _guard = self.lock.lock().unwrap();

        let trace_hash = decision_trace_hash(decision)?;
        let (index, prev_hash) = match self.last_entry()? {
            Some(last) => (last.index + 1, last.entry_hash),
            None => (0, GENESIS_HASH.to_string()),
        };
        let timestamp = time::now_rfc3339();
        let entry_hash = compute_entry_hash(
            AUDIT_SCHEMA_VERSION,
            index,
            &timestamp,
            &decision.decision_id,
            &trace_hash,
            &prev_hash,
        );

        let entry = AuditEntry {
            schema_version: AUDIT_SCHEMA_VERSION.to_string(),
            index,
            timestamp,
            decision_id: decision.decision_id.clone(),
            trace_hash,
            prev_hash,
            entry_hash,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(MandateError::IoError)?;
        writeln!(file, "{}", serde_json::to_string(&entry)?).map_err(MandateError::IoError)?;

        Ok(entry)
    }

    /// Replay the whole chain from GENESIS. Returns `false` at the first
    /// broken link, recomputed-hash mismatch, index gap, or unparseable
    /// line; an empty or absent log verifies trivially. I/O errors still
    /// propagate - an unreadable log is an incident of its own.
    pub fn verify(&self) -> Result<bool, MandateError> {
        let _guard = self.lock.lock().unwrap();

        if !self.path.exists() {
            return Ok(true);
        }
        let content = std::fs::read_to_string(&self.path).map_err(MandateError::IoError)?;

        let mut expected_prev = GENESIS_HASH.to_string();
        let mut expected_index: u64 = 0;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let entry: AuditEntry = match serde_json::from_str(line) {
                Ok(entry) => entry,
                Err(_) => return Ok(false),
            };
            if entry.index != expected_index || entry.prev_hash != expected_prev {
                return Ok(false);
            }
            let recomputed = compute_entry_hash(
                &entry.schema_version,
                entry.index,
                &entry.timestamp,
                &entry.decision_id,
                &entry.trace_hash,
                &entry.prev_hash,
            );
            if recomputed != entry.entry_hash {
                return Ok(false);
            }
            expected_prev = entry.entry_hash;
            expected_index += 1;
        }

        Ok(true)
    }

    /// Last `n` entries, oldest first, for forensic inspection.
    pub fn tail(&self, n: usize) -> Result<Vec<AuditEntry>, MandateError> {
        let _guard = self.lock.lock().unwrap();

        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(MandateError::IoError)?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(n);
        lines[start..]
            .iter()
            .map(|line| serde_json::from_str(line).map_err(MandateError::SerdeError))
            .collect()
    }

    fn last_entry(&self) -> Result<Option<AuditEntry>, MandateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(MandateError::IoError)?;
        match content.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => Ok(Some(serde_json::from_str(line)?)),
            None => Ok(None),
        }
    }
}

/// SHA-256 over the canonical serialization of a decision.
pub fn decision_trace_hash(decision: &DecisionDraft) -> Result<String, MandateError> {
    let payload = decision::canonical_json(decision)?;
    Ok(sha256_hex(payload.as_bytes()))
}

fn compute_entry_hash(
    schema_version: &str,
    index: u64,
    timestamp: &str,
    decision_id: &str,
    trace_hash: &str,
    prev_hash: &str,
) -> String {
    let preimage = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        schema_version, index, timestamp, decision_id, trace_hash, prev_hash
    );
    sha256_hex(preimage.as_bytes())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
