//! Audit events and journal records.
//!
//! An [`AuditEvent`] is emitted whenever the authorized set actually
//! changes. The journal wraps each event in an [`AuditRecord`] carrying a
//! gap-free sequence number and the time it was committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use steward_core::Principal;

/// What happened to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// The subject became authorized.
    Granted,
    /// The subject stopped being authorized.
    Revoked,
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => f.write_str("granted"),
            Self::Revoked => f.write_str("revoked"),
        }
    }
}

/// Immutable record of a successful grant or revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Principal that issued the call.
    pub actor: Principal,
    /// Principal whose authorization changed.
    pub subject: Principal,
    /// Direction of the change.
    pub kind: AuditEventKind,
}

impl AuditEvent {
    /// A `Granted` event.
    #[must_use]
    pub const fn granted(actor: Principal, subject: Principal) -> Self {
        Self {
            actor,
            subject,
            kind: AuditEventKind::Granted,
        }
    }

    /// A `Revoked` event.
    #[must_use]
    pub const fn revoked(actor: Principal, subject: Principal) -> Self {
        Self {
            actor,
            subject,
            kind: AuditEventKind::Revoked,
        }
    }

    /// Human-readable one-line description.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "{} {} by {}",
            self.subject.short(),
            self.kind,
            self.actor.short()
        )
    }
}

/// An audit event as committed to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Zero-based position in the journal.
    pub sequence: u64,
    /// When the record was committed.
    pub recorded_at: DateTime<Utc>,
    /// The event itself.
    pub event: AuditEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let a = Principal::derive("a");
        let b = Principal::derive("b");

        let granted = AuditEvent::granted(a, b);
        assert_eq!(granted.kind, AuditEventKind::Granted);
        assert_eq!(granted.actor, a);
        assert_eq!(granted.subject, b);

        assert_eq!(AuditEvent::revoked(a, b).kind, AuditEventKind::Revoked);
    }

    #[test]
    fn test_record_json_shape() {
        let p = Principal::from_bytes([1u8; 32]);
        let record = AuditRecord {
            sequence: 3,
            recorded_at: Utc::now(),
            event: AuditEvent::revoked(p, p),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sequence"], 3);
        assert_eq!(json["event"]["kind"], "revoked");
        assert_eq!(json["event"]["actor"], "01".repeat(32));
    }

    #[test]
    fn test_description() {
        let p = Principal::from_bytes([0xcd; 32]);
        assert_eq!(
            AuditEvent::granted(p, p).description(),
            "cdcdcdcd granted by cdcdcdcd"
        );
    }
}
