use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Well-known predicate names in the agent's knowledge base.
///
/// The first three are *transient perception* predicates: the dispatcher
/// retracts all of their tuples after every successful action dispatch.
/// `agentname/1` is set once and never cleared.
pub mod predicate {
    /// `vision(color, zone)` – a sighted target. Multiple simultaneous
    /// tuples are legal (two coloured targets in view at once).
    pub const VISION: &str = "vision";
    /// `depth(category)` – obstacle proximity, independent of any target.
    pub const DEPTH: &str = "depth";
    /// `load(state)` – current payload status.
    pub const LOAD: &str = "load";
    /// `agentname(name)` – the agent's outbound-message address prefix.
    pub const AGENT_NAME: &str = "agentname";

    /// The perception predicates cleared after each dispatch, in retract order.
    pub const PERCEPTION: [&str; 3] = [VISION, DEPTH, LOAD];
}

/// Closed atom vocabularies used by the standard behavior guards.
pub mod atom {
    pub const NEAR: &str = "near";
    pub const FAR: &str = "far";
    pub const CENTER: &str = "center";
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";

    pub const GREEN: &str = "green";
    pub const RED: &str = "red";

    pub const FULL: &str = "full";
    pub const EMPTY: &str = "empty";
}

/// One unit of traffic on the coordination channel.
///
/// `body` is the opaque text payload: for inbound traffic, a framed blob of
/// period-terminated clause declarations; for outbound traffic, the agent's
/// identity concatenated with a formatted action string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "reflex-runtime::dispatcher"
    pub source: String,
    pub body: String,
}

impl Envelope {
    /// Build a fresh envelope stamped with a new id and the current time.
    pub fn new(source: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            body: body.into(),
        }
    }
}

/// The evaluator's output for one reactive cycle: the selected behavior name
/// and its formatted action string (e.g. `right:90`, `go:2`, `stop`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub behavior: String,
    pub command: String,
}

impl Decision {
    pub fn new(behavior: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
            command: command.into(),
        }
    }
}

/// Global error type spanning clause parsing, channel transport, and
/// ingestion failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflexError {
    #[error("clause parse error in {text:?}: {reason}")]
    ClauseParse { text: String, reason: String },

    #[error("channel error: {0}")]
    Channel(String),

    #[error("agent identity has not been set")]
    MissingIdentity,

    #[error("ingestion rejected message: {0}")]
    Ingest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_roundtrip() {
        let env = Envelope::new("reflex-runtime::dispatcher", "bot1go:2");
        let json = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(env.id, back.id);
        assert_eq!(back.body, "bot1go:2");
    }

    #[test]
    fn decision_roundtrip() {
        let decision = Decision::new("avoid", "right:90");
        let json = serde_json::to_string(&decision).unwrap();
        let back: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decision);
    }

    #[test]
    fn error_display_names_offending_text() {
        let err = ReflexError::ClauseParse {
            text: "vision(green".to_string(),
            reason: "unterminated argument list".to_string(),
        };
        assert!(err.to_string().contains("vision(green"));

        let err2 = ReflexError::MissingIdentity;
        assert!(err2.to_string().contains("identity"));
    }

    #[test]
    fn perception_predicates_cover_all_transient_state() {
        assert_eq!(
            predicate::PERCEPTION,
            [predicate::VISION, predicate::DEPTH, predicate::LOAD]
        );
    }
}
