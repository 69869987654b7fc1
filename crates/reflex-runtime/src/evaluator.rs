//! [`Evaluator`] – selecting one behavior per reactive cycle.
//!
//! The rule table is re-consulted on every call, never snapshotted, so a
//! behavior redefined by an inbound message takes effect on the very next
//! cycle without a restart.
//!
//! Guards are not mutually exclusive by construction (two near targets can
//! satisfy `stop` and `go_back` at once). Under the default
//! [`ConflictPolicy::FirstMatch`] the declared table order resolves the
//! overlap deterministically; [`ConflictPolicy::Strict`] surfaces it
//! instead, yielding [`Evaluation::Conflict`] and dispatching nothing.

use reflex_kb::{KnowledgeStore, RuleTable};
use reflex_types::Decision;
use tracing::debug;

/// How overlapping rule matches are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Scan in declared order, first satisfied guard wins.
    #[default]
    FirstMatch,
    /// Collect every satisfied guard; more than one is a reported conflict.
    Strict,
}

/// Outcome of evaluating one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Exactly one behavior selected.
    Decision(Decision),
    /// `Strict` only: two or more behaviors matched, names in priority order.
    Conflict(Vec<String>),
    /// No guard held; the cycle ends without dispatch or clearing.
    NoMatch,
}

/// Scans the live rule table against the working memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator {
    policy: ConflictPolicy,
}

impl Evaluator {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Determine the behavior to enact this cycle.
    pub fn evaluate(&self, rules: &RuleTable, store: &KnowledgeStore) -> Evaluation {
        match self.policy {
            ConflictPolicy::FirstMatch => rules
                .iter()
                .find(|rule| rule.guard.satisfied(store))
                .map(|rule| {
                    debug!(behavior = %rule.name, command = %rule.template, "rule fired");
                    Evaluation::Decision(Decision::new(&rule.name, &rule.template))
                })
                .unwrap_or(Evaluation::NoMatch),

            ConflictPolicy::Strict => {
                let matched: Vec<_> = rules
                    .iter()
                    .filter(|rule| rule.guard.satisfied(store))
                    .collect();
                match matched.as_slice() {
                    [] => Evaluation::NoMatch,
                    [rule] => Evaluation::Decision(Decision::new(&rule.name, &rule.template)),
                    many => Evaluation::Conflict(
                        many.iter().map(|rule| rule.name.clone()).collect(),
                    ),
                }
            }
        }
    }
}
