//! [`KnowledgeStore`] – the agent's working memory.
//!
//! A mutable mapping from predicate name to a set of ground argument tuples.
//! A predicate may hold zero, one, or many simultaneous tuples (seeing two
//! coloured targets at once is two `vision/2` tuples).
//!
//! Perception facts (`vision`, `depth`, `load`) are transient: they live
//! between ingestion and the next successful dispatch, which calls
//! [`KnowledgeStore::clear_perception`]. Everything else asserted into the
//! store is durable and survives dispatch cycles.
//!
//! The store has no interior locking: the reactive loop owns it and hands it
//! out by reference, so every read-decide-clear sequence is serialised by
//! ownership alone.

use std::collections::HashMap;

use reflex_types::predicate;
use tracing::{debug, warn};

use crate::clause::Term;

/// Working memory: predicate name → set of ground argument tuples.
#[derive(Debug, Default, Clone)]
pub struct KnowledgeStore {
    facts: HashMap<String, Vec<Vec<String>>>,
}

impl KnowledgeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tuple under `pred`. Duplicates are idempotent: asserting the
    /// same fact twice leaves exactly one tuple observable.
    pub fn assert_fact(&mut self, pred: &str, tuple: Vec<String>) {
        let tuples = self.facts.entry(pred.to_string()).or_default();
        if tuples.contains(&tuple) {
            debug!(pred, ?tuple, "duplicate fact ignored");
            return;
        }
        tuples.push(tuple);
    }

    /// Remove every tuple stored under `pred`. A missing predicate is a
    /// no-op, never an error.
    pub fn retract_all(&mut self, pred: &str) {
        self.facts.remove(pred);
    }

    /// Restartable iterator over the tuples of `pred` that match `pattern`.
    ///
    /// [`Term::Wildcard`] matches any single argument value; an atom matches
    /// only itself. Tuples whose arity differs from the pattern never match.
    pub fn query<'a>(
        &'a self,
        pred: &'a str,
        pattern: &'a [Term],
    ) -> impl Iterator<Item = &'a [String]> + 'a {
        self.facts
            .get(pred)
            .map(|tuples| tuples.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(move |tuple| tuple_matches(tuple, pattern))
            .map(|tuple| tuple.as_slice())
    }

    /// `true` when at least one tuple of `pred` matches `pattern`.
    pub fn holds(&self, pred: &str, pattern: &[Term]) -> bool {
        self.query(pred, pattern).next().is_some()
    }

    /// Number of tuples currently stored under `pred`.
    pub fn count(&self, pred: &str) -> usize {
        self.facts.get(pred).map_or(0, Vec::len)
    }

    /// Retract all transient perception facts (`vision`, `depth`, `load`).
    ///
    /// This is the dispatcher's cleanup discipline: it runs unconditionally
    /// after an action is emitted, regardless of which rule fired.
    pub fn clear_perception(&mut self) {
        for pred in predicate::PERCEPTION {
            self.retract_all(pred);
        }
    }

    /// Set the agent's identity, stored as the single `agentname/1` tuple.
    ///
    /// Set-once: the first write wins; later writes are ignored with a
    /// warning. Returns `true` when the name was recorded.
    pub fn set_agent_name(&mut self, name: &str) -> bool {
        if let Some(existing) = self.agent_name() {
            warn!(existing, rejected = name, "agent identity is set-once; ignoring");
            return false;
        }
        self.assert_fact(predicate::AGENT_NAME, vec![name.to_string()]);
        true
    }

    /// The agent's identity, if it has been set.
    pub fn agent_name(&self) -> Option<&str> {
        self.facts
            .get(predicate::AGENT_NAME)
            .and_then(|tuples| tuples.first())
            .and_then(|tuple| tuple.first())
            .map(String::as_str)
    }
}

fn tuple_matches(tuple: &[String], pattern: &[Term]) -> bool {
    tuple.len() == pattern.len()
        && tuple.iter().zip(pattern).all(|(arg, term)| match term {
            Term::Wildcard => true,
            Term::Atom(atom) => arg == atom,
            // Ground tuples never contain compounds.
            Term::Compound { .. } => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_types::atom;

    fn atoms(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn assert_is_idempotent() {
        let mut store = KnowledgeStore::new();
        store.assert_fact(predicate::VISION, atoms(&["green", "near"]));
        store.assert_fact(predicate::VISION, atoms(&["green", "near"]));
        assert_eq!(store.count(predicate::VISION), 1);
    }

    #[test]
    fn multiple_vision_tuples_coexist() {
        let mut store = KnowledgeStore::new();
        store.assert_fact(predicate::VISION, atoms(&["green", "near"]));
        store.assert_fact(predicate::VISION, atoms(&["red", "left"]));
        assert_eq!(store.count(predicate::VISION), 2);
    }

    #[test]
    fn retract_all_missing_predicate_is_noop() {
        let mut store = KnowledgeStore::new();
        store.retract_all("never_asserted");
        assert_eq!(store.count("never_asserted"), 0);
    }

    #[test]
    fn wildcard_matches_any_color() {
        let mut store = KnowledgeStore::new();
        store.assert_fact(predicate::VISION, atoms(&["red", "near"]));
        store.assert_fact(predicate::VISION, atoms(&["green", "far"]));

        let pattern = [Term::Wildcard, Term::atom(atom::NEAR)];
        let near: Vec<_> = store.query(predicate::VISION, &pattern).collect();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0][0], "red");
    }

    #[test]
    fn query_is_restartable() {
        let mut store = KnowledgeStore::new();
        store.assert_fact(predicate::DEPTH, atoms(&["near"]));

        let pattern = [Term::atom(atom::NEAR)];
        assert_eq!(store.query(predicate::DEPTH, &pattern).count(), 1);
        // A second query over the same pattern starts fresh.
        assert_eq!(store.query(predicate::DEPTH, &pattern).count(), 1);
    }

    #[test]
    fn arity_mismatch_never_matches() {
        let mut store = KnowledgeStore::new();
        store.assert_fact(predicate::VISION, atoms(&["green", "near"]));
        assert!(!store.holds(predicate::VISION, &[Term::Wildcard]));
    }

    #[test]
    fn clear_perception_leaves_durable_facts() {
        let mut store = KnowledgeStore::new();
        store.assert_fact(predicate::VISION, atoms(&["green", "near"]));
        store.assert_fact(predicate::DEPTH, atoms(&["far"]));
        store.assert_fact(predicate::LOAD, atoms(&["full"]));
        store.assert_fact("waypoint", atoms(&["dock_a"]));
        store.set_agent_name("bot1");

        store.clear_perception();

        assert_eq!(store.count(predicate::VISION), 0);
        assert_eq!(store.count(predicate::DEPTH), 0);
        assert_eq!(store.count(predicate::LOAD), 0);
        assert_eq!(store.count("waypoint"), 1);
        assert_eq!(store.agent_name(), Some("bot1"));
    }

    #[test]
    fn agent_name_is_set_once() {
        let mut store = KnowledgeStore::new();
        assert!(store.set_agent_name("bot1"));
        assert!(!store.set_agent_name("bot2"));
        assert_eq!(store.agent_name(), Some("bot1"));
    }

    #[test]
    fn identity_is_queryable_like_any_fact() {
        let mut store = KnowledgeStore::new();
        store.set_agent_name("bot1");
        assert!(store.holds(predicate::AGENT_NAME, &[Term::Wildcard]));
        assert!(store.holds(predicate::AGENT_NAME, &[Term::atom("bot1")]));
    }
}
