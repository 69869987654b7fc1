//! [`RuleTable`] – the ordered condition→action table.
//!
//! Each [`BehaviorRule`] guards one named behavior with a [`Cond`] over the
//! working memory and carries the action template emitted when it fires.
//! Rules are evaluated in declared order, first satisfied wins; that order
//! is a public contract so callers can reason about conflicting matches.
//!
//! The table is runtime-extensible through a bounded API: ingested `rule/3`
//! clauses go through [`RuleTable::register_or_override`], never through
//! generic code loading. An override keeps the original rule's priority
//! position; a new behavior is appended at the end (lowest priority).

use reflex_types::atom::{CENTER, EMPTY, FAR, FULL, GREEN, LEFT, NEAR, RED, RIGHT};
use reflex_types::predicate::{DEPTH, LOAD, VISION};
use tracing::info;

use crate::clause::Term;
use crate::store::KnowledgeStore;

/// A guard over the current [`KnowledgeStore`] contents.
///
/// Wildcards in fact patterns match any single argument value; they never
/// bind, so every guard is ground and evaluation is a pure boolean scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond {
    /// At least one tuple of `predicate` matches `pattern`.
    Fact {
        predicate: String,
        pattern: Vec<Term>,
    },
    /// Every sub-guard holds.
    All(Vec<Cond>),
    /// At least one sub-guard holds.
    Any(Vec<Cond>),
    /// The sub-guard does not hold.
    Not(Box<Cond>),
}

impl Cond {
    /// Evaluate this guard against the store.
    pub fn satisfied(&self, store: &KnowledgeStore) -> bool {
        match self {
            Cond::Fact { predicate, pattern } => store.holds(predicate, pattern),
            Cond::All(parts) => parts.iter().all(|c| c.satisfied(store)),
            Cond::Any(parts) => parts.iter().any(|c| c.satisfied(store)),
            Cond::Not(inner) => !inner.satisfied(store),
        }
    }

    /// Convenience constructor for a fact pattern.
    pub fn fact(predicate: &str, pattern: &[Term]) -> Self {
        Cond::Fact {
            predicate: predicate.to_string(),
            pattern: pattern.to_vec(),
        }
    }
}

/// One named reactive behavior: guard plus the action template it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorRule {
    pub name: String,
    pub guard: Cond,
    pub template: String,
}

impl BehaviorRule {
    pub fn new(name: impl Into<String>, guard: Cond, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guard,
            template: template.into(),
        }
    }
}

/// Ordered, runtime-extensible rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<BehaviorRule>,
}

impl RuleTable {
    /// An empty table (useful for tests and fully peer-taught agents).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The five standard reactive behaviors, in fixed priority order:
    /// `avoid`, `stop`, `turn_left`, `turn_right`, `go`, `go_back`.
    ///
    /// `turn_left` and `turn_right` together realise the turn-towards-target
    /// behavior; they sit adjacent so the aggregate priority order is
    /// avoid → stop → turn → go → go_back.
    pub fn standard() -> Self {
        let near_target = |color: &str| {
            Cond::fact(VISION, &[Term::atom(color), Term::atom(NEAR)])
        };
        let loaded = Cond::fact(LOAD, &[Term::atom(FULL)]);
        let unloaded = Cond::fact(LOAD, &[Term::atom(EMPTY)]);
        let depth_far = Cond::fact(DEPTH, &[Term::atom(FAR)]);

        let mut table = Self::empty();

        // Obstacle ahead that is not a sighted target: swing clear.
        table.push(BehaviorRule::new(
            "avoid",
            Cond::All(vec![
                Cond::fact(DEPTH, &[Term::atom(NEAR)]),
                Cond::Not(Box::new(Cond::fact(
                    VISION,
                    &[Term::Wildcard, Term::atom(NEAR)],
                ))),
            ]),
            "right:90",
        ));

        // At the drop-off point loaded, or the pick-up point empty: halt.
        table.push(BehaviorRule::new(
            "stop",
            Cond::Any(vec![
                Cond::All(vec![near_target(GREEN), loaded.clone()]),
                Cond::All(vec![near_target(RED), unloaded.clone()]),
            ]),
            "stop",
        ));

        table.push(BehaviorRule::new(
            "turn_left",
            Cond::All(vec![
                Cond::fact(VISION, &[Term::Wildcard, Term::atom(LEFT)]),
                depth_far.clone(),
            ]),
            "left:30",
        ));

        table.push(BehaviorRule::new(
            "turn_right",
            Cond::All(vec![
                Cond::fact(VISION, &[Term::Wildcard, Term::atom(RIGHT)]),
                depth_far.clone(),
            ]),
            "right:30",
        ));

        table.push(BehaviorRule::new(
            "go",
            Cond::All(vec![
                Cond::fact(VISION, &[Term::Wildcard, Term::atom(CENTER)]),
                depth_far,
            ]),
            "go:2",
        ));

        // Wrong station for the current payload: turn around.
        table.push(BehaviorRule::new(
            "go_back",
            Cond::Any(vec![
                Cond::All(vec![near_target(GREEN), unloaded]),
                Cond::All(vec![near_target(RED), loaded]),
            ]),
            "right:180",
        ));

        table
    }

    /// Append a rule at the end of the table (lowest priority).
    pub fn push(&mut self, rule: BehaviorRule) {
        self.rules.push(rule);
    }

    /// Register `rule`, replacing any existing same-named rule **in place**
    /// so its priority position is preserved; a new name is appended at the
    /// end. This is the only runtime-extension surface: ingested clauses can
    /// add behaviors or supersede existing ones, but never load code.
    pub fn register_or_override(&mut self, rule: BehaviorRule) {
        let total = self.rules.len();
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => {
                info!(behavior = %rule.name, rules = total, "behavior overridden");
                *existing = rule;
            }
            None => {
                info!(behavior = %rule.name, rules = total + 1, "behavior registered");
                self.rules.push(rule);
            }
        }
    }

    /// Replace only the action template of behavior `name`.
    ///
    /// Returns `false` when no such behavior exists (nothing is changed).
    pub fn override_action(&mut self, name: &str, template: &str) -> bool {
        match self.rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                info!(behavior = name, template, "action template overridden");
                rule.template = template.to_string();
                true
            }
            None => false,
        }
    }

    /// The rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &BehaviorRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
