//! `reflex-kb` – The Knowledge Base.
//!
//! Holds everything the agent knows at a given instant and everything it can
//! be taught at runtime.
//!
//! # Modules
//!
//! - [`store`] – [`KnowledgeStore`][store::KnowledgeStore]: the working
//!   memory, a mutable mapping from predicate name to a set of ground
//!   argument tuples with wildcard queries, idempotent assertion, and the
//!   perception-clearing discipline used after every dispatch.
//! - [`clause`] – textual clause parser for inbound knowledge: period-
//!   terminated facts, `rule/3` behavior definitions, `action/2` template
//!   overrides, and `:-` directives.
//! - [`rules`] – [`RuleTable`][rules::RuleTable]: the ordered, runtime-
//!   extensible condition→action table evaluated first-match-wins, plus the
//!   [`Cond`][rules::Cond] guard AST that rules are compiled into.

pub mod clause;
pub mod rules;
pub mod store;

pub use clause::{Clause, Term, parse_clauses};
pub use rules::{BehaviorRule, Cond, RuleTable};
pub use store::KnowledgeStore;
