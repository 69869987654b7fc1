//! [`IngestionPipeline`] – turning inbound payloads into live knowledge.
//!
//! On receipt of a raw payload: clean off the transport framing, log the
//! cleaned text, parse it into clauses, and load every clause into the
//! knowledge base. Loaded facts are immediately queryable and loaded rules
//! immediately participate in evaluation; a peer can redefine `stop`, `go`,
//! or any other behavior at runtime. The pipeline performs no validation,
//! sandboxing, deduplication, or rate-limiting beyond the clause grammar
//! itself and the store's fact idempotence.
//!
//! A malformed blob is fatal to that message only: parsing is atomic, so an
//! ill-formed message loads nothing, and the caller logs the error and moves
//! on to the next cycle. Once loaded, clauses are durable – they survive
//! dispatch cycles and are never garbage-collected.

use reflex_kb::{BehaviorRule, Clause, KnowledgeStore, RuleTable, parse_clauses};
use reflex_types::{ReflexError, predicate};
use tracing::{debug, info, warn};

use crate::cleaner::{CleanerChain, PayloadCleaner};

/// What one ingested message loaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub facts_loaded: usize,
    pub rules_loaded: usize,
    pub directives_skipped: usize,
}

/// Clean → log → parse → load.
pub struct IngestionPipeline {
    cleaner: Box<dyn PayloadCleaner>,
}

impl IngestionPipeline {
    pub fn new(cleaner: Box<dyn PayloadCleaner>) -> Self {
        Self { cleaner }
    }

    /// A pipeline with the standard cleaner chain (addressee strip, then
    /// transport unescape).
    pub fn standard() -> Self {
        Self::new(Box::new(CleanerChain::standard()))
    }

    /// Ingest one raw payload into the knowledge base.
    ///
    /// # Errors
    ///
    /// [`ReflexError::ClauseParse`] when the cleaned blob is malformed; in
    /// that case nothing from the message has been loaded.
    pub fn ingest(
        &self,
        store: &mut KnowledgeStore,
        rules: &mut RuleTable,
        raw: &str,
    ) -> Result<IngestReport, ReflexError> {
        let cleaned = self.cleaner.clean(raw);
        info!(payload = %cleaned, "ingesting inbound knowledge");

        let clauses = parse_clauses(&cleaned)?;

        let mut report = IngestReport::default();
        for clause in clauses {
            match clause {
                Clause::Directive(body) => {
                    debug!(directive = %body, "directive skipped");
                    report.directives_skipped += 1;
                }
                Clause::Fact { pred, args } => {
                    // Identity goes through the set-once path; everything
                    // else is asserted directly, known predicate or not.
                    if pred == predicate::AGENT_NAME && args.len() == 1 {
                        store.set_agent_name(&args[0]);
                    } else {
                        store.assert_fact(&pred, args);
                    }
                    report.facts_loaded += 1;
                }
                Clause::Rule {
                    name,
                    guard,
                    template,
                } => {
                    rules.register_or_override(BehaviorRule::new(name, guard, template));
                    report.rules_loaded += 1;
                }
                Clause::ActionOverride { name, template } => {
                    // The loading contract reports no conflicts back to the
                    // sender; an override of an unknown behavior is dropped.
                    if rules.override_action(&name, &template) {
                        report.rules_loaded += 1;
                    } else {
                        warn!(behavior = %name, "action override for unknown behavior dropped");
                    }
                }
            }
        }

        debug!(?report, "message loaded");
        Ok(report)
    }
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_kb::Term;
    use reflex_types::atom;

    fn setup() -> (KnowledgeStore, RuleTable, IngestionPipeline) {
        (
            KnowledgeStore::new(),
            RuleTable::standard(),
            IngestionPipeline::standard(),
        )
    }

    #[test]
    fn perception_message_loads_all_facts() {
        let (mut store, mut rules, pipeline) = setup();
        let report = pipeline
            .ingest(&mut store, &mut rules, "vision(red,near). load(empty). depth(far).")
            .unwrap();

        assert_eq!(report.facts_loaded, 3);
        assert!(store.holds(predicate::VISION, &[Term::atom("red"), Term::atom(atom::NEAR)]));
        assert!(store.holds(predicate::LOAD, &[Term::atom(atom::EMPTY)]));
    }

    #[test]
    fn framed_and_escaped_payload_is_cleaned_first() {
        let (mut store, mut rules, pipeline) = setup();
        pipeline
            .ingest(&mut store, &mut rules, "turtlebot_5000:redis(depthAnearBE)")
            .unwrap();
        assert!(store.holds(predicate::DEPTH, &[Term::atom(atom::NEAR)]));
    }

    #[test]
    fn directives_are_skipped_not_stored() {
        let (mut store, mut rules, pipeline) = setup();
        let report = pipeline
            .ingest(
                &mut store,
                &mut rules,
                ":- dynamic vision/2. :- dynamic depth/1. depth(near).",
            )
            .unwrap();
        assert_eq!(report.directives_skipped, 2);
        assert_eq!(report.facts_loaded, 1);
    }

    #[test]
    fn agentname_clause_sets_identity_once() {
        let (mut store, mut rules, pipeline) = setup();
        pipeline
            .ingest(&mut store, &mut rules, "agentname('bot1').")
            .unwrap();
        assert_eq!(store.agent_name(), Some("bot1"));

        // A later peer cannot re-address the agent.
        pipeline
            .ingest(&mut store, &mut rules, "agentname('impostor').")
            .unwrap();
        assert_eq!(store.agent_name(), Some("bot1"));
    }

    #[test]
    fn rule_clause_overrides_live_behavior() {
        let (mut store, mut rules, pipeline) = setup();
        let report = pipeline
            .ingest(
                &mut store,
                &mut rules,
                "rule(go, and(vision(any,center), depth(far)), 'go:5').",
            )
            .unwrap();
        assert_eq!(report.rules_loaded, 1);
        assert_eq!(
            rules.iter().find(|r| r.name == "go").unwrap().template,
            "go:5"
        );
        // The override kept go's priority slot.
        assert_eq!(rules.len(), 6);
    }

    #[test]
    fn action_override_for_unknown_behavior_is_dropped() {
        let (mut store, mut rules, pipeline) = setup();
        let report = pipeline
            .ingest(&mut store, &mut rules, "action(swim, 'splash:1').")
            .unwrap();
        assert_eq!(report.rules_loaded, 0);
        assert_eq!(rules.len(), 6);
    }

    #[test]
    fn malformed_blob_loads_nothing() {
        let (mut store, mut rules, pipeline) = setup();
        let err = pipeline
            .ingest(&mut store, &mut rules, "depth(near). vision(green")
            .unwrap_err();
        assert!(matches!(err, ReflexError::ClauseParse { .. }));
        // Atomic per message: the well-formed leading clause did not load.
        assert_eq!(store.count(predicate::DEPTH), 0);
    }

    #[test]
    fn ingested_custom_facts_are_durable_knowledge() {
        let (mut store, mut rules, pipeline) = setup();
        pipeline
            .ingest(&mut store, &mut rules, "waypoint(dock_a). waypoint(dock_b).")
            .unwrap();
        store.clear_perception();
        assert_eq!(store.count("waypoint"), 2);
    }
}
