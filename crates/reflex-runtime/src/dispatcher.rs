//! Action dispatch – the evaluator's side effect.
//!
//! One outbound message per cycle, nothing queued. The outbound payload is
//! the agent identity concatenated bare onto the action string (`bot1` +
//! `go:2` → `bot1go:2`); peers parse the address back out by convention, so
//! the missing delimiter is wire format, not an oversight.
//!
//! Perception clearing runs even when the send fails: the system is
//! optimized for not re-acting on stale perception rather than for
//! guaranteed delivery. A send failure is an observability event, never a
//! reason to halt.

use reflex_channel::PeerChannel;
use reflex_kb::KnowledgeStore;
use reflex_types::{Decision, Envelope, ReflexError};
use tracing::{info, warn};

/// Source tag stamped on every outbound envelope.
pub const SOURCE: &str = "reflex-runtime::dispatcher";

/// Dispatch `decision`: address it, send it, log it, clear perception.
///
/// Returns the envelope that was handed to the channel. The only error is
/// [`ReflexError::MissingIdentity`] – without an identity no payload can be
/// addressed, so nothing is sent and nothing is cleared.
pub async fn dispatch(
    store: &mut KnowledgeStore,
    decision: &Decision,
    channel: &dyn PeerChannel,
) -> Result<Envelope, ReflexError> {
    let identity = store.agent_name().ok_or(ReflexError::MissingIdentity)?;

    // Bare concatenation, no delimiter: exact wire format.
    let payload = format!("{identity}{}", decision.command);
    let envelope = Envelope::new(SOURCE, payload);

    if let Err(e) = channel.send(envelope.clone()).await {
        warn!(error = %e, body = %envelope.body, "outbound send failed; clearing perception anyway");
    }

    info!(
        behavior = %decision.behavior,
        command = %decision.command,
        body = %envelope.body,
        "action dispatched"
    );

    store.clear_perception();
    Ok(envelope)
}
