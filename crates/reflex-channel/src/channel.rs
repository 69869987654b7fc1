//! The transport adapter seam.
//!
//! The agent never speaks a wire protocol directly. It holds a
//! [`PeerChannel`] and lets the implementation translate [`Envelope`]s to
//! and from whatever the coordination medium actually is: the in-process
//! [`MessageBus`][crate::bus::MessageBus], a pub/sub broker, a socket.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use reflex_types::{Envelope, ReflexError};

/// Every coordination-channel adapter must implement this trait.
///
/// # Contract
///
/// * `send` – deliver one outbound envelope. Delivery is fire-and-forget:
///   there is no retry and no acknowledgement; a failure is surfaced to the
///   caller as an observability event, never as a reason to halt.
///
/// * `inbound` – a live stream of envelopes arriving from peers and
///   operators. Each envelope body is an opaque text payload; framing is
///   removed later by the ingestion pipeline's cleaner.
#[async_trait]
pub trait PeerChannel: Send + Sync {
    /// Deliver one outbound envelope to the channel.
    async fn send(&self, envelope: Envelope) -> Result<(), ReflexError>;

    /// A live stream of inbound envelopes.
    fn inbound(&self) -> BoxStream<'static, Envelope>;
}
