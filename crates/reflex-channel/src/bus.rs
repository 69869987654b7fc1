//! [`MessageBus`] – in-process two-lane coordination channel.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every envelope without any single subscriber blocking
//! the others.
//!
//! # Lanes
//!
//! | Lane | Traffic |
//! |---|---|
//! | [`Lane::Inbound`] | Payloads arriving from peers/operators, consumed by the ingestion pipeline |
//! | [`Lane::Outbound`] | Addressed action payloads emitted by the dispatcher |
//!
//! The bus is the default wiring for a single-process agent and the test
//! double for real transports: it implements [`PeerChannel`], sending on the
//! outbound lane and streaming the inbound one.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use reflex_types::{Envelope, ReflexError};
use tokio::sync::broadcast;
use tracing::warn;

use crate::channel::PeerChannel;

/// Default lane capacity (buffered envelopes before old ones are dropped for
/// slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// The two traffic lanes of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Payloads arriving from peers and operators.
    Inbound,
    /// Addressed action payloads leaving this agent.
    Outbound,
}

/// Shared in-process channel. Clone it cheaply – all clones share the same
/// underlying broadcast channels.
#[derive(Clone, Debug)]
pub struct MessageBus {
    inbound: broadcast::Sender<Envelope>,
    outbound: broadcast::Sender<Envelope>,
}

impl MessageBus {
    /// Create a new bus; `capacity` applies to each lane independently.
    pub fn new(capacity: usize) -> Self {
        let (inbound, _) = broadcast::channel(capacity);
        let (outbound, _) = broadcast::channel(capacity);
        Self { inbound, outbound }
    }

    /// Publish `envelope` to the given lane.
    ///
    /// Returns the number of active receivers that were handed the envelope,
    /// or [`ReflexError::Channel`] when nobody is listening on the lane.
    pub fn publish(&self, lane: Lane, envelope: Envelope) -> Result<usize, ReflexError> {
        self.lane_sender(lane)
            .send(envelope)
            .map_err(|_| ReflexError::Channel(format!("no subscribers on lane {lane:?}")))
    }

    /// Subscribe to a lane. The returned receiver yields every envelope
    /// published to that lane from this moment on.
    pub fn subscribe(&self, lane: Lane) -> broadcast::Receiver<Envelope> {
        self.lane_sender(lane).subscribe()
    }

    fn lane_sender(&self, lane: Lane) -> &broadcast::Sender<Envelope> {
        match lane {
            Lane::Inbound => &self.inbound,
            Lane::Outbound => &self.outbound,
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl PeerChannel for MessageBus {
    async fn send(&self, envelope: Envelope) -> Result<(), ReflexError> {
        self.publish(Lane::Outbound, envelope).map(|_| ())
    }

    fn inbound(&self) -> BoxStream<'static, Envelope> {
        let rx = self.subscribe(Lane::Inbound);
        Box::pin(futures_util::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) => return Some((envelope, rx)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(lagged_by = n, "inbound subscriber lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn make_envelope(body: &str) -> Envelope {
        Envelope::new("reflex-channel::test", body)
    }

    #[tokio::test]
    async fn publish_and_receive() -> Result<(), Box<dyn std::error::Error>> {
        let bus = MessageBus::default();
        let mut rx = bus.subscribe(Lane::Inbound);

        let envelope = make_envelope("vision(green,near).");
        bus.publish(Lane::Inbound, envelope.clone())?;

        let received = rx.recv().await?;
        assert_eq!(received.id, envelope.id);
        assert_eq!(received.body, envelope.body);
        Ok(())
    }

    #[tokio::test]
    async fn lanes_are_isolated() -> Result<(), Box<dyn std::error::Error>> {
        let bus = MessageBus::default();
        let mut outbound_rx = bus.subscribe(Lane::Outbound);
        let _inbound_rx = bus.subscribe(Lane::Inbound);

        bus.publish(Lane::Inbound, make_envelope("depth(far)."))?;

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            outbound_rx.recv(),
        )
        .await;
        assert!(
            result.is_err(),
            "outbound subscriber must not receive an inbound envelope"
        );
        Ok(())
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_envelope() -> Result<(), Box<dyn std::error::Error>> {
        let bus = MessageBus::default();
        let mut rx1 = bus.subscribe(Lane::Outbound);
        let mut rx2 = bus.subscribe(Lane::Outbound);

        let envelope = make_envelope("bot1go:2");
        bus.publish(Lane::Outbound, envelope.clone())?;

        assert_eq!(rx1.recv().await?.id, envelope.id);
        assert_eq!(rx2.recv().await?.id, envelope.id);
        Ok(())
    }

    #[test]
    fn publish_without_subscribers_is_an_error() {
        let bus = MessageBus::default();
        let result = bus.publish(Lane::Outbound, make_envelope("bot1stop"));
        assert!(matches!(result, Err(ReflexError::Channel(_))));
    }

    #[tokio::test]
    async fn peer_channel_send_lands_on_outbound_lane() -> Result<(), Box<dyn std::error::Error>> {
        let bus = MessageBus::default();
        let mut rx = bus.subscribe(Lane::Outbound);

        let envelope = make_envelope("bot1right:90");
        PeerChannel::send(&bus, envelope.clone()).await?;

        assert_eq!(rx.recv().await?.id, envelope.id);
        Ok(())
    }

    #[tokio::test]
    async fn peer_channel_inbound_streams_inbound_lane() -> Result<(), Box<dyn std::error::Error>> {
        let bus = MessageBus::default();
        let mut stream = bus.inbound();

        let envelope = make_envelope("load(full).");
        bus.publish(Lane::Inbound, envelope.clone())?;

        let received = stream.next().await.ok_or("stream ended")?;
        assert_eq!(received.id, envelope.id);
        Ok(())
    }
}
