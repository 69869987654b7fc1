//! `reflex-channel` – The Coordination Channel.
//!
//! Moves opaque text payloads between this agent and its peers, and turns
//! inbound payloads into live knowledge.
//!
//! # Modules
//!
//! - [`channel`] – [`PeerChannel`][channel::PeerChannel]: the trait every
//!   transport adapter implements (async send + inbound stream). The
//!   physical transport client is an external collaborator.
//! - [`bus`] – [`MessageBus`][bus::MessageBus]: an in-process two-lane
//!   implementation of [`PeerChannel`][channel::PeerChannel] built on Tokio
//!   broadcast channels; the reactive loop's default wiring and the test
//!   double for real transports.
//! - [`cleaner`] – [`PayloadCleaner`][cleaner::PayloadCleaner]
//!   implementations that strip transport framing from raw payloads before
//!   parsing: addressee prefixes and the proxy's atom-safe escaping.
//! - [`ingest`] – [`IngestionPipeline`][ingest::IngestionPipeline]:
//!   clean → log → parse → load. Arbitrary inbound text becomes executable
//!   decision logic; the clause grammar is the only bound on that surface.

pub mod bus;
pub mod channel;
pub mod cleaner;
pub mod ingest;

pub use bus::{Lane, MessageBus};
pub use channel::PeerChannel;
pub use cleaner::{AddressedFrame, AtomicTransport, CleanerChain, PayloadCleaner};
pub use ingest::{IngestReport, IngestionPipeline};
