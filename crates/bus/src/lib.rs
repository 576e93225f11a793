//! Unified event bus for switchboard.
//!
//! Application code calls `on`/`once`/`off`/`emit` without knowing whether an
//! event stays in the current context, goes to every extension context, to a
//! single tab, or to a parent frame. The bus composes:
//!
//! - a [`ListenerRegistry`] answering "who is listening", and
//! - a [`Strategy`] chosen once per context answering "how does it leave".
//!
//! Inbound messages from any transport come back through [`InboundSink`] and
//! are dispatched locally, so listeners never distinguish origin.

mod bus;
mod error;
mod registry;
mod transport;

pub use bus::EventBus;
pub use error::{BusError, HandlerError};
pub use registry::{Handler, ListenerId, ListenerRegistry};
pub use transport::{
    InboundSink, NullTransport, RecordingTransport, SentEnvelope, Strategy, Transport,
    TransportError,
};

use serde::Deserialize;

/// Bus behaviour switches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusConfig {
    /// Log every local dispatch at debug level.
    #[serde(default)]
    pub verbose: bool,
}
