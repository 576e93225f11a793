//! Transport strategy seam.
//!
//! The bus never inspects host APIs itself. It holds one [`Strategy`] picked
//! when the context starts and hands outbound envelopes to it.

use std::cell::RefCell;
use std::rc::Rc;
use switchboard_events::{Envelope, RoutingHint, WireMessage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("host send failed: {0}")]
    Host(String),

    #[error("no transport can deliver to {0:?}")]
    Unroutable(RoutingHint),
}

/// Outbound half of a cross-context delivery mechanism.
pub trait Transport {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Hand an envelope to the host. Fire-and-forget: returning `Ok` means the
    /// host accepted it, not that anyone received it.
    fn send(&self, envelope: Envelope, hint: RoutingHint) -> Result<(), TransportError>;
}

/// Re-emission entry point used by inbound transport listeners.
pub trait InboundSink {
    /// Dispatch an envelope to local listeners only.
    fn receive(&self, envelope: Envelope);
}

/// How emits leave this context.
#[derive(Clone)]
pub enum Strategy {
    /// Plain in-process emitter.
    Local,
    /// Route through a transport unless the caller asks for local delivery.
    Remote(Rc<dyn Transport>),
}

impl Strategy {
    pub fn remote<T: Transport + 'static>(transport: T) -> Self {
        Strategy::Remote(Rc::new(transport))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Strategy::Local)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Local => "local",
            Strategy::Remote(transport) => transport.name(),
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Strategy({})", self.name())
    }
}

/// A captured outbound envelope from [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct SentEnvelope {
    pub message: WireMessage,
    pub hint: RoutingHint,
    pub had_reply: bool,
}

/// Transport that records every send, for tests.
///
/// Clones share the same log, so a clone can be kept for inspection after
/// the original is moved into a [`Strategy`].
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Rc<RefCell<Vec<SentEnvelope>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentEnvelope> {
        self.sent.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl Transport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send(&self, envelope: Envelope, hint: RoutingHint) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(SentEnvelope {
            message: envelope.to_wire(),
            hint,
            had_reply: envelope.reply.is_some(),
        });
        Ok(())
    }
}

/// Transport that discards every envelope.
pub struct NullTransport;

impl Transport for NullTransport {
    fn name(&self) -> &'static str {
        "null"
    }

    fn send(&self, _envelope: Envelope, _hint: RoutingHint) -> Result<(), TransportError> {
        Ok(())
    }
}
