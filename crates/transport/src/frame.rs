//! Frame-messaging adapter.
//!
//! Posts to a parent document with an unrestricted target origin. Payloads
//! carry no cross-origin secrets, so any parent may read them.

use serde_json::Value;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use switchboard_bus::{InboundSink, Transport, TransportError};
use switchboard_events::{Envelope, FrameHandle, RoutingHint, WireMessage};

/// Target origin used for every post.
pub const ANY_ORIGIN: &str = "*";

/// Callback for `message` events on the current window.
pub type WindowListener = Box<dyn Fn(Value)>;

/// The current window's cross-document messaging surface.
pub trait WindowHost {
    /// Post a structured message to a frame.
    fn post_message(
        &self,
        target: FrameHandle,
        message: Value,
        target_origin: &str,
    ) -> Result<(), TransportError>;

    /// Listen for `message` events on this window.
    fn add_message_listener(&self, listener: WindowListener);
}

/// Window listener that decodes envelopes and re-emits them locally.
pub(crate) fn bridge_listener(target: Weak<dyn InboundSink>) -> WindowListener {
    Box::new(move |raw| {
        let Some(message) = WireMessage::decode(&raw) else {
            return;
        };
        if let Some(sink) = target.upgrade() {
            tracing::trace!(event = %message.event, "triggered from frame");
            sink.receive(Envelope::from_wire(message));
        }
    })
}

pub struct FrameAdapter {
    window: Rc<dyn WindowHost>,
    listening: Cell<bool>,
    stripped_replies: Cell<u64>,
}

impl FrameAdapter {
    pub fn new(window: Rc<dyn WindowHost>) -> Self {
        Self {
            window,
            listening: Cell::new(false),
            stripped_replies: Cell::new(0),
        }
    }

    /// Listen for window messages. Installs at most once.
    pub fn listen<S>(&self, sink: &Rc<S>)
    where
        S: InboundSink + 'static,
    {
        if self.listening.replace(true) {
            return;
        }
        let weak: Weak<S> = Rc::downgrade(sink);
        let target: Weak<dyn InboundSink> = weak;
        self.window.add_message_listener(bridge_listener(target));
    }

    pub fn is_listening(&self) -> bool {
        self.listening.get()
    }

    /// Number of reply handles dropped because frames cannot carry them.
    pub fn stripped_replies(&self) -> u64 {
        self.stripped_replies.get()
    }

    /// Post an envelope to a parent frame.
    pub fn post(&self, frame: FrameHandle, envelope: Envelope) -> Result<(), TransportError> {
        if envelope.reply.is_some() {
            self.stripped_replies.set(self.stripped_replies.get() + 1);
            tracing::warn!(
                event = %envelope.event,
                %frame,
                "unsupported payload: reply handle cannot cross frame messaging, stripped"
            );
        }
        self.window
            .post_message(frame, envelope.to_wire().to_value(), ANY_ORIGIN)
    }
}

impl Transport for FrameAdapter {
    fn name(&self) -> &'static str {
        "frame"
    }

    fn send(&self, envelope: Envelope, hint: RoutingHint) -> Result<(), TransportError> {
        match hint {
            RoutingHint::ParentFrame(frame) => self.post(frame, envelope),
            _ => Err(TransportError::Unroutable(hint)),
        }
    }
}
