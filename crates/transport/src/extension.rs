//! Combined transport for extension contexts.

use crate::frame::FrameAdapter;
use crate::runtime::RuntimeAdapter;
use std::rc::Rc;
use switchboard_bus::{Transport, TransportError};
use switchboard_events::{Envelope, RoutingHint};

/// Sends broadcasts and tab messages over the runtime, parent-frame
/// messages over frame messaging.
pub struct ExtensionTransport {
    runtime: Rc<RuntimeAdapter>,
    frame: Option<Rc<FrameAdapter>>,
}

impl ExtensionTransport {
    pub fn new(runtime: Rc<RuntimeAdapter>) -> Self {
        Self {
            runtime,
            frame: None,
        }
    }

    /// Contexts without a window (e.g. a background worker) have no frame adapter.
    pub fn with_frame(mut self, frame: Rc<FrameAdapter>) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn runtime(&self) -> &Rc<RuntimeAdapter> {
        &self.runtime
    }

    pub fn frame(&self) -> Option<&Rc<FrameAdapter>> {
        self.frame.as_ref()
    }
}

impl Transport for ExtensionTransport {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn send(&self, envelope: Envelope, hint: RoutingHint) -> Result<(), TransportError> {
        match hint {
            RoutingHint::ParentFrame(_) => match &self.frame {
                Some(frame) => frame.send(envelope, hint),
                None => Err(TransportError::Unroutable(hint)),
            },
            RoutingHint::Broadcast | RoutingHint::Tab(_) => self.runtime.send(envelope, hint),
        }
    }
}
