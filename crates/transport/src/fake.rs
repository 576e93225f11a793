//! In-memory host fakes.
//!
//! Capture outbound traffic for inspection and let tests inject inbound
//! messages, standing in for the browser's extension and window APIs.

use crate::frame::{WindowHost, WindowListener};
use crate::runtime::{ExtensionHost, RuntimeListener};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use switchboard_bus::TransportError;
use switchboard_events::{FrameHandle, ReplyHandle, SenderInfo, TabId, WireMessage};

/// Message the host error text uses when nothing is listening.
pub const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist.";

/// A captured runtime send.
#[derive(Debug, Clone)]
pub struct HostSend {
    /// `None` for a runtime broadcast.
    pub tab: Option<TabId>,
    pub message: WireMessage,
    pub reply: Option<ReplyHandle>,
}

type SharedRuntimeListener = Rc<dyn Fn(Value, SenderInfo, Option<ReplyHandle>)>;

/// Fake extension runtime.
#[derive(Default)]
pub struct FakeExtensionHost {
    sent: RefCell<Vec<HostSend>>,
    listeners: RefCell<Vec<SharedRuntimeListener>>,
    disconnected: Cell<bool>,
}

impl FakeExtensionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail as if no receiver existed.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.disconnected.set(disconnected);
    }

    pub fn sent(&self) -> Vec<HostSend> {
        self.sent.borrow().clone()
    }

    pub fn take_sent(&self) -> Vec<HostSend> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver a raw inbound message to every registered listener.
    pub fn deliver(&self, raw: Value, sender: SenderInfo, reply: Option<ReplyHandle>) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(raw.clone(), sender.clone(), reply.clone());
        }
    }

    /// Feed a captured send back into the listeners, as the host would for
    /// a receiving context.
    pub fn loop_back(&self, send: &HostSend, sender: SenderInfo) {
        self.deliver(send.message.to_value(), sender, send.reply.clone());
    }

    fn record(&self, send: HostSend) -> Result<(), TransportError> {
        if self.disconnected.get() {
            return Err(TransportError::Host(NO_RECEIVER.to_string()));
        }
        self.sent.borrow_mut().push(send);
        Ok(())
    }
}

impl ExtensionHost for FakeExtensionHost {
    fn send_runtime_message(
        &self,
        message: WireMessage,
        reply: Option<ReplyHandle>,
    ) -> Result<(), TransportError> {
        self.record(HostSend {
            tab: None,
            message,
            reply,
        })
    }

    fn send_tab_message(
        &self,
        tab: TabId,
        message: WireMessage,
        reply: Option<ReplyHandle>,
    ) -> Result<(), TransportError> {
        self.record(HostSend {
            tab: Some(tab),
            message,
            reply,
        })
    }

    fn add_runtime_listener(&self, listener: RuntimeListener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }
}

/// A captured window post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub target: FrameHandle,
    pub message: Value,
    pub origin: String,
}

/// Fake window with cross-document messaging.
#[derive(Default)]
pub struct FakeWindow {
    posted: RefCell<Vec<PostedMessage>>,
    listeners: RefCell<Vec<Rc<dyn Fn(Value)>>>,
}

impl FakeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Fire a `message` event carrying `data` on this window.
    pub fn dispatch(&self, data: Value) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(data.clone());
        }
    }
}

impl WindowHost for FakeWindow {
    fn post_message(
        &self,
        target: FrameHandle,
        message: Value,
        target_origin: &str,
    ) -> Result<(), TransportError> {
        self.posted.borrow_mut().push(PostedMessage {
            target,
            message,
            origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn add_message_listener(&self, listener: WindowListener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }
}
