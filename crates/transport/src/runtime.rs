//! Extension-runtime messaging adapter.

use crate::frame::{bridge_listener, WindowHost};
use serde_json::Value;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use switchboard_bus::{InboundSink, Transport, TransportError};
use switchboard_environment::Environment;
use switchboard_events::{Envelope, ReplyHandle, RoutingHint, SenderInfo, TabId, WireMessage};

/// Low-level inbound callback: raw message, host sender metadata, optional
/// response channel.
pub type RuntimeListener = Box<dyn Fn(Value, SenderInfo, Option<ReplyHandle>)>;

/// The extension host's internal messaging facility.
pub trait ExtensionHost {
    /// Send to every context listening on the runtime.
    fn send_runtime_message(
        &self,
        message: WireMessage,
        reply: Option<ReplyHandle>,
    ) -> Result<(), TransportError>;

    /// Send to the content scripts of one tab.
    fn send_tab_message(
        &self,
        tab: TabId,
        message: WireMessage,
        reply: Option<ReplyHandle>,
    ) -> Result<(), TransportError>;

    /// Register an inbound listener for the lifetime of the context.
    fn add_runtime_listener(&self, listener: RuntimeListener);
}

/// Bridges the bus to the extension runtime.
pub struct RuntimeAdapter {
    env: Rc<Environment>,
    host: Rc<dyn ExtensionHost>,
    window: Option<Rc<dyn WindowHost>>,
    listening: Cell<bool>,
    bridged: Cell<bool>,
}

impl RuntimeAdapter {
    pub fn new(env: Rc<Environment>, host: Rc<dyn ExtensionHost>) -> Self {
        Self {
            env,
            host,
            window: None,
            listening: Cell::new(false),
            bridged: Cell::new(false),
        }
    }

    /// Relay window messages into the bus when running as a tab content
    /// script, for frames that cannot reach the runtime themselves.
    pub fn with_window_bridge(mut self, window: Rc<dyn WindowHost>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn is_listening(&self) -> bool {
        self.listening.get()
    }

    pub fn is_bridged(&self) -> bool {
        self.bridged.get()
    }

    /// Install the inbound listener (and window bridge, for tabs).
    ///
    /// Installs at most once; later calls are no-ops. Nothing is installed
    /// without a host.
    pub fn listen<S>(&self, sink: &Rc<S>)
    where
        S: InboundSink + 'static,
    {
        if !self.env.has_host() {
            tracing::debug!("no extension host, runtime listener not installed");
            return;
        }
        if self.listening.replace(true) {
            tracing::debug!("runtime listener already installed");
            return;
        }

        let weak: Weak<S> = Rc::downgrade(sink);
        let target: Weak<dyn InboundSink> = weak;
        self.host
            .add_runtime_listener(Box::new(move |raw, sender, reply| {
                let Some(message) = WireMessage::decode(&raw) else {
                    tracing::trace!("dropping malformed runtime message");
                    return;
                };
                let Some(sink) = target.upgrade() else {
                    return;
                };
                let mut envelope = Envelope::from_wire(message).with_sender(sender);
                if let Some(reply) = reply {
                    envelope = envelope.with_reply(reply);
                }
                sink.receive(envelope);
            }));

        if let (true, Some(window)) = (self.env.is_tab(), &self.window) {
            if !self.bridged.replace(true) {
                tracing::info!("added plain message listener");
                let weak: Weak<S> = Rc::downgrade(sink);
                window.add_message_listener(bridge_listener(weak));
            }
        }
    }
}

impl Transport for RuntimeAdapter {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn send(&self, envelope: Envelope, hint: RoutingHint) -> Result<(), TransportError> {
        let reply = envelope.reply.clone();
        let message = envelope.to_wire();
        match hint {
            RoutingHint::Broadcast => self.host.send_runtime_message(message, reply),
            RoutingHint::Tab(tab) => {
                tracing::trace!(%tab, event = %message.event, "sending to tab");
                self.host.send_tab_message(tab, message, reply)
            }
            RoutingHint::ParentFrame(_) => Err(TransportError::Unroutable(hint)),
        }
    }
}
