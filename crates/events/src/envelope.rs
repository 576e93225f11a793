//! The envelope exchanged across every transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Host-assigned tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-assigned frame identifier within a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub i64);

/// Opaque reference to a parent window reachable through frame messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Sender metadata the extension host attaches to inbound runtime messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    #[serde(default)]
    pub tab: Option<TabId>,
    #[serde(default)]
    pub frame: Option<FrameId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub extension_id: Option<String>,
}

impl SenderInfo {
    pub fn from_tab(tab: TabId) -> Self {
        Self {
            tab: Some(tab),
            ..Self::default()
        }
    }
}

type ReplyFn = Box<dyn FnOnce(Value)>;

/// One-shot response channel back to the original sender.
///
/// Clones share the same slot: whichever clone responds first delivers,
/// every later call is a no-op. Never serialized.
#[derive(Clone)]
pub struct ReplyHandle {
    slot: Rc<RefCell<Option<ReplyFn>>>,
}

impl ReplyHandle {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Value) + 'static,
    {
        Self {
            slot: Rc::new(RefCell::new(Some(Box::new(f)))),
        }
    }

    /// Deliver a response. Returns false if the handle was already used.
    pub fn respond(&self, value: Value) -> bool {
        let reply = self.slot.borrow_mut().take();
        match reply {
            Some(reply) => {
                reply(value);
                true
            }
            None => false,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl fmt::Debug for ReplyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyHandle")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Serialized shape on both transports: `{ "event": ..., "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub event: String,
    pub data: Value,
}

impl WireMessage {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Decode a raw structured value received from a shared transport.
    ///
    /// Returns `None` when `event` is not a string or `data` is missing/null.
    pub fn decode(raw: &Value) -> Option<Self> {
        let object = raw.as_object()?;
        let event = object.get("event")?.as_str()?;
        let data = object.get("data").filter(|data| !data.is_null())?;
        Some(Self::new(event, data.clone()))
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "event": self.event, "data": self.data })
    }
}

/// Normalized event unit handed to every listener, whatever its origin.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub event: String,
    pub data: Value,
    /// Populated only for messages that crossed the extension runtime.
    pub origin_sender: Option<SenderInfo>,
    /// Present only when the inbound transport supports responses.
    pub reply: Option<ReplyHandle>,
}

impl Envelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            origin_sender: None,
            reply: None,
        }
    }

    pub fn with_sender(mut self, sender: SenderInfo) -> Self {
        self.origin_sender = Some(sender);
        self
    }

    pub fn with_reply(mut self, reply: ReplyHandle) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn from_wire(message: WireMessage) -> Self {
        Self::new(message.event, message.data)
    }

    /// Wire form; sender and reply are host-attached and never serialized.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage::new(self.event.clone(), self.data.clone())
    }

    /// Respond through the attached reply handle, if any.
    pub fn respond(&self, value: Value) -> bool {
        self.reply
            .as_ref()
            .map(|reply| reply.respond(value))
            .unwrap_or(false)
    }

    /// Deserialize the data payload into a typed event.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.data.clone())
    }
}
