//! The per-context event bus.

use crate::error::{BusError, HandlerError, Result};
use crate::registry::{Handler, ListenerId, ListenerRegistry};
use crate::transport::{InboundSink, Strategy};
use crate::BusConfig;
use serde_json::Value;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use switchboard_environment::Environment;
use switchboard_events::{EmitOptions, Envelope};

/// Publish/subscribe surface shared by every execution context.
///
/// Owned by one context and used only from its single scheduler thread, so
/// the registry lives in a `RefCell` and listeners may freely call back into
/// the bus (register, remove, emit) while being dispatched.
pub struct EventBus {
    name: String,
    env: Rc<Environment>,
    strategy: Strategy,
    config: BusConfig,
    listeners: RefCell<ListenerRegistry>,
}

impl EventBus {
    /// Create a bus for a context.
    ///
    /// A context without an extension host always gets the local strategy.
    pub fn new(name: impl Into<String>, env: Rc<Environment>, strategy: Strategy) -> Self {
        Self::with_config(name, env, strategy, BusConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        env: Rc<Environment>,
        strategy: Strategy,
        config: BusConfig,
    ) -> Self {
        let name = name.into();
        let strategy = if env.has_host() {
            strategy
        } else {
            if !strategy.is_local() {
                tracing::debug!(context = %name, "no extension host, using local strategy");
            }
            Strategy::Local
        };

        tracing::debug!(
            context = %name,
            host_kind = %env.host_kind,
            strategy = strategy.name(),
            "event bus created"
        );

        Self {
            name,
            env,
            strategy,
            config,
            listeners: RefCell::new(ListenerRegistry::new()),
        }
    }

    /// Plain in-process bus for a context without a host.
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, Rc::new(Environment::default()), Strategy::Local)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Register a listener at the end of the event's list.
    pub fn on<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + 'static,
    {
        self.on_handler(event, Rc::new(handler))
    }

    /// Register a shared handler; keep a clone to remove it with [`Self::off_handler`].
    pub fn on_handler(&self, event: &str, handler: Handler) -> ListenerId {
        self.listeners.borrow_mut().add(event, handler, false)
    }

    /// Register a listener removed right before its first invocation.
    pub fn once<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + 'static,
    {
        self.listeners.borrow_mut().add(event, Rc::new(handler), true)
    }

    /// Remove a registration. Unknown ids are ignored.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(event, id)
    }

    /// Remove the first registration of this handler. Unknown handlers are ignored.
    pub fn off_handler(&self, event: &str, handler: &Handler) -> bool {
        self.listeners.borrow_mut().remove_handler(event, handler)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().count(event)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().total()
    }

    /// Emit an event.
    ///
    /// Locally dispatched when `local_only` is set or the context has no host;
    /// otherwise handed to the transport without invoking local listeners.
    pub fn emit(&self, event: &str, data: Value, options: EmitOptions) -> Result<()> {
        self.emit_envelope(Envelope::new(event, data), options)
    }

    /// Shorthand for `emit(event, data, EmitOptions::local())`.
    pub fn emit_local(&self, event: &str, data: Value) {
        self.dispatch_local(&Envelope::new(event, data));
    }

    /// Emit a prepared envelope, e.g. one carrying a reply handle.
    ///
    /// Conflicting targets are rejected before any delivery, local or remote.
    pub fn emit_envelope(&self, envelope: Envelope, options: EmitOptions) -> Result<()> {
        let hint = options.routing_hint()?;
        let transport = match &self.strategy {
            Strategy::Remote(transport) if !options.local_only => transport,
            _ => {
                self.dispatch_local(&envelope);
                return Ok(());
            }
        };

        if self.config.verbose {
            tracing::debug!(
                context = %self.name,
                event = %envelope.event,
                ?hint,
                transport = transport.name(),
                "emit remote"
            );
        }

        let event = envelope.event.clone();
        transport.send(envelope, hint).map_err(|err| {
            tracing::warn!(context = %self.name, %event, error = %err, "transport send failed");
            BusError::from(err)
        })
    }

    /// Convenience for a broadcast with no targets.
    pub fn broadcast(&self, event: &str, data: Value) -> Result<()> {
        self.emit(event, data, EmitOptions::default())
    }

    fn dispatch_local(&self, envelope: &Envelope) {
        let registrations = self.listeners.borrow().snapshot(&envelope.event);

        if self.config.verbose {
            tracing::debug!(
                context = %self.name,
                event = %envelope.event,
                listeners = registrations.len(),
                "emit local"
            );
        }

        for registration in registrations {
            if registration.once {
                if registration.fired.replace(true) {
                    continue;
                }
                self.listeners
                    .borrow_mut()
                    .remove(&envelope.event, registration.id);
            }

            let handler = &registration.handler;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (**handler)(envelope)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => HandlerError::Failed(err),
                Err(payload) => HandlerError::from_panic(payload),
            };

            tracing::error!(
                context = %self.name,
                event = %envelope.event,
                error = %failure,
                "listener failed, continuing dispatch"
            );
        }
    }
}

impl InboundSink for EventBus {
    fn receive(&self, envelope: Envelope) {
        self.dispatch_local(&envelope);
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.name)
    }
}
