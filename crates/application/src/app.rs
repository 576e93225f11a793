//! The shared application object of one execution context.

use crate::api::ApiClient;
use crate::config::ContextConfig;
use crate::error::{AppError, Result};
use crate::indicator::IndicatorHost;
use crate::store::{MemoryStore, Store};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use switchboard_bus::{BusError, EventBus, ListenerId, Strategy};
use switchboard_environment::{resolve, Environment, HostProbe, NullProbe};
use switchboard_events::{EmitOptions, Envelope};
use switchboard_transport::{
    ExtensionHost, ExtensionTransport, FrameAdapter, RuntimeAdapter, WindowHost,
};

/// Handle every feature module receives.
pub struct App {
    name: String,
    env: Rc<Environment>,
    bus: Rc<EventBus>,
    store: Rc<dyn Store>,
    api: Rc<dyn ApiClient>,
    indicator: Option<Rc<dyn IndicatorHost>>,
    runtime: Option<Rc<RuntimeAdapter>>,
    frame: Option<Rc<FrameAdapter>>,
}

impl App {
    pub fn builder(config: ContextConfig, api: Rc<dyn ApiClient>) -> AppBuilder {
        AppBuilder::new(config, api)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn api(&self) -> &dyn ApiClient {
        self.api.as_ref()
    }

    pub fn indicator(&self) -> Option<&dyn IndicatorHost> {
        self.indicator.as_deref()
    }

    pub fn runtime(&self) -> Option<&Rc<RuntimeAdapter>> {
        self.runtime.as_ref()
    }

    pub fn frame(&self) -> Option<&Rc<FrameAdapter>> {
        self.frame.as_ref()
    }

    /// Unpacked extension build.
    pub fn dev_mode(&self) -> bool {
        self.env.dev_mode
    }

    pub fn on<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + 'static,
    {
        self.bus.on(event, handler)
    }

    pub fn once<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + 'static,
    {
        self.bus.once(event, handler)
    }

    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        self.bus.off(event, id)
    }

    /// Emit with default routing (broadcast in extension contexts, local otherwise).
    pub fn emit(&self, event: &str, data: Value) -> std::result::Result<(), BusError> {
        self.bus.emit(event, data, EmitOptions::default())
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.name)
    }
}

/// Assembles an [`App`] from config and host collaborators.
pub struct AppBuilder {
    config: ContextConfig,
    api: Rc<dyn ApiClient>,
    probe: Box<dyn HostProbe>,
    store: Option<Rc<dyn Store>>,
    extension: Option<Rc<dyn ExtensionHost>>,
    window: Option<Rc<dyn WindowHost>>,
    indicator: Option<Rc<dyn IndicatorHost>>,
}

impl AppBuilder {
    pub fn new(config: ContextConfig, api: Rc<dyn ApiClient>) -> Self {
        Self {
            config,
            api,
            probe: Box::new(NullProbe),
            store: None,
            extension: None,
            window: None,
            indicator: None,
        }
    }

    pub fn probe(mut self, probe: impl HostProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn store(mut self, store: Rc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn extension_host(mut self, host: Rc<dyn ExtensionHost>) -> Self {
        self.extension = Some(host);
        self
    }

    pub fn window(mut self, window: Rc<dyn WindowHost>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn indicator(mut self, indicator: Rc<dyn IndicatorHost>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// Resolve the environment, choose the strategy and wire listeners.
    ///
    /// Extension contexts listen on the runtime (tabs also bridge window
    /// messages); plain pages listen for frame messages when a window exists.
    pub fn build(self) -> Result<Rc<App>> {
        let name = self.config.name.clone();
        let env = Rc::new(resolve(&self.config.environment, self.probe.as_ref())?);
        let bus_config = self.config.bus_config();

        let (bus, runtime, frame) = if env.has_host() {
            let host = self
                .extension
                .ok_or(AppError::MissingCollaborator("extension host"))?;

            let mut runtime = RuntimeAdapter::new(Rc::clone(&env), host);
            if let Some(window) = &self.window {
                runtime = runtime.with_window_bridge(Rc::clone(window));
            }
            let runtime = Rc::new(runtime);
            let frame = self
                .window
                .map(|window| Rc::new(FrameAdapter::new(window)));

            let mut transport = ExtensionTransport::new(Rc::clone(&runtime));
            if let Some(frame) = &frame {
                transport = transport.with_frame(Rc::clone(frame));
            }

            let bus = Rc::new(EventBus::with_config(
                name.clone(),
                Rc::clone(&env),
                Strategy::remote(transport),
                bus_config,
            ));
            runtime.listen(&bus);
            (bus, Some(runtime), frame)
        } else {
            let bus = Rc::new(EventBus::with_config(
                name.clone(),
                Rc::clone(&env),
                Strategy::Local,
                bus_config,
            ));
            let frame = self.window.map(|window| {
                let frame = Rc::new(FrameAdapter::new(window));
                frame.listen(&bus);
                frame
            });
            (bus, None, frame)
        };

        let store = self
            .store
            .unwrap_or_else(|| Rc::new(MemoryStore::new()) as Rc<dyn Store>);

        let app = Rc::new(App {
            name,
            env,
            bus,
            store,
            api: self.api,
            indicator: self.indicator,
            runtime,
            frame,
        });

        tracing::debug!(
            context = %app,
            host_kind = %app.env.host_kind,
            popout = app.env.is_popout,
            "init"
        );
        Ok(app)
    }
}
