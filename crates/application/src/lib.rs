//! Hosting application shell for switchboard contexts.
//!
//! Every execution context (background, tab, popup, plain page) builds one
//! [`App`]: it resolves the environment, picks the transport strategy, wires
//! inbound listeners and hands feature modules a shared handle exposing the
//! bus, the store and the API client. Feature modules never construct their
//! own bus.

mod api;
mod app;
mod config;
mod error;
mod indicator;
mod logging;
pub mod modules;
mod store;

pub use api::{
    ApiClient, ApiResponse, ScriptedApi, NOTOK_STATUS, OK_STATUS, UNAUTHORIZED_STATUS,
};
pub use app::{App, AppBuilder};
pub use config::ContextConfig;
pub use error::{AppError, Result};
pub use indicator::{IndicatorHost, RecordingIndicator, ICON_AVAILABLE, ICON_UNAVAILABLE};
pub use logging::{init_tracing, DEFAULT_LOG_FILTER};
pub use modules::Modules;
pub use store::{MemoryStore, Store};
