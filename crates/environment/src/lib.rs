//! Execution-context detection for switchboard.
//!
//! Every execution context (background script, tab content script, popup,
//! plain web page) resolves exactly one [`Environment`] at startup. The bus
//! and both transport adapters read that descriptor to decide how an event
//! leaves the context.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  descriptor.rs - Environment, HostKind, HostFlavor (pure)   │
//! │  resolve.rs    - resolution from hints + probe (pure)       │
//! │  probe.rs      - HostProbe trait over ambient globals       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use switchboard_environment::{resolve, EnvironmentHints, ExtensionRole, HostKind, StaticProbe};
//!
//! let probe = StaticProbe::chromium().with_search("?popout=true");
//! let env = resolve(&EnvironmentHints::extension(ExtensionRole::Popup), &probe).unwrap();
//! assert_eq!(env.host_kind, HostKind::ExtensionPopup);
//! assert!(env.is_popout);
//! ```

mod descriptor;
mod error;
mod probe;
mod resolve;

pub use descriptor::{Environment, EnvironmentHints, ExtensionRole, HostFlavor, HostKind};
pub use error::EnvironmentError;
pub use probe::{HostProbe, NullProbe, StaticProbe};
pub use resolve::{is_popout, resolve, POPOUT_QUERY_KEY};
