//! Transport adapters for switchboard.
//!
//! Two delivery mechanisms connect execution contexts:
//!
//! - [`RuntimeAdapter`] speaks the extension host's internal message bus,
//!   broadcasting to every listening context or addressing one tab.
//! - [`FrameAdapter`] speaks cross-document messaging to a parent frame and
//!   only carries structured, serializable data.
//!
//! Host APIs are reached through the [`ExtensionHost`] and [`WindowHost`]
//! traits, so the adapters run unchanged against the in-memory fakes in
//! [`fake`].

mod extension;
pub mod fake;
mod frame;
mod runtime;

pub use extension::ExtensionTransport;
pub use frame::{FrameAdapter, WindowHost, WindowListener, ANY_ORIGIN};
pub use runtime::{ExtensionHost, RuntimeAdapter, RuntimeListener};
