//! Environment descriptor types.
//!
//! Pure data - no I/O, no ambient lookups.

use serde::{Deserialize, Serialize};

/// Which part of an extension this context is, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum HostKind {
    /// No extension host: plain web page or embedded frame.
    #[default]
    None,
    /// Extension background script.
    ExtensionBackground,
    /// Content script injected into a tab.
    ExtensionTab,
    /// Popup or popout window.
    ExtensionPopup,
}

impl HostKind {
    pub fn label(&self) -> &'static str {
        match self {
            HostKind::None => "none",
            HostKind::ExtensionBackground => "background",
            HostKind::ExtensionTab => "tab",
            HostKind::ExtensionPopup => "popup",
        }
    }
}

impl std::fmt::Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Browser vendor behind the extension host API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostFlavor {
    Chromium,
    Firefox,
    #[default]
    Unknown,
}

/// Extension subsystem a context declares itself to be.
///
/// Supplied by the hosting application (its entry point knows whether it was
/// loaded as background, content script or popup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionRole {
    Background,
    Tab,
    Popup,
}

impl From<ExtensionRole> for HostKind {
    fn from(role: ExtensionRole) -> Self {
        match role {
            ExtensionRole::Background => HostKind::ExtensionBackground,
            ExtensionRole::Tab => HostKind::ExtensionTab,
            ExtensionRole::Popup => HostKind::ExtensionPopup,
        }
    }
}

/// Caller-supplied classification hints. Missing hints default safely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentHints {
    #[serde(default)]
    pub extension: Option<ExtensionRole>,
}

impl EnvironmentHints {
    /// Hints for a plain web context.
    pub fn web() -> Self {
        Self::default()
    }

    /// Hints for an extension subsystem.
    pub fn extension(role: ExtensionRole) -> Self {
        Self {
            extension: Some(role),
        }
    }
}

/// Immutable description of the current execution context.
///
/// Resolved once per context and shared by reference (`Rc<Environment>`)
/// between the bus and the transport adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub host_kind: HostKind,
    pub is_extension: bool,
    pub is_popout: bool,
    pub frame_has_parent: bool,
    pub host_flavor: HostFlavor,
    /// Unpacked (development) extension build.
    #[serde(default)]
    pub dev_mode: bool,
}

impl Environment {
    /// Descriptor for a context without any extension host.
    pub fn web(frame_has_parent: bool) -> Self {
        Self {
            frame_has_parent,
            ..Self::default()
        }
    }

    /// Fabricated extension descriptor, mainly for tests.
    pub fn extension(kind: HostKind, flavor: HostFlavor) -> Self {
        Self {
            host_kind: kind,
            is_extension: kind != HostKind::None,
            host_flavor: flavor,
            ..Self::default()
        }
    }

    /// True when emits must be routed through a transport.
    pub fn has_host(&self) -> bool {
        self.host_kind != HostKind::None
    }

    pub fn is_tab(&self) -> bool {
        self.host_kind == HostKind::ExtensionTab
    }
}
