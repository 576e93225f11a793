//! Probe traits for ambient host capabilities.
//!
//! These abstract the global-scope lookups a real context performs,
//! so resolution stays pure and testable with fabricated values.

/// Read-only view over the globals a context can inspect at startup.
pub trait HostProbe {
    /// Whether the `browser` extension namespace is bound.
    fn has_browser_namespace(&self) -> bool;

    /// Whether the `chrome` extension namespace is bound.
    fn has_chrome_namespace(&self) -> bool;

    /// Query string of the current navigable, including the leading `?`.
    fn location_search(&self) -> String;

    /// Whether this document is nested inside a parent frame.
    fn has_parent_frame(&self) -> bool;

    /// Whether the extension manifest carries an `update_url`
    /// (store-installed builds do, unpacked builds do not).
    fn manifest_has_update_url(&self) -> bool {
        true
    }
}

/// Probe for a plain web page with no host API.
pub struct NullProbe;

impl HostProbe for NullProbe {
    fn has_browser_namespace(&self) -> bool {
        false
    }

    fn has_chrome_namespace(&self) -> bool {
        false
    }

    fn location_search(&self) -> String {
        String::new()
    }

    fn has_parent_frame(&self) -> bool {
        false
    }
}

/// Probe with fixed answers.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    pub browser_namespace: bool,
    pub chrome_namespace: bool,
    pub search: String,
    pub parent_frame: bool,
    pub update_url: bool,
}

impl StaticProbe {
    pub fn chromium() -> Self {
        Self {
            chrome_namespace: true,
            update_url: true,
            ..Self::default()
        }
    }

    /// Firefox binds both namespaces.
    pub fn firefox() -> Self {
        Self {
            browser_namespace: true,
            chrome_namespace: true,
            update_url: true,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_parent_frame(mut self) -> Self {
        self.parent_frame = true;
        self
    }

    pub fn unpacked(mut self) -> Self {
        self.update_url = false;
        self
    }
}

impl HostProbe for StaticProbe {
    fn has_browser_namespace(&self) -> bool {
        self.browser_namespace
    }

    fn has_chrome_namespace(&self) -> bool {
        self.chrome_namespace
    }

    fn location_search(&self) -> String {
        self.search.clone()
    }

    fn has_parent_frame(&self) -> bool {
        self.parent_frame
    }

    fn manifest_has_update_url(&self) -> bool {
        self.update_url
    }
}
