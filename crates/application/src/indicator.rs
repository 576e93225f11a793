//! Toolbar icon side-channel.

use std::cell::RefCell;

pub const ICON_AVAILABLE: &str = "img/icon-menubar-active.png";
pub const ICON_UNAVAILABLE: &str = "img/icon-menubar-unavailable.png";

/// Host primitive that sets the extension's toolbar icon.
pub trait IndicatorHost {
    fn set_icon(&self, path: &str);
}

/// Indicator that remembers every icon it was asked to show.
#[derive(Default)]
pub struct RecordingIndicator {
    icons: RefCell<Vec<String>>,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icons(&self) -> Vec<String> {
        self.icons.borrow().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.icons.borrow().last().cloned()
    }
}

impl IndicatorHost for RecordingIndicator {
    fn set_icon(&self, path: &str) {
        self.icons.borrow_mut().push(path.to_string());
    }
}
