use crate::app::App;
use serde::Serialize;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;
use switchboard_bus::BusError;
use switchboard_events::event_names::{WIDGETS_REFRESH, WIDGETS_RESET};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub loaded: bool,
    pub open: bool,
}

pub struct UiModule {
    app: Rc<App>,
    state: Cell<WidgetState>,
}

impl UiModule {
    pub fn new(app: Rc<App>) -> Self {
        Self {
            app,
            state: Cell::new(WidgetState::default()),
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state.get()
    }

    /// Ask every widget to reload its data.
    pub fn refresh_widgets(&self, open: bool) -> Result<(), BusError> {
        self.state.set(WidgetState { loaded: true, open });
        tracing::debug!(context = %self.app, open, "refreshing widgets");
        self.app.emit(WIDGETS_REFRESH, json!({ "open": open }))
    }

    pub fn reset_widget_state(&self) -> Result<(), BusError> {
        self.state.set(WidgetState::default());
        self.app.emit(WIDGETS_RESET, json!({}))
    }
}
