//! Feature modules: consumers of the bus contract.

mod availability;
mod ui;
mod user;

pub use availability::{AvailabilityModule, AvailabilityState};
pub use ui::{UiModule, WidgetState};
pub use user::{LoginOutcome, UserModule};

use crate::app::App;
use std::rc::Rc;

/// Feature modules loaded for one context.
pub struct Modules {
    pub ui: Rc<UiModule>,
    pub user: Rc<UserModule>,
    pub availability: Rc<AvailabilityModule>,
}

impl Modules {
    pub fn load(app: &Rc<App>) -> Self {
        let ui = Rc::new(UiModule::new(Rc::clone(app)));
        let user = Rc::new(UserModule::new(Rc::clone(app), Rc::clone(&ui)));
        let availability = AvailabilityModule::new(Rc::clone(app));

        tracing::debug!(context = %app, listeners = app.bus().total_listeners(), "modules loaded");

        Self {
            ui,
            user,
            availability,
        }
    }
}
