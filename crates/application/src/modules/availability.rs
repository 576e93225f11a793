use crate::app::App;
use crate::indicator::{ICON_AVAILABLE, ICON_UNAVAILABLE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::rc::{Rc, Weak};
use switchboard_events::event_names::{AVAILABILITY_CHANGED, UPDATE_AVAILABILITY};
use switchboard_events::{
    AvailabilityChanged, AvailabilityUpdate, Destination, DestinationKind, Selection,
};

const STORE_KEY: &str = "availability";
const DESTINATIONS_PATH: &str = "api/userdestination/";

/// Persisted availability of the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityState {
    pub available: bool,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub selected: Selection,
    /// Selected user destination resource id.
    #[serde(default)]
    pub sud: Option<i64>,
    #[serde(default)]
    pub icon: Option<String>,
}

pub struct AvailabilityModule {
    app: Rc<App>,
}

impl AvailabilityModule {
    /// Create the module and subscribe it to availability updates.
    pub fn new(app: Rc<App>) -> Rc<Self> {
        let module = Rc::new(Self {
            app: Rc::clone(&app),
        });

        let weak: Weak<Self> = Rc::downgrade(&module);
        app.on(UPDATE_AVAILABILITY, move |envelope| {
            let Some(module) = weak.upgrade() else {
                return Ok(());
            };
            let update: AvailabilityUpdate = envelope.parse()?;
            module.update(update)
        });

        module
    }

    pub fn state(&self) -> AvailabilityState {
        self.app
            .store()
            .get(STORE_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    fn save(&self, state: &AvailabilityState) -> anyhow::Result<()> {
        self.app.store().set(STORE_KEY, serde_json::to_value(state)?);
        Ok(())
    }

    /// Persist a new selection and push it to the API.
    pub fn update(&self, update: AvailabilityUpdate) -> anyhow::Result<()> {
        let mut state = self.state();
        state.selected = update.selected;
        state.destinations = update.destinations;
        self.save(&state)?;

        let Some(sud) = state.sud else {
            tracing::warn!(context = %self.app, "no selected user destination, skipping update");
            return Ok(());
        };

        let body = json!({
            "fixeddestination": state.selected.id_for(DestinationKind::FixedDestination),
            "phoneaccount": state.selected.id_for(DestinationKind::PhoneAccount),
        });
        let res = self
            .app
            .api()
            .put(&format!("api/selecteduserdestination/{sud}/"), body)?;

        if res.is_unauthorized() {
            tracing::warn!(context = %self.app, status = res.status, "unauthorized availability request");
            return Ok(());
        }

        state.available = state.selected.is_available();
        state.icon = Some(icon_for(state.available).to_string());
        self.save(&state)?;
        self.apply_icon(&state);

        tracing::info!(context = %self.app, available = state.available, "availability updated");
        self.app.emit(
            AVAILABILITY_CHANGED,
            serde_json::to_value(AvailabilityChanged {
                available: state.available,
                selected: state.selected,
            })?,
        )?;
        Ok(())
    }

    /// Load the user's destinations and current selection from the API.
    pub fn fetch(&self) -> anyhow::Result<AvailabilityState> {
        let res = self.app.api().get(DESTINATIONS_PATH)?;
        if res.is_unauthorized() {
            tracing::warn!(context = %self.app, status = res.status, "unauthorized destinations request");
            return Ok(self.state());
        }
        if !res.is_ok() {
            anyhow::bail!("destinations request failed with status {}", res.status);
        }

        let Some(object) = res.body.get("objects").and_then(|o| o.get(0)) else {
            tracing::debug!(context = %self.app, "no user destination");
            return Ok(self.state());
        };

        let mut destinations = Vec::new();
        destinations.extend(parse_destinations(
            object.get("fixeddestinations"),
            DestinationKind::FixedDestination,
            "phonenumber",
        ));
        destinations.extend(parse_destinations(
            object.get("phoneaccounts"),
            DestinationKind::PhoneAccount,
            "internal_number",
        ));

        let sud_value = object.get("selecteduserdestination");
        let selected_fixed = sud_value.and_then(|s| as_id(s.get("fixeddestination")));
        let selected_account = sud_value.and_then(|s| as_id(s.get("phoneaccount")));

        let selected = destinations
            .iter()
            .find(|d| match d.kind {
                DestinationKind::FixedDestination => selected_fixed == Some(d.id),
                DestinationKind::PhoneAccount => selected_account == Some(d.id),
            })
            .map(Selection::from)
            .unwrap_or_default();

        let available = selected.is_available();
        let state = AvailabilityState {
            available,
            destinations,
            selected,
            sud: sud_value.and_then(|s| as_id(s.get("id"))),
            icon: Some(icon_for(available).to_string()),
        };
        self.save(&state)?;
        self.apply_icon(&state);

        tracing::debug!(
            context = %self.app,
            destinations = state.destinations.len(),
            available,
            "destinations loaded"
        );
        Ok(state)
    }

    /// Reflect availability in the toolbar icon, unless a queue owns it.
    fn apply_icon(&self, state: &AvailabilityState) {
        if !self.app.env().is_extension || self.queue_selected() {
            return;
        }
        if let (Some(indicator), Some(icon)) = (self.app.indicator(), state.icon.as_deref()) {
            indicator.set_icon(icon);
        }
    }

    fn queue_selected(&self) -> bool {
        self.app
            .store()
            .get("queues")
            .and_then(|queues| queues.get("selectedQueue").cloned())
            .is_some_and(|queue| !queue.is_null())
    }
}

fn icon_for(available: bool) -> &'static str {
    if available {
        ICON_AVAILABLE
    } else {
        ICON_UNAVAILABLE
    }
}

/// Ids arrive as numbers or numeric strings.
fn as_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_destinations(
    list: Option<&Value>,
    kind: DestinationKind,
    number_key: &str,
) -> Vec<Destination> {
    let Some(items) = list.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let id = as_id(item.get("id"))?;
            let number = match item.get(number_key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };
            let description = item
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(Destination {
                id,
                name: format!("{number} - {description}"),
                kind,
            })
        })
        .collect()
}
