//! Example: a popup changes availability through the background context.
//!
//! Run with: cargo run -p switchboard-application --example availability_round_trip

use serde_json::json;
use std::rc::Rc;
use switchboard_application::{
    init_tracing, ApiResponse, App, ContextConfig, Modules, RecordingIndicator, ScriptedApi,
};
use switchboard_environment::{ExtensionRole, StaticProbe};
use switchboard_events::event_names::{AVAILABILITY_CHANGED, UPDATE_AVAILABILITY};
use switchboard_events::{SenderInfo, TabId};
use switchboard_transport::fake::FakeExtensionHost;

fn main() -> anyhow::Result<()> {
    let bg_config = ContextConfig::new("bg")
        .with_role(ExtensionRole::Background)
        .verbose(true);
    init_tracing(&bg_config.log_filter);

    let api = Rc::new(ScriptedApi::new());
    api.respond(
        "GET",
        "api/userdestination/",
        ApiResponse::new(
            200,
            json!({"objects": [{
                "fixeddestinations": [{"id": 1, "phonenumber": "+31501234567", "description": "Office"}],
                "phoneaccounts": [],
                "selecteduserdestination": {"id": 9, "fixeddestination": null, "phoneaccount": null}
            }]}),
        ),
    );
    api.respond("PUT", "api/selecteduserdestination/9/", ApiResponse::new(200, json!({})));

    // One fake host per context; sends are shuttled by hand below.
    let bg_host = Rc::new(FakeExtensionHost::new());
    let popup_host = Rc::new(FakeExtensionHost::new());
    let indicator = Rc::new(RecordingIndicator::new());

    let bg = App::builder(bg_config, api.clone())
        .probe(StaticProbe::chromium())
        .extension_host(bg_host.clone())
        .indicator(indicator.clone())
        .build()?;
    let bg_modules = Modules::load(&bg);

    let popup = App::builder(
        ContextConfig::new("popup").with_role(ExtensionRole::Popup),
        api.clone(),
    )
    .probe(StaticProbe::chromium().with_search("?popout=true"))
    .extension_host(popup_host.clone())
    .build()?;

    popup.on(AVAILABILITY_CHANGED, |envelope| {
        println!("popup sees availability change: {}", envelope.data);
        Ok(())
    });

    let state = bg_modules.availability.fetch()?;
    println!("destinations: {:?}", state.destinations);
    println!("popup is popout: {}", popup.env().is_popout);

    popup.emit(
        UPDATE_AVAILABILITY,
        json!({"selected": {"id": 1, "name": "+31501234567 - Office", "type": "fixeddestination"}}),
    )?;
    for send in popup_host.take_sent() {
        bg_host.loop_back(&send, SenderInfo::default());
    }
    for send in bg_host.take_sent() {
        popup_host.loop_back(&send, SenderInfo::from_tab(TabId(1)));
    }

    println!("icons: {:?}", indicator.icons());
    Ok(())
}
