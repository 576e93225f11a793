//! Integration tests for local dispatch and routing decisions.
//!
//! Uses fabricated environments and a recording transport, no host APIs.

use serde_json::json;
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use switchboard_bus::{BusError, EventBus, Handler, RecordingTransport, Strategy};
use switchboard_environment::{Environment, HostFlavor, HostKind};
use switchboard_events::{EmitOptions, Envelope, FrameHandle, RoutingHint, TabId};

fn extension_bus(kind: HostKind) -> (EventBus, RecordingTransport) {
    let recorder = RecordingTransport::new();
    let env = Rc::new(Environment::extension(kind, HostFlavor::Firefox));
    let bus = EventBus::new("test", env, Strategy::remote(recorder.clone()));
    (bus, recorder)
}

fn recording_handler(log: &Rc<RefCell<Vec<String>>>, label: &str) -> impl Fn(&Envelope) -> anyhow::Result<()> {
    let log = Rc::clone(log);
    let label = label.to_string();
    move |_| {
        log.borrow_mut().push(label.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

// =============================================================================
// Local fan-out
// =============================================================================

mod fan_out {
    use super::*;

    #[test]
    fn test_handlers_run_once_in_registration_order() {
        let bus = EventBus::local("web");
        let log = Rc::new(RefCell::new(Vec::new()));
        for label in ["h1", "h2", "h3", "h4"] {
            bus.on("ping", recording_handler(&log, label));
        }

        bus.emit("ping", json!({"n": 1}), EmitOptions::local()).unwrap();

        assert_eq!(*log.borrow(), vec!["h1", "h2", "h3", "h4"]);
    }

    #[test]
    fn test_handlers_share_the_same_payload() {
        let bus = EventBus::local("web");
        let seen = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..3 {
            let seen = Rc::clone(&seen);
            bus.on("ping", move |envelope| {
                seen.borrow_mut().push(&envelope.data as *const _ as usize);
                Ok(())
            });
        }

        bus.emit("ping", json!({"n": 1}), EmitOptions::local()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|addr| *addr == seen[0]));
    }

    #[test]
    fn test_failing_handler_does_not_stop_fan_out() {
        let bus = EventBus::local("web");
        let log = Rc::new(RefCell::new(Vec::new()));

        bus.on("ping", recording_handler(&log, "before"));
        bus.on("ping", |_| Err(anyhow::anyhow!("listener broke")));
        bus.on("ping", |_| panic!("listener panicked"));
        bus.on("ping", recording_handler(&log, "after"));

        let result = bus.emit("ping", json!({}), EmitOptions::local());

        assert!(result.is_ok());
        assert_eq!(*log.borrow(), vec!["before", "after"]);
    }

    #[test]
    fn test_handler_failure_logged_with_context() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .with_writer(move || writer.clone())
            .finish();

        let bus = EventBus::local("popup-7");
        bus.on("ping", |_| Err(anyhow::anyhow!("listener broke")));
        bus.on("ping", |_| panic!("listener panicked"));

        tracing::subscriber::with_default(subscriber, || {
            bus.emit_local("ping", json!({}));
        });

        let output = logs.contents();
        let failures: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("listener failed"))
            .collect();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|line| line.contains("context=popup-7")));
        assert!(failures.iter().all(|line| line.contains("event=ping")));
        assert!(output.contains("listener broke"));
        assert!(output.contains("listener panicked"));
    }

    #[test]
    fn test_other_events_untouched() {
        let bus = EventBus::local("web");
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("pong", recording_handler(&log, "pong"));

        bus.emit_local("ping", json!({}));

        assert!(log.borrow().is_empty());
    }
}

// =============================================================================
// once / off
// =============================================================================

mod registration {
    use super::*;

    #[test]
    fn test_once_runs_on_first_emit_only() {
        let bus = EventBus::local("web");
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        bus.once("ping", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        bus.emit_local("ping", json!({}));
        bus.emit_local("ping", json!({}));
        bus.emit_local("ping", json!({}));

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_off_by_id() {
        let bus = EventBus::local("web");
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = bus.on("ping", recording_handler(&log, "h"));

        assert!(bus.off("ping", id));
        bus.emit_local("ping", json!({}));

        assert!(log.borrow().is_empty());
        assert_eq!(bus.listener_count("ping"), 0);
    }

    #[test]
    fn test_off_by_handler() {
        let bus = EventBus::local("web");
        let log = Rc::new(RefCell::new(Vec::new()));
        let handler: Handler = Rc::new(recording_handler(&log, "h"));
        bus.on_handler("ping", Rc::clone(&handler));

        assert!(bus.off_handler("ping", &handler));
        bus.emit_local("ping", json!({}));

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_off_unknown_is_noop() {
        let bus = EventBus::local("web");
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = bus.on("ping", recording_handler(&log, "kept"));
        let stranger: Handler = Rc::new(|_: &Envelope| -> anyhow::Result<()> { Ok(()) });

        assert!(!bus.off_handler("ping", &stranger));
        assert!(!bus.off("pong", id));
        bus.emit_local("ping", json!({}));

        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn test_listener_counts() {
        let bus = EventBus::local("web");
        bus.on("a", |_| Ok(()));
        bus.on("a", |_| Ok(()));
        bus.once("b", |_| Ok(()));

        assert_eq!(bus.listener_count("a"), 2);
        assert_eq!(bus.total_listeners(), 3);
    }
}

// =============================================================================
// Routing
// =============================================================================

mod routing {
    use super::*;

    #[test]
    fn test_conflicting_targets_rejected_without_send() {
        let (bus, recorder) = extension_bus(HostKind::ExtensionBackground);
        let options = EmitOptions {
            target_tab: Some(TabId(3)),
            target_parent_frame: Some(FrameHandle::new(1)),
            ..EmitOptions::default()
        };

        let err = bus.emit("ping", json!({}), options).unwrap_err();

        assert!(matches!(err, BusError::RoutingConflict(_)));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_conflicting_targets_rejected_without_host() {
        let bus = EventBus::local("web");
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        bus.on("ping", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let options = EmitOptions {
            local_only: true,
            target_tab: Some(TabId(3)),
            target_parent_frame: Some(FrameHandle::new(1)),
        };

        let err = bus.emit("ping", json!({}), options).unwrap_err();

        assert!(matches!(err, BusError::RoutingConflict(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_conflicting_targets_rejected_when_local_only() {
        let (bus, recorder) = extension_bus(HostKind::ExtensionPopup);
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("ping", recording_handler(&log, "local"));
        let options = EmitOptions {
            local_only: true,
            target_tab: Some(TabId(3)),
            target_parent_frame: Some(FrameHandle::new(1)),
        };

        assert!(bus.emit("ping", json!({}), options).is_err());
        assert!(log.borrow().is_empty());
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_no_host_behaves_like_local_only() {
        let recorder = RecordingTransport::new();
        let bus = EventBus::new(
            "web",
            Rc::new(Environment::web(true)),
            Strategy::remote(recorder.clone()),
        );
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("ping", recording_handler(&log, "plain"));
        bus.on("ping", recording_handler(&log, "plain"));

        bus.emit("ping", json!({}), EmitOptions::default()).unwrap();
        bus.emit("ping", json!({}), EmitOptions::local()).unwrap();

        assert_eq!(log.borrow().len(), 4);
        assert_eq!(recorder.len(), 0);
    }

    #[test]
    fn test_tab_target() {
        let (bus, recorder) = extension_bus(HostKind::ExtensionBackground);
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("ping", recording_handler(&log, "local"));

        bus.emit("ping", json!({"n": 1}), EmitOptions::to_tab(TabId(12)))
            .unwrap();

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].hint, RoutingHint::Tab(TabId(12)));
        assert_eq!(sent[0].message.event, "ping");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_parent_frame_target() {
        let (bus, recorder) = extension_bus(HostKind::ExtensionTab);

        bus.emit("ping", json!({}), EmitOptions::to_parent(FrameHandle::new(8)))
            .unwrap();

        assert_eq!(recorder.sent()[0].hint, RoutingHint::ParentFrame(FrameHandle::new(8)));
    }

    #[test]
    fn test_local_only_in_extension_context() {
        let (bus, recorder) = extension_bus(HostKind::ExtensionPopup);
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("ping", recording_handler(&log, "local"));

        bus.emit("ping", json!({}), EmitOptions::local()).unwrap();

        assert_eq!(*log.borrow(), vec!["local"]);
        assert!(recorder.is_empty());
    }
}
