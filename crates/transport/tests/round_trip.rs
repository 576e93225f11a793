//! End-to-end tests: bus -> adapter -> fake host -> adapter -> bus.

use serde_json::json;
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use switchboard_bus::{BusError, EventBus, Strategy, TransportError};
use switchboard_environment::{Environment, HostFlavor, HostKind};
use switchboard_events::{EmitOptions, Envelope, FrameHandle, ReplyHandle, SenderInfo, TabId};
use switchboard_transport::fake::{FakeExtensionHost, FakeWindow};
use switchboard_transport::{ExtensionTransport, FrameAdapter, RuntimeAdapter};

struct Context {
    bus: Rc<EventBus>,
    host: Rc<FakeExtensionHost>,
    window: Rc<FakeWindow>,
    frame: Rc<FrameAdapter>,
}

fn extension_context(kind: HostKind) -> Context {
    let env = Rc::new(Environment::extension(kind, HostFlavor::Chromium));
    let host = Rc::new(FakeExtensionHost::new());
    let window = Rc::new(FakeWindow::new());

    let runtime = Rc::new(
        RuntimeAdapter::new(Rc::clone(&env), host.clone()).with_window_bridge(window.clone()),
    );
    let frame = Rc::new(FrameAdapter::new(window.clone()));
    let transport = ExtensionTransport::new(Rc::clone(&runtime)).with_frame(Rc::clone(&frame));

    let bus = Rc::new(EventBus::new("test", env, Strategy::remote(transport)));
    runtime.listen(&bus);

    Context {
        bus,
        host,
        window,
        frame,
    }
}

fn count_pings(bus: &EventBus) -> Rc<RefCell<Vec<Envelope>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    bus.on("ping", move |envelope| {
        log.borrow_mut().push(envelope.clone());
        Ok(())
    });
    seen
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
// Extension runtime
// =============================================================================

mod runtime {
    use super::*;

    #[test]
    fn test_broadcast_round_trip_attaches_sender() {
        let ctx = extension_context(HostKind::ExtensionBackground);
        let seen = count_pings(&ctx.bus);

        ctx.bus.broadcast("ping", json!({"n": 1})).unwrap();
        assert!(seen.borrow().is_empty(), "sender is not a recipient");

        let sent = ctx.host.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tab, None);
        ctx.host.loop_back(&sent[0], SenderInfo::from_tab(TabId(9)));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].data["n"], 1);
        assert_eq!(
            seen[0].origin_sender.as_ref().and_then(|sender| sender.tab),
            Some(TabId(9))
        );
    }

    #[test]
    fn test_tab_message_addressed() {
        let ctx = extension_context(HostKind::ExtensionBackground);

        ctx.bus
            .emit("ping", json!({}), EmitOptions::to_tab(TabId(42)))
            .unwrap();

        let sent = ctx.host.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tab, Some(TabId(42)));
    }

    #[test]
    fn test_reply_survives_runtime() {
        let ctx = extension_context(HostKind::ExtensionPopup);
        let answer = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&answer);

        ctx.bus.on("ping", |envelope| {
            envelope.respond(json!({"pong": true}));
            Ok(())
        });

        let envelope = Envelope::new("ping", json!({}))
            .with_reply(ReplyHandle::new(move |value| *slot.borrow_mut() = Some(value)));
        ctx.bus.emit_envelope(envelope, EmitOptions::default()).unwrap();

        let sent = ctx.host.take_sent();
        assert!(sent[0].reply.is_some());
        ctx.host.loop_back(&sent[0], SenderInfo::default());

        assert_eq!(*answer.borrow(), Some(json!({"pong": true})));
    }

    #[test]
    fn test_host_failure_surfaces() {
        let ctx = extension_context(HostKind::ExtensionPopup);
        ctx.host.set_disconnected(true);

        let err = ctx.bus.broadcast("ping", json!({})).unwrap_err();

        assert!(matches!(err, BusError::Transport(TransportError::Host(_))));
    }

    #[test]
    fn test_conflict_sends_nothing() {
        let ctx = extension_context(HostKind::ExtensionTab);
        let options = EmitOptions {
            target_tab: Some(TabId(1)),
            target_parent_frame: Some(FrameHandle::new(1)),
            ..EmitOptions::default()
        };

        assert!(ctx.bus.emit("ping", json!({}), options).is_err());
        assert!(ctx.host.sent().is_empty());
        assert!(ctx.window.posted().is_empty());
    }

    #[test]
    fn test_tab_bridges_window_messages() {
        let ctx = extension_context(HostKind::ExtensionTab);
        let seen = count_pings(&ctx.bus);

        ctx.window.dispatch(json!({"event": "ping", "data": {"n": 3}}));
        ctx.window.dispatch(json!({"unrelated": true}));

        assert_eq!(ctx.window.listener_count(), 1);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].data["n"], 3);
        assert!(seen[0].origin_sender.is_none());
    }
}

// =============================================================================
// Frame messaging
// =============================================================================

mod frame {
    use super::*;

    #[test]
    fn test_parent_frame_round_trip() {
        let ctx = extension_context(HostKind::ExtensionTab);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        // Receiving side: a plain page listening for frame messages.
        let parent_window = Rc::new(FakeWindow::new());
        let parent_bus = Rc::new(EventBus::local("parent"));
        let parent_frame = FrameAdapter::new(parent_window.clone());
        parent_frame.listen(&parent_bus);
        parent_bus.on("ping", move |envelope| {
            assert_eq!(envelope.data["n"], 1);
            counter.set(counter.get() + 1);
            Ok(())
        });

        ctx.bus
            .emit("ping", json!({"n": 1}), EmitOptions::to_parent(FrameHandle::new(5)))
            .unwrap();

        let posted = ctx.window.posted();
        assert_eq!(posted.len(), 1);
        assert!(ctx.host.sent().is_empty());
        parent_window.dispatch(posted[0].message.clone());

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reply_stripped_and_warned() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let ctx = extension_context(HostKind::ExtensionTab);
        let envelope = Envelope::new("ping", json!({"n": 1})).with_reply(ReplyHandle::new(|_| {}));

        tracing::subscriber::with_default(subscriber, || {
            ctx.bus
                .emit_envelope(envelope, EmitOptions::to_parent(FrameHandle::new(2)))
                .unwrap();
        });

        let posted = ctx.window.posted();
        assert_eq!(posted.len(), 1);
        let message = posted[0].message.as_object().unwrap();
        let mut keys: Vec<&String> = message.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["data", "event"]);
        assert_eq!(ctx.frame.stripped_replies(), 1);
        assert!(logs.contents().contains("unsupported payload"));
    }
}
