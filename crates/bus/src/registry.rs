//! Listener registration table.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use switchboard_events::Envelope;

/// A registered listener.
pub type Handler = Rc<dyn Fn(&Envelope) -> anyhow::Result<()>>;

/// Identifies one registration; returned by `on`/`once`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: ListenerId,
    pub(crate) handler: Handler,
    pub(crate) once: bool,
    /// Guards a `once` registration against firing twice when a nested emit
    /// reaches it before the outer dispatch does.
    pub(crate) fired: Rc<Cell<bool>>,
}

/// Event name -> listeners in insertion order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<String, Vec<Registration>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, event: &str, handler: Handler, once: bool) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(Registration {
                id,
                handler,
                once,
                fired: Rc::new(Cell::new(false)),
            });
        id
    }

    /// Remove the registration with this id. Returns false if absent.
    pub fn remove(&mut self, event: &str, id: ListenerId) -> bool {
        self.remove_first(event, |registration| registration.id == id)
    }

    /// Remove the first registration of this exact handler.
    pub fn remove_handler(&mut self, event: &str, handler: &Handler) -> bool {
        let target = Rc::as_ptr(handler) as *const u8;
        self.remove_first(event, |registration| {
            Rc::as_ptr(&registration.handler) as *const u8 == target
        })
    }

    fn remove_first<F>(&mut self, event: &str, matches: F) -> bool
    where
        F: Fn(&Registration) -> bool,
    {
        let Some(list) = self.listeners.get_mut(event) else {
            return false;
        };
        let Some(index) = list.iter().position(matches) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.listeners.remove(event);
        }
        true
    }

    /// Registrations for an event at this instant, in insertion order.
    pub(crate) fn snapshot(&self, event: &str) -> Vec<Registration> {
        self.listeners.get(event).cloned().unwrap_or_default()
    }

    pub fn count(&self, event: &str) -> usize {
        self.listeners.get(event).map(Vec::len).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.keys().cloned().collect();
        names.sort();
        names
    }
}
