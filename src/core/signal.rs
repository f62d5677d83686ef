//! Typed per-surface signals.
//!
//! A layer surface controller subscribes handler functions to the signals of
//! its surface when it is created. The returned [`Subscription`] is owned by
//! the controller; dropping it (on destruction or on any failed construction
//! path) removes every handler, so no signal is ever delivered to a
//! controller that no longer exists.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::core::SurfaceId;

/// Signals emitted for a layer surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSignal {
    /// The underlying surface became presentable
    Map,
    /// The underlying surface withdrew its buffer
    Unmap,
    /// New state was committed
    Commit,
    /// The owning output is going away
    OutputDestroy,
    /// The client destroyed the surface
    Destroy,
}

/// Handler invoked with the dispatching state and the surface.
pub type Handler<S> = fn(&mut S, SurfaceId);

type ListenerMap<S> = HashMap<(SurfaceId, SurfaceSignal), Handler<S>>;

/// Registry of signal handlers.
pub struct SignalHub<S> {
    listeners: Rc<RefCell<ListenerMap<S>>>,
}

impl<S> Default for SignalHub<S> {
    fn default() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<S> SignalHub<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers handlers for `surface`. Registration is all-or-nothing: if a
    /// handler for one of the signals already exists nothing is registered.
    pub fn subscribe(
        &self,
        surface: SurfaceId,
        handlers: &[(SurfaceSignal, Handler<S>)],
    ) -> Option<Subscription<S>> {
        let mut listeners = self.listeners.borrow_mut();
        if handlers.iter().any(|(signal, _)| listeners.contains_key(&(surface, *signal))) {
            return None;
        }
        for (signal, handler) in handlers {
            listeners.insert((surface, *signal), *handler);
        }
        Some(Subscription {
            surface,
            signals: handlers.iter().map(|(signal, _)| *signal).collect(),
            listeners: Rc::downgrade(&self.listeners),
        })
    }

    /// Looks up the handler. The borrow ends before the handler runs, so
    /// handlers may subscribe or drop subscriptions themselves.
    pub fn handler(&self, surface: SurfaceId, signal: SurfaceSignal) -> Option<Handler<S>> {
        self.listeners.borrow().get(&(surface, signal)).copied()
    }

    pub fn is_subscribed(&self, surface: SurfaceId) -> bool {
        self.listeners.borrow().keys().any(|(id, _)| *id == surface)
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scoped registration of a surface's handlers.
pub struct Subscription<S> {
    surface: SurfaceId,
    signals: Vec<SurfaceSignal>,
    listeners: Weak<RefCell<ListenerMap<S>>>,
}

impl<S> Subscription<S> {
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.borrow_mut();
            for signal in &self.signals {
                listeners.remove(&(self.surface, *signal));
            }
        }
    }
}

impl<S> std::fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("surface", &self.surface)
            .field("signals", &self.signals)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        maps: Vec<SurfaceId>,
    }

    fn on_map(state: &mut Counter, surface: SurfaceId) {
        state.maps.push(surface);
    }

    fn noop(_: &mut Counter, _: SurfaceId) {}

    #[test]
    fn test_subscription_drop_removes_handlers() {
        let hub = SignalHub::<Counter>::new();
        let mut state = Counter::default();

        let handlers: [(SurfaceSignal, Handler<Counter>); 2] =
            [(SurfaceSignal::Map, on_map), (SurfaceSignal::Destroy, noop)];
        let sub = hub.subscribe(1, &handlers).unwrap();
        assert_eq!(hub.len(), 2);

        let handler = hub.handler(1, SurfaceSignal::Map).unwrap();
        handler(&mut state, 1);
        assert_eq!(state.maps, vec![1]);
        assert!(hub.handler(1, SurfaceSignal::Unmap).is_none());

        drop(sub);
        assert!(hub.is_empty());
        assert!(!hub.is_subscribed(1));
        assert!(hub.handler(1, SurfaceSignal::Map).is_none());
    }

    #[test]
    fn test_double_subscribe_is_refused() {
        let hub = SignalHub::<Counter>::new();
        let _first = hub.subscribe(3, &[(SurfaceSignal::Commit, noop as Handler<Counter>)]).unwrap();
        let overlapping: [(SurfaceSignal, Handler<Counter>); 2] =
            [(SurfaceSignal::Map, on_map), (SurfaceSignal::Commit, noop)];
        assert!(hub.subscribe(3, &overlapping).is_none());
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn test_subscription_outliving_hub() {
        let hub = SignalHub::<Counter>::new();
        let sub = hub.subscribe(5, &[(SurfaceSignal::Map, on_map as Handler<Counter>)]).unwrap();
        drop(hub);
        drop(sub);
    }
}
