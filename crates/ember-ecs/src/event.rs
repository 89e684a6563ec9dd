use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::error::EcsResult;
use crate::registry::Registry;

/// Marker trait for event payloads.
pub trait Event: 'static {}

/// Blanket implementation: any `'static` type can be emitted.
impl<T: 'static> Event for T {}

type Handler<E> = Rc<dyn Fn(&mut Registry, &EventBus, &E) -> EcsResult<()>>;

/// Synchronous, type-keyed publish/subscribe channel.
///
/// Handlers are closures, usually holding an `Rc` of the system that subscribed
/// them. The frame loop calls [`reset`](Self::reset) once per step before systems
/// subscribe again, which drops every handler and with it every captured system
/// reference.
///
/// Emission is re-entrant: a handler receives the bus and may emit further
/// events, which reach their subscribers before the outer emission continues.
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events of type `E`. Handlers run in subscription order.
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: Event,
        F: Fn(&mut Registry, &EventBus, &E) -> EcsResult<()> + 'static,
    {
        let mut subscribers = self.subscribers.borrow_mut();
        let handlers = subscribers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Handler<E>>::new()));
        if let Some(handlers) = handlers.downcast_mut::<Vec<Handler<E>>>() {
            handlers.push(Rc::new(handler));
        }
    }

    /// Deliver `event` to every handler currently subscribed to `E`.
    ///
    /// Emitting with no subscribers does nothing. The first handler error stops
    /// delivery and is returned.
    pub fn emit<E: Event>(&self, registry: &mut Registry, event: E) -> EcsResult<()> {
        // Clone the handler list so handlers may subscribe, reset or emit while
        // this emission is still running.
        let handlers: Vec<Handler<E>> = {
            let subscribers = self.subscribers.borrow();
            match subscribers
                .get(&TypeId::of::<E>())
                .and_then(|h| h.downcast_ref::<Vec<Handler<E>>>())
            {
                Some(handlers) => handlers.clone(),
                None => return Ok(()),
            }
        };

        trace!(
            event = std::any::type_name::<E>(),
            handlers = handlers.len(),
            "emitting event"
        );
        for handler in handlers {
            handler(registry, self, &event)?;
        }
        Ok(())
    }

    /// Drop every handler of every event type.
    pub fn reset(&self) {
        self.subscribers.borrow_mut().clear();
    }

    /// Number of handlers subscribed to `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscribers
            .borrow()
            .get(&TypeId::of::<E>())
            .and_then(|h| h.downcast_ref::<Vec<Handler<E>>>())
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::error::EcsError;
    use crate::signature::Signature;
    use crate::system::System;

    struct Ping(u32);
    struct Pong(u32);

    #[test]
    fn emit_without_subscribers_is_noop() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        assert_eq!(bus.emit(&mut registry, Ping(1)), Ok(()));
        assert_eq!(bus.subscriber_count::<Ping>(), 0);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for id in 0..3 {
            let log = Rc::clone(&log);
            bus.subscribe::<Ping, _>(move |_, _, ping| {
                log.borrow_mut().push((id, ping.0));
                Ok(())
            });
        }
        bus.emit(&mut registry, Ping(7)).unwrap();
        assert_eq!(*log.borrow(), vec![(0, 7), (1, 7), (2, 7)]);
    }

    #[test]
    fn reset_drops_all_handlers() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        bus.subscribe::<Ping, _>(move |_, _, _| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        bus.emit(&mut registry, Ping(0)).unwrap();
        assert_eq!(hits.get(), 1);

        bus.reset();
        assert_eq!(bus.subscriber_count::<Ping>(), 0);
        bus.emit(&mut registry, Ping(0)).unwrap();
        assert_eq!(hits.get(), 1);
        // The captured counter was released with the handler.
        assert_eq!(Rc::strong_count(&hits), 1);
    }

    #[test]
    fn nested_emission_is_dispatched_immediately() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let outer = Rc::clone(&log);
        bus.subscribe::<Ping, _>(move |registry, bus, ping| {
            outer.borrow_mut().push(format!("ping {}", ping.0));
            bus.emit(registry, Pong(ping.0 + 1))?;
            outer.borrow_mut().push("ping done".to_string());
            Ok(())
        });
        let inner = Rc::clone(&log);
        bus.subscribe::<Pong, _>(move |_, _, pong| {
            inner.borrow_mut().push(format!("pong {}", pong.0));
            Ok(())
        });

        bus.emit(&mut registry, Ping(1)).unwrap();
        assert_eq!(*log.borrow(), vec!["ping 1", "pong 2", "ping done"]);
    }

    #[test]
    fn handler_errors_propagate() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        let ghost = registry.create_entity();
        registry.kill_entity(ghost).unwrap();
        registry.update();

        bus.subscribe::<Ping, _>(move |registry, _, _| registry.kill_entity(ghost));
        assert_eq!(
            bus.emit(&mut registry, Ping(0)),
            Err(EcsError::InvalidEntity(ghost))
        );
    }

    struct Counter {
        seen: Cell<u32>,
    }

    impl System for Counter {
        fn signature(&self) -> Signature {
            Signature::EMPTY
        }
    }

    impl Counter {
        fn subscribe_to_events(self: &Rc<Self>, bus: &EventBus) {
            let this = Rc::clone(self);
            bus.subscribe::<Ping, _>(move |_, _, ping| {
                this.seen.set(this.seen.get() + ping.0);
                Ok(())
            });
        }
    }

    #[test]
    fn resubscribing_each_step_does_not_accumulate() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        registry
            .add_system(Counter { seen: Cell::new(0) })
            .unwrap();

        for _ in 0..3 {
            bus.reset();
            registry.system::<Counter>().unwrap().subscribe_to_events(&bus);
            registry.update();
            bus.emit(&mut registry, Ping(1)).unwrap();
        }
        assert_eq!(bus.subscriber_count::<Ping>(), 1);
        assert_eq!(registry.system::<Counter>().unwrap().seen.get(), 3);
    }
}
