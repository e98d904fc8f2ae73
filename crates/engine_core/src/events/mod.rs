//! Synchronous publish/subscribe event bus
//!
//! Producers publish an [`Event`]; every handler subscribed to that exact
//! [`EventType`] runs immediately, in subscription order. Handlers receive
//! the bus itself so they can publish or subscribe while being dispatched.
//!
//! The bus is single-threaded (`Rc`/`RefCell`) and intentionally `!Send`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ecs::EntityId;
use crate::foundation::math::Vec3;

/// Integer event type identifier
///
/// Applications define their own types below [`engine_events::ENGINE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventType(pub u32);

/// Event types published by the engine itself
pub mod engine_events {
    use super::EventType;

    /// First id reserved for engine events
    pub const ENGINE_RANGE: u32 = 0x8000_0000;

    /// An entity was spawned through the engine context
    pub const ENTITY_SPAWNED: EventType = EventType(ENGINE_RANGE);
    /// An entity was despawned through the engine context
    pub const ENTITY_DESPAWNED: EventType = EventType(ENGINE_RANGE + 1);
    /// Initialization completed and the frame loop may start
    pub const ENGINE_STARTED: EventType = EventType(ENGINE_RANGE + 2);
    /// Shutdown has begun; subsystems are still alive
    pub const ENGINE_STOPPING: EventType = EventType(ENGINE_RANGE + 3);

    /// Argument key carrying the affected entity
    pub const ARG_ENTITY: &str = "entity";
    /// Argument key carrying a world position
    pub const ARG_POSITION: &str = "position";
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Entity reference
    Entity(EntityId),
    /// World position
    Position(Vec3),
    /// Scalar value
    Float(f32),
    /// Integer value
    Int(i64),
    /// Flag
    Bool(bool),
    /// Free text
    Text(String),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Engine time when the event was created (seconds)
    pub timestamp: f32,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create an event with no arguments
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            timestamp: 0.0,
            args: HashMap::new(),
        }
    }

    /// Set the timestamp (builder pattern)
    #[must_use]
    pub fn at(mut self, timestamp: f32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add an argument to the event (builder pattern)
    #[must_use]
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Entity argument
    pub fn entity(&self, key: &str) -> Option<EntityId> {
        match self.arg(key) {
            Some(EventArg::Entity(id)) => Some(*id),
            _ => None,
        }
    }

    /// Position argument
    pub fn position(&self, key: &str) -> Option<Vec3> {
        match self.arg(key) {
            Some(EventArg::Position(p)) => Some(*p),
            _ => None,
        }
    }

    /// Float argument
    pub fn float(&self, key: &str) -> Option<f32> {
        match self.arg(key) {
            Some(EventArg::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Integer argument
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.arg(key) {
            Some(EventArg::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Boolean argument
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.arg(key) {
            Some(EventArg::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Text argument
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.arg(key) {
            Some(EventArg::Text(v)) => Some(v),
            _ => None,
        }
    }
}

type Handler = Rc<dyn Fn(&Event, &EventBus)>;

/// Publish/subscribe dispatcher
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<EventType, Vec<Handler>>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of exactly `event_type`.
    ///
    /// There is no unsubscribe; subscriptions live until [`EventBus::clear`].
    pub fn subscribe(&self, event_type: EventType, handler: impl Fn(&Event, &Self) + 'static) {
        self.handlers
            .borrow_mut()
            .entry(event_type)
            .or_default()
            .push(Rc::new(handler));
    }

    /// Deliver `event` to its subscribers.
    ///
    /// The subscriber list is resolved once on entry, so handlers added
    /// during this dispatch only see later publishes.
    pub fn publish(&self, event: &Event) {
        let handlers = match self.handlers.borrow().get(&event.event_type) {
            Some(list) => list.clone(),
            None => return,
        };
        for handler in &handlers {
            handler(event, self);
        }
    }

    /// Number of handlers subscribed to `event_type`
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.handlers
            .borrow()
            .get(&event_type)
            .map_or(0, Vec::len)
    }

    /// Drop every subscription
    pub fn clear(&self) {
        self.handlers.borrow_mut().clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        f.debug_struct("EventBus")
            .field("event_types", &handlers.len())
            .field("handlers", &handlers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
