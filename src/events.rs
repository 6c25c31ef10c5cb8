//! Lifecycle events and the per-context subscriber registry
//!
//! Dispatch is synchronous and in order: every subscriber registered for an
//! event kind is called directly, in registration order, before the emitting
//! call returns. A bus belongs to exactly one context and drops events that
//! name a different originating context.

use crate::node::TreeNode;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an interpretation context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl ContextId {
    pub fn next() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// The four lifecycle boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BlockEnter,
    BlockLeave,
    InterpretEnter,
    InterpretLeave,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::BlockEnter,
        EventKind::BlockLeave,
        EventKind::InterpretEnter,
        EventKind::InterpretLeave,
    ];

    pub fn is_enter(self) -> bool {
        matches!(self, EventKind::BlockEnter | EventKind::InterpretEnter)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::BlockEnter => "block-enter",
            EventKind::BlockLeave => "block-leave",
            EventKind::InterpretEnter => "interpret-enter",
            EventKind::InterpretLeave => "interpret-leave",
        };
        f.write_str(name)
    }
}

/// Payload delivered to observers
#[derive(Debug)]
pub struct LifecycleEvent<'a, N> {
    pub kind: EventKind,
    pub node: &'a N,
    /// Context that emitted the event
    pub context: ContextId,
    /// Frame stack depth at notification time
    pub depth: usize,
}

/// Read-only lifecycle subscriber
pub trait Observer<N> {
    fn notify(&mut self, event: &LifecycleEvent<'_, N>);
}

/// Adapter turning a closure into an [`Observer`]
pub struct FnObserver<F>(F);

/// Wrap a closure as an observer
pub fn observer_fn<N, F>(f: F) -> FnObserver<F>
where
    F: FnMut(&LifecycleEvent<'_, N>),
{
    FnObserver(f)
}

impl<N, F> Observer<N> for FnObserver<F>
where
    F: FnMut(&LifecycleEvent<'_, N>),
{
    fn notify(&mut self, event: &LifecycleEvent<'_, N>) {
        (self.0)(event)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription<N> {
    id: SubscriptionId,
    kind: EventKind,
    observer: Box<dyn Observer<N>>,
}

/// Subscriber registry owned by a single context
pub struct EventBus<N> {
    owner: ContextId,
    next_id: u64,
    subscriptions: Vec<Subscription<N>>,
}

impl<N: TreeNode> EventBus<N> {
    pub fn new(owner: ContextId) -> Self {
        Self {
            owner,
            next_id: 0,
            subscriptions: Vec::new(),
        }
    }

    pub fn owner(&self) -> ContextId {
        self.owner
    }

    /// Register `observer` for one event kind
    pub fn subscribe<O>(&mut self, kind: EventKind, observer: O) -> SubscriptionId
    where
        O: Observer<N> + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            kind,
            observer: Box::new(observer),
        });
        id
    }

    /// Remove a subscription; false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver `event` to its subscribers, returning how many were notified
    pub fn publish(&mut self, event: &LifecycleEvent<'_, N>) -> usize {
        if event.context != self.owner {
            return 0;
        }

        let mut delivered = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| s.kind == event.kind) {
            sub.observer.notify(event);
            delivered += 1;
        }
        delivered
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> impl Observer<Node> {
        let log = Rc::clone(log);
        observer_fn(move |event: &LifecycleEvent<'_, Node>| {
            log.borrow_mut().push(format!("{}:{}", tag, event.kind));
        })
    }

    fn event(kind: EventKind, node: &Node, context: ContextId) -> LifecycleEvent<'_, Node> {
        LifecycleEvent {
            kind,
            node,
            context,
            depth: 0,
        }
    }

    #[test]
    fn test_publish_in_registration_order() {
        let owner = ContextId::next();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new(owner);
        bus.subscribe(EventKind::InterpretEnter, recorder(&log, "first"));
        bus.subscribe(EventKind::InterpretEnter, recorder(&log, "second"));
        bus.subscribe(EventKind::InterpretLeave, recorder(&log, "leave"));

        let node = Node::statement("s");
        assert_eq!(bus.publish(&event(EventKind::InterpretEnter, &node, owner)), 2);

        assert_eq!(
            *log.borrow(),
            vec!["first:interpret-enter", "second:interpret-enter"]
        );
    }

    #[test]
    fn test_foreign_context_events_dropped() {
        let owner = ContextId::next();
        let other = ContextId::next();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new(owner);
        bus.subscribe(EventKind::BlockEnter, recorder(&log, "mine"));

        let node = Node::block(vec![]);
        assert_eq!(bus.publish(&event(EventKind::BlockEnter, &node, other)), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let owner = ContextId::next();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new(owner);
        let id = bus.subscribe(EventKind::BlockLeave, recorder(&log, "x"));
        assert_eq!(bus.subscriber_count(EventKind::BlockLeave), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(EventKind::BlockLeave), 0);

        let node = Node::block(vec![]);
        assert_eq!(bus.publish(&event(EventKind::BlockLeave, &node, owner)), 0);
    }

    #[test]
    fn test_event_kind_names() {
        assert!(EventKind::BlockEnter.is_enter());
        assert!(!EventKind::InterpretLeave.is_enter());
        assert_eq!(EventKind::ALL.len(), 4);
        assert_eq!(ContextId(4).to_string(), "ctx-4");
    }
}
