//! Push/broadcast channel contracts.
//!
//! The push channel itself is an external SDK. The runtime only registers listeners that receive
//! raw JSON payloads and asks the channel to join or leave named broadcast groups.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde_json::Value;

/// Object-safe boxed future used by [`PushService`].
pub type PushFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Callback invoked with every raw payload the push channel delivers.
pub type PushListener = Rc<dyn Fn(Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Registration token returned by [`PushService::add_listener`].
pub struct ListenerId(pub u64);

/// Host service wrapping the external push/broadcast subscription channel.
pub trait PushService {
    /// Registers a payload listener.
    fn add_listener(&self, listener: PushListener) -> ListenerId;

    /// Removes a previously registered listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Returns whether the channel has finished connecting and accepts group operations.
    fn is_ready(&self) -> bool;

    /// Joins a broadcast group.
    fn join_group<'a>(&'a self, group: &'a str) -> PushFuture<'a, Result<(), String>>;

    /// Leaves a broadcast group.
    fn leave_group<'a>(&'a self, group: &'a str) -> PushFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Push service that never delivers anything.
pub struct NoopPushService;

impl PushService for NoopPushService {
    fn add_listener(&self, _listener: PushListener) -> ListenerId {
        ListenerId(0)
    }

    fn remove_listener(&self, _id: ListenerId) {}

    fn is_ready(&self) -> bool {
        false
    }

    fn join_group<'a>(&'a self, _group: &'a str) -> PushFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn leave_group<'a>(&'a self, _group: &'a str) -> PushFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Default)]
struct MemoryPushInner {
    next_listener: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, PushListener)>>,
    ready: Cell<bool>,
    joined: RefCell<Vec<String>>,
    fail_groups: Cell<bool>,
}

#[derive(Clone, Default)]
/// In-memory push channel for tests. Clones share listeners and group state.
pub struct MemoryPushService {
    inner: Rc<MemoryPushInner>,
}

impl MemoryPushService {
    /// Creates a channel that reports ready immediately.
    pub fn ready() -> Self {
        let service = Self::default();
        service.set_ready(true);
        service
    }

    /// Sets the ready flag reported by [`PushService::is_ready`].
    pub fn set_ready(&self, ready: bool) {
        self.inner.ready.set(ready);
    }

    /// Makes subsequent group operations fail.
    pub fn fail_group_operations(&self, fail: bool) {
        self.inner.fail_groups.set(fail);
    }

    /// Delivers a raw payload to every registered listener.
    pub fn deliver(&self, payload: Value) {
        // Listeners may register or remove listeners while running.
        let listeners: Vec<PushListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(payload.clone());
        }
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Returns the joined groups in join order.
    pub fn joined_groups(&self) -> Vec<String> {
        self.inner.joined.borrow().clone()
    }
}

impl PushService for MemoryPushService {
    fn add_listener(&self, listener: PushListener) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get().saturating_add(1));
        self.inner.next_listener.set(id.0);
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn is_ready(&self) -> bool {
        self.inner.ready.get()
    }

    fn join_group<'a>(&'a self, group: &'a str) -> PushFuture<'a, Result<(), String>> {
        Box::pin(async move {
            if self.inner.fail_groups.get() {
                return Err(format!("join `{group}` rejected"));
            }
            let mut joined = self.inner.joined.borrow_mut();
            if !joined.iter().any(|g| g == group) {
                joined.push(group.to_string());
            }
            Ok(())
        })
    }

    fn leave_group<'a>(&'a self, group: &'a str) -> PushFuture<'a, Result<(), String>> {
        Box::pin(async move {
            if self.inner.fail_groups.get() {
                return Err(format!("leave `{group}` rejected"));
            }
            self.inner.joined.borrow_mut().retain(|g| g != group);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn memory_push_delivers_to_registered_listeners_until_removed() {
        let push = MemoryPushService::ready();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = push.add_listener(Rc::new(move |payload| sink.borrow_mut().push(payload)));

        push.deliver(json!({ "n": 1 }));
        push.remove_listener(id);
        push.deliver(json!({ "n": 2 }));

        assert_eq!(*seen.borrow(), vec![json!({ "n": 1 })]);
        assert_eq!(push.listener_count(), 0);
    }

    #[test]
    fn memory_push_group_membership_is_idempotent() {
        let push = MemoryPushService::ready();
        block_on(push.join_group("alerts")).expect("join");
        block_on(push.join_group("alerts")).expect("join again");
        block_on(push.join_group("news")).expect("join");
        block_on(push.leave_group("alerts")).expect("leave");

        assert_eq!(push.joined_groups(), vec!["news".to_string()]);
    }

    #[test]
    fn failing_group_operations_report_errors() {
        let push = MemoryPushService::ready();
        push.fail_group_operations(true);
        assert!(block_on(push.join_group("alerts")).is_err());
        assert!(push.joined_groups().is_empty());
    }
}
