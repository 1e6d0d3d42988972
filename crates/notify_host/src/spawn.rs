//! Local task spawning contracts.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    future::Future,
    pin::Pin,
    rc::Rc,
};

/// Boxed `'static` local future accepted by [`TaskSpawner`].
pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Host service that drives fire-and-forget async work on the UI thread.
pub trait TaskSpawner {
    /// Schedules `task` to run to completion.
    fn spawn_local(&self, task: LocalTask);
}

#[derive(Default)]
struct SpawnerInner {
    running: Cell<bool>,
    backlog: RefCell<VecDeque<LocalTask>>,
}

#[derive(Clone, Default)]
/// Spawner that runs each task to completion before returning.
///
/// Tasks spawned from inside a running task are queued and run right after it, so nested spawns
/// never re-enter the executor. Suitable for tests and in-memory services whose futures resolve
/// without real I/O.
pub struct ImmediateSpawner {
    inner: Rc<SpawnerInner>,
}

impl TaskSpawner for ImmediateSpawner {
    fn spawn_local(&self, task: LocalTask) {
        self.inner.backlog.borrow_mut().push_back(task);
        if self.inner.running.replace(true) {
            return;
        }
        loop {
            let next = self.inner.backlog.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            futures::executor::block_on(task);
        }
        self.inner.running.set(false);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn nested_spawns_run_after_the_outer_task() {
        let spawner = ImmediateSpawner::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_log = log.clone();
        let inner_spawner = spawner.clone();
        spawner.spawn_local(Box::pin(async move {
            inner_log.borrow_mut().push("outer start");
            let nested_log = inner_log.clone();
            inner_spawner.spawn_local(Box::pin(async move {
                nested_log.borrow_mut().push("nested");
            }));
            inner_log.borrow_mut().push("outer end");
        }));

        assert_eq!(*log.borrow(), vec!["outer start", "outer end", "nested"]);
    }
}
