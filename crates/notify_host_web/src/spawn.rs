//! Local task spawning on the browser event loop.

use notify_host::{LocalTask, TaskSpawner};

#[derive(Clone, Default)]
/// Spawns tasks with `wasm_bindgen_futures::spawn_local`. Native builds drive them to completion
/// through [`notify_host::ImmediateSpawner`].
pub struct WebTaskSpawner {
    #[cfg(not(target_arch = "wasm32"))]
    fallback: notify_host::ImmediateSpawner,
}

impl TaskSpawner for WebTaskSpawner {
    fn spawn_local(&self, task: LocalTask) {
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.fallback.spawn_local(task);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[test]
    fn native_build_runs_the_task() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        WebTaskSpawner::default().spawn_local(Box::pin(async move { flag.set(true) }));
        assert!(ran.get());
    }
}
