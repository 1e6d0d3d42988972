//! One-shot timers backed by `window.setTimeout`.

use notify_host::{TimerCallback, TimerHandle, TimerService};

#[derive(Debug, Clone, Copy, Default)]
/// Browser timer service. Native builds never fire callbacks.
pub struct WebTimerService;

impl TimerService for WebTimerService {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerHandle {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast};

            let Some(window) = web_sys::window() else {
                return TimerHandle(-1);
            };
            let callback = Closure::once_into_js(callback);
            let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.unchecked_ref(),
                    delay,
                )
                .map(TimerHandle)
                .unwrap_or(TimerHandle(-1))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (delay_ms, callback);
            TimerHandle(-1)
        }
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle.0);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = handle;
    }
}
