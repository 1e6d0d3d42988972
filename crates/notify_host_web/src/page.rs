//! Page location adapter backed by `window.location` and `window.history`.

use notify_host::PageService;

#[derive(Debug, Clone, Copy, Default)]
/// Browser page service.
pub struct WebPageService;

impl PageService for WebPageService {
    fn current_url(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()
                .and_then(|window| window.location().href().ok())
                .unwrap_or_default()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            String::new()
        }
    }

    fn replace_url(&self, url: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(history) = web_sys::window().and_then(|window| window.history().ok()) else {
                return;
            };
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = url;
    }

    fn redirect(&self, url: &str) {
        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window() {
            let _ = window.location().replace(url);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = url;
    }
}
