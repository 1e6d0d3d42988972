//! DOM toast surface.
//!
//! Toasts are fixed-position panels inside a single container appended to `document.body`. Each
//! one starts off-screen ([`TOAST_START_OFFSET`] pixels past its anchored edge) and is moved with a
//! CSS `translateY` transition.

use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, collections::HashMap};

use notify_host::{SurfaceError, ToastCallbacks, ToastId, ToastPosition, ToastSurface, ToastView};

/// DOM id of the toast container element.
pub const TOAST_CONTAINER_ID: &str = "notify_toast_container";

/// Distance in pixels a toast starts from its anchored edge before sliding in.
pub const TOAST_START_OFFSET: i32 = 100;

const TOAST_STYLE: &str = "position:fixed;background-color:#323232;color:#f1f1f1;\
min-height:45px;min-width:288px;max-width:350px;padding:15px;box-sizing:border-box;\
box-shadow:0 2px 5px 0 rgba(0, 0, 0, 0.26);border-radius:2px;margin:12px;font-size:14px;\
overflow:hidden;opacity:0;transition:transform 0.3s, opacity 0.3s;\
-webkit-transition:-webkit-transform 0.3s, opacity 0.3s;";

const CLOSE_STYLE: &str =
    "float:right;font-size:15px;color:#888888;cursor:pointer;margin-top:-10px;margin-bottom:-10px;";
const ICON_STYLE: &str = "max-width:40px;margin-right:10px;float:left;";
const ICON_IMAGE_STYLE: &str = "display:block;height:100%;width:100%;";
const TITLE_STYLE: &str = "font-size:16px;font-weight:bold;margin-bottom:5px;";
const MESSAGE_STYLE: &str = "overflow:hidden;cursor:pointer;";

/// Returns the inline style anchoring a toast to `position`, including its off-screen start.
pub fn anchor_style(position: ToastPosition) -> String {
    let horizontal = if position.is_left() { "left:0;" } else { "right:0;" };
    let (vertical, start) = if position.is_bottom() {
        ("bottom:0;", TOAST_START_OFFSET)
    } else {
        ("top:0;", -TOAST_START_OFFSET)
    };
    format!("{horizontal}{vertical}{}", translate_style(start))
}

/// Returns the `transform` declarations for a vertical offset.
pub fn translate_style(translate_y: i32) -> String {
    format!("transform:translateY({translate_y}px);-webkit-transform:translateY({translate_y}px);")
}

/// Returns the full inline style of a freshly mounted toast. Caller styles come last so they win.
pub fn toast_style(view: &ToastView) -> String {
    format!("{TOAST_STYLE}{}{}", anchor_style(view.position), view.style)
}

#[cfg(target_arch = "wasm32")]
type Handler = wasm_bindgen::closure::Closure<dyn FnMut()>;

#[cfg(target_arch = "wasm32")]
struct MountedToast {
    element: web_sys::HtmlElement,
    handlers: Vec<Handler>,
}

#[derive(Default)]
struct WebToastInner {
    #[cfg(target_arch = "wasm32")]
    mounted: RefCell<HashMap<ToastId, MountedToast>>,
}

#[derive(Clone, Default)]
/// Browser toast surface. Native builds report [`SurfaceError::NotReady`] forever.
pub struct WebToastSurface {
    inner: Rc<WebToastInner>,
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use wasm_bindgen::{closure::Closure, JsCast};

    use super::*;

    pub fn document() -> Result<web_sys::Document, SurfaceError> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or(SurfaceError::NotReady)
    }

    pub fn container(document: &web_sys::Document) -> Result<web_sys::Element, SurfaceError> {
        if let Some(existing) = document.get_element_by_id(TOAST_CONTAINER_ID) {
            return Ok(existing);
        }
        let body = document.body().ok_or(SurfaceError::NotReady)?;
        let container = document
            .create_element("div")
            .map_err(|err| SurfaceError::Failed(format!("{err:?}")))?;
        container.set_id(TOAST_CONTAINER_ID);
        body.append_child(&container)
            .map_err(|err| SurfaceError::Failed(format!("{err:?}")))?;
        Ok(container)
    }

    pub fn div(
        document: &web_sys::Document,
        class: &str,
        style: &str,
    ) -> Result<web_sys::HtmlElement, SurfaceError> {
        let element = document
            .create_element("div")
            .map_err(|err| SurfaceError::Failed(format!("{err:?}")))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| SurfaceError::Failed("failed to cast toast element".to_string()))?;
        element.set_class_name(class);
        let _ = element.set_attribute("style", style);
        Ok(element)
    }

    pub fn on_click(element: &web_sys::HtmlElement, callback: Rc<dyn Fn()>) -> Handler {
        let handler = Closure::<dyn FnMut()>::wrap(Box::new(move || callback()));
        element.set_onclick(Some(handler.as_ref().unchecked_ref()));
        handler
    }

    pub fn build(
        document: &web_sys::Document,
        view: &ToastView,
        callbacks: &ToastCallbacks,
    ) -> Result<(web_sys::HtmlElement, Vec<Handler>), SurfaceError> {
        let toast = div(document, "toast", &toast_style(view))?;
        let mut handlers = Vec::new();
        let append = |parent: &web_sys::HtmlElement, child: &web_sys::HtmlElement| {
            parent
                .append_child(child)
                .map(|_| ())
                .map_err(|err| SurfaceError::Failed(format!("{err:?}")))
        };

        if let Some(close_style) = &view.close_style {
            let close = div(document, "close", &format!("{CLOSE_STYLE}{close_style}"))?;
            close.set_text_content(Some("\u{2716}"));
            handlers.push(on_click(&close, callbacks.on_close.clone()));
            append(&toast, &close)?;
            append(&toast, &div(document, "", "clear:both;")?)?;
        }

        if let Some(icon) = &view.icon {
            let holder = div(document, "icon", ICON_STYLE)?;
            let image = document
                .create_element("img")
                .map_err(|err| SurfaceError::Failed(format!("{err:?}")))?;
            let _ = image.set_attribute("src", icon);
            let _ = image.set_attribute("style", ICON_IMAGE_STYLE);
            holder
                .append_child(&image)
                .map_err(|err| SurfaceError::Failed(format!("{err:?}")))?;
            append(&toast, &holder)?;
        }

        if let Some(title) = &view.title {
            let heading = div(document, "title", TITLE_STYLE)?;
            heading.set_text_content(Some(title));
            append(&toast, &heading)?;
        }

        let message = div(document, "message", MESSAGE_STYLE)?;
        message.set_text_content(Some(&view.message));
        handlers.push(on_click(&message, callbacks.on_click.clone()));
        append(&toast, &message)?;
        append(&toast, &div(document, "", "clear:left;")?)?;

        Ok((toast, handlers))
    }

    pub fn set_translate(element: &web_sys::HtmlElement, opacity: &str, translate_y: i32) {
        let style = element.style();
        let _ = style.set_property("opacity", opacity);
        let value = format!("translateY({translate_y}px)");
        let _ = style.set_property("transform", &value);
        let _ = style.set_property("-webkit-transform", &value);
    }

    pub fn release_later(handlers: Vec<Handler>) {
        // A handler may be the one running right now, so drop them on a later tick.
        let Some(window) = web_sys::window() else {
            handlers.into_iter().for_each(Handler::forget);
            return;
        };
        let release = Closure::once_into_js(move || drop(handlers));
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            release.unchecked_ref(),
            0,
        );
    }
}

impl ToastSurface for WebToastSurface {
    fn ensure_container(&self) -> Result<(), SurfaceError> {
        #[cfg(target_arch = "wasm32")]
        {
            let document = dom::document()?;
            dom::container(&document).map(|_| ())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Err(SurfaceError::NotReady)
        }
    }

    fn mount_toast(
        &self,
        id: ToastId,
        view: &ToastView,
        callbacks: ToastCallbacks,
    ) -> Result<i32, SurfaceError> {
        #[cfg(target_arch = "wasm32")]
        {
            let document = dom::document()?;
            let container = dom::container(&document)?;
            let (element, handlers) = dom::build(&document, view, &callbacks)?;
            container
                .append_child(&element)
                .map_err(|err| SurfaceError::Failed(format!("{err:?}")))?;
            let height = element.offset_height();
            self.inner
                .mounted
                .borrow_mut()
                .insert(id, MountedToast { element, handlers });
            Ok(height)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (id, view, callbacks);
            Err(SurfaceError::NotReady)
        }
    }

    fn place_toast(&self, id: ToastId, translate_y: i32) {
        #[cfg(target_arch = "wasm32")]
        if let Some(toast) = self.inner.mounted.borrow().get(&id) {
            dom::set_translate(&toast.element, "1", translate_y);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = (id, translate_y);
    }

    fn fade_out_toast(&self, id: ToastId, translate_y: i32) {
        #[cfg(target_arch = "wasm32")]
        if let Some(toast) = self.inner.mounted.borrow().get(&id) {
            dom::set_translate(&toast.element, "0", translate_y);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = (id, translate_y);
    }

    fn detach_toast(&self, id: ToastId) {
        #[cfg(target_arch = "wasm32")]
        {
            let removed = self.inner.mounted.borrow_mut().remove(&id);
            if let Some(toast) = removed {
                toast.element.remove();
                dom::release_later(toast.handlers);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = id;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn view(position: ToastPosition, style: &str) -> ToastView {
        ToastView {
            title: None,
            message: "hello".to_string(),
            icon: None,
            position,
            style: style.to_string(),
            close_style: None,
        }
    }

    #[test]
    fn anchors_start_off_screen_past_their_edge() {
        assert_eq!(
            anchor_style(ToastPosition::TopLeft),
            "left:0;top:0;transform:translateY(-100px);-webkit-transform:translateY(-100px);"
        );
        assert_eq!(
            anchor_style(ToastPosition::BottomRight),
            "right:0;bottom:0;transform:translateY(100px);-webkit-transform:translateY(100px);"
        );
    }

    #[test]
    fn caller_style_is_appended_last() {
        let style = toast_style(&view(ToastPosition::TopRight, "background-color:red;"));
        assert!(style.starts_with("position:fixed;"));
        assert!(style.ends_with("background-color:red;"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_build_is_never_ready() {
        let surface = WebToastSurface::default();
        assert_eq!(surface.ensure_container(), Err(SurfaceError::NotReady));
    }
}
