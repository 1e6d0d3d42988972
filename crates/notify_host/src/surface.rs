//! Toast presentation surface contracts.
//!
//! The surface owns the real elements. The runtime only tracks ids, measured heights and offsets,
//! and tells the surface where each toast belongs.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Runtime-assigned toast identifier.
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Screen corner a toast stacks from.
pub enum ToastPosition {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    #[default]
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl ToastPosition {
    /// Every corner, in lane order.
    pub const ALL: [ToastPosition; 4] = [
        ToastPosition::TopLeft,
        ToastPosition::TopRight,
        ToastPosition::BottomLeft,
        ToastPosition::BottomRight,
    ];

    /// Returns whether toasts in this corner are anchored to the bottom edge and grow upward.
    pub const fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    /// Returns whether toasts in this corner are anchored to the left edge.
    pub const fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Returns the stable kebab-case token (`top-right`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Parses a kebab-case token.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|position| position.as_str() == token.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything a surface needs to build one toast element.
pub struct ToastView {
    /// Bold title line, omitted when `None`.
    pub title: Option<String>,
    /// Message body.
    pub message: String,
    /// Icon URL, omitted when `None`.
    pub icon: Option<String>,
    /// Corner the toast is anchored to.
    pub position: ToastPosition,
    /// Extra inline style appended after the defaults.
    pub style: String,
    /// Close button style; `None` disables the close button.
    pub close_style: Option<String>,
}

#[derive(Clone)]
/// Interaction callbacks wired into a mounted toast.
pub struct ToastCallbacks {
    /// Invoked when the message area is clicked.
    pub on_click: Rc<dyn Fn()>,
    /// Invoked when the close button is clicked.
    pub on_close: Rc<dyn Fn()>,
}

impl fmt::Debug for ToastCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastCallbacks").finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Presentation surface failures.
pub enum SurfaceError {
    /// The page body is not available yet; retry shortly.
    #[error("toast surface not ready")]
    NotReady,
    /// The surface could not build or attach the element.
    #[error("toast surface failure: {0}")]
    Failed(String),
}

/// Host service that renders toast panels.
pub trait ToastSurface {
    /// Creates the toast container if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NotReady`] while the page body is unavailable.
    fn ensure_container(&self) -> Result<(), SurfaceError>;

    /// Builds and attaches a hidden toast element and returns its measured slot height in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NotReady`] while the page body is unavailable.
    fn mount_toast(
        &self,
        id: ToastId,
        view: &ToastView,
        callbacks: ToastCallbacks,
    ) -> Result<i32, SurfaceError>;

    /// Makes a toast visible at vertical offset `translate_y`.
    fn place_toast(&self, id: ToastId, translate_y: i32);

    /// Starts the fade/slide-out transition towards `translate_y`.
    fn fade_out_toast(&self, id: ToastId, translate_y: i32);

    /// Removes the toast element.
    fn detach_toast(&self, id: ToastId);
}

/// Default slot height reported by [`MemoryToastSurface`] when no height is queued.
pub const MEMORY_TOAST_HEIGHT: i32 = 48;

#[derive(Debug, Clone)]
struct MemoryToast {
    id: ToastId,
    view: ToastView,
    callbacks: ToastCallbacks,
    height: i32,
    translate_y: Option<i32>,
    faded: bool,
    attached: bool,
}

#[derive(Debug)]
struct MemorySurfaceInner {
    ready: Cell<bool>,
    container: Cell<bool>,
    heights: RefCell<VecDeque<i32>>,
    toasts: RefCell<Vec<MemoryToast>>,
}

#[derive(Debug, Clone)]
/// Recording toast surface for tests. Clones share state.
pub struct MemoryToastSurface {
    inner: Rc<MemorySurfaceInner>,
}

impl Default for MemoryToastSurface {
    fn default() -> Self {
        Self {
            inner: Rc::new(MemorySurfaceInner {
                ready: Cell::new(true),
                container: Cell::new(false),
                heights: RefCell::new(VecDeque::new()),
                toasts: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl MemoryToastSurface {
    /// Sets whether the surface reports a usable page body.
    pub fn set_ready(&self, ready: bool) {
        self.inner.ready.set(ready);
    }

    /// Queues measured heights for the next mounts (first in, first used).
    pub fn queue_heights(&self, heights: impl IntoIterator<Item = i32>) {
        self.inner.heights.borrow_mut().extend(heights);
    }

    /// Returns whether the container was created.
    pub fn has_container(&self) -> bool {
        self.inner.container.get()
    }

    /// Returns attached toast ids in mount order.
    pub fn attached(&self) -> Vec<ToastId> {
        self.inner
            .toasts
            .borrow()
            .iter()
            .filter(|toast| toast.attached)
            .map(|toast| toast.id)
            .collect()
    }

    /// Returns the number of toasts ever mounted.
    pub fn mounted_count(&self) -> usize {
        self.inner.toasts.borrow().len()
    }

    /// Returns the last applied visible offset, or `None` if never placed.
    pub fn translate_y(&self, id: ToastId) -> Option<i32> {
        self.find(id, |toast| toast.translate_y).flatten()
    }

    /// Returns the measured height reported at mount.
    pub fn height(&self, id: ToastId) -> Option<i32> {
        self.find(id, |toast| toast.height)
    }

    /// Returns whether the fade-out transition was started.
    pub fn is_faded(&self, id: ToastId) -> bool {
        self.find(id, |toast| toast.faded).unwrap_or(false)
    }

    /// Returns the view a toast was mounted with.
    pub fn view(&self, id: ToastId) -> Option<ToastView> {
        self.find(id, |toast| toast.view.clone())
    }

    /// Simulates a click on the message area.
    pub fn click(&self, id: ToastId) {
        if let Some(callbacks) = self.find(id, |toast| toast.callbacks.clone()) {
            (callbacks.on_click)();
        }
    }

    /// Simulates a click on the close button.
    pub fn click_close(&self, id: ToastId) {
        if let Some(callbacks) = self.find(id, |toast| toast.callbacks.clone()) {
            (callbacks.on_close)();
        }
    }

    fn find<T>(&self, id: ToastId, read: impl FnOnce(&MemoryToast) -> T) -> Option<T> {
        self.inner
            .toasts
            .borrow()
            .iter()
            .find(|toast| toast.id == id)
            .map(read)
    }

    fn update(&self, id: ToastId, write: impl FnOnce(&mut MemoryToast)) {
        if let Some(toast) = self
            .inner
            .toasts
            .borrow_mut()
            .iter_mut()
            .find(|toast| toast.id == id)
        {
            write(toast);
        }
    }
}

impl ToastSurface for MemoryToastSurface {
    fn ensure_container(&self) -> Result<(), SurfaceError> {
        if !self.inner.ready.get() {
            return Err(SurfaceError::NotReady);
        }
        self.inner.container.set(true);
        Ok(())
    }

    fn mount_toast(
        &self,
        id: ToastId,
        view: &ToastView,
        callbacks: ToastCallbacks,
    ) -> Result<i32, SurfaceError> {
        self.ensure_container()?;
        let height = self
            .inner
            .heights
            .borrow_mut()
            .pop_front()
            .unwrap_or(MEMORY_TOAST_HEIGHT);
        self.inner.toasts.borrow_mut().push(MemoryToast {
            id,
            view: view.clone(),
            callbacks,
            height,
            translate_y: None,
            faded: false,
            attached: true,
        });
        Ok(height)
    }

    fn place_toast(&self, id: ToastId, translate_y: i32) {
        self.update(id, |toast| toast.translate_y = Some(translate_y));
    }

    fn fade_out_toast(&self, id: ToastId, _translate_y: i32) {
        self.update(id, |toast| toast.faded = true);
    }

    fn detach_toast(&self, id: ToastId) {
        self.update(id, |toast| toast.attached = false);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn view() -> ToastView {
        ToastView {
            title: None,
            message: "hello".to_string(),
            icon: None,
            position: ToastPosition::TopRight,
            style: String::new(),
            close_style: Some(String::new()),
        }
    }

    fn callbacks() -> ToastCallbacks {
        ToastCallbacks {
            on_click: Rc::new(|| {}),
            on_close: Rc::new(|| {}),
        }
    }

    #[test]
    fn positions_round_trip_through_tokens() {
        for position in ToastPosition::ALL {
            assert_eq!(ToastPosition::parse(position.as_str()), Some(position));
        }
        assert_eq!(ToastPosition::parse("middle"), None);
        assert!(ToastPosition::BottomLeft.is_bottom());
        assert!(!ToastPosition::TopLeft.is_bottom());
    }

    #[test]
    fn memory_surface_uses_queued_heights_then_default() {
        let surface = MemoryToastSurface::default();
        surface.queue_heights([40]);

        let first = surface
            .mount_toast(ToastId(1), &view(), callbacks())
            .expect("mount");
        let second = surface
            .mount_toast(ToastId(2), &view(), callbacks())
            .expect("mount");

        assert_eq!((first, second), (40, MEMORY_TOAST_HEIGHT));
        assert!(surface.has_container());
        assert_eq!(surface.attached(), vec![ToastId(1), ToastId(2)]);
    }

    #[test]
    fn memory_surface_reports_not_ready() {
        let surface = MemoryToastSurface::default();
        surface.set_ready(false);
        assert_eq!(
            surface.mount_toast(ToastId(1), &view(), callbacks()),
            Err(SurfaceError::NotReady)
        );
        assert_eq!(surface.mounted_count(), 0);
    }
}
