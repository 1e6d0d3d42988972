//! Page location and navigation contracts.

use std::{cell::RefCell, rc::Rc};

/// Host service for the embedding page's location.
pub trait PageService {
    /// Returns the absolute URL of the current page.
    fn current_url(&self) -> String;

    /// Replaces the current URL in history without navigating.
    fn replace_url(&self, url: &str);

    /// Navigates to `url`, replacing the current history entry.
    fn redirect(&self, url: &str);
}

#[derive(Debug, Default)]
struct MemoryPageInner {
    url: String,
    redirects: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory page location for tests. Clones share state.
pub struct MemoryPageService {
    inner: Rc<RefCell<MemoryPageInner>>,
}

impl MemoryPageService {
    /// Creates a page at `url`.
    pub fn at(url: impl Into<String>) -> Self {
        let page = Self::default();
        page.inner.borrow_mut().url = url.into();
        page
    }

    /// Returns every redirect target in order.
    pub fn redirects(&self) -> Vec<String> {
        self.inner.borrow().redirects.clone()
    }
}

impl PageService for MemoryPageService {
    fn current_url(&self) -> String {
        self.inner.borrow().url.clone()
    }

    fn replace_url(&self, url: &str) {
        self.inner.borrow_mut().url = url.to_string();
    }

    fn redirect(&self, url: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.redirects.push(url.to_string());
        inner.url = url.to_string();
    }
}
