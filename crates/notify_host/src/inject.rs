//! Page data-injection target contracts.
//!
//! Elements opt in by carrying a marker attribute such as `data-selected-subject`. The runtime
//! decides what to write; the target only locates elements and applies rendered values.

use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How an element displays an injected value.
pub enum ElementKind {
    /// Any element whose text content is replaced.
    Text,
    /// Form controls with a `value` (inputs, textareas).
    Input,
    /// Option lists (`<select>`).
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One element carrying a marker attribute.
pub struct MarkedElement {
    /// Marker attribute the element was found by.
    pub marker: String,
    /// Document-order position among elements with the same marker.
    pub index: usize,
    /// Element kind.
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Value written into one element.
pub enum RenderedValue {
    /// Text content.
    Text(String),
    /// Form control value.
    Value(String),
    /// Replacement option list.
    Options(Vec<String>),
}

impl RenderedValue {
    /// Returns the blank value of the same shape.
    pub fn blank(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Text => Self::Text(String::new()),
            ElementKind::Input => Self::Value(String::new()),
            ElementKind::Select => Self::Options(Vec::new()),
        }
    }

    /// Returns the displayed text (options joined with `, `).
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) | Self::Value(text) => text.clone(),
            Self::Options(options) => options.join(", "),
        }
    }
}

/// Host service that locates and updates marked page elements.
pub trait InjectionTarget {
    /// Returns every element carrying `marker`, in document order.
    fn find_marked(&self, marker: &str) -> Vec<MarkedElement>;

    /// Writes a rendered value into one element.
    fn write(&self, element: &MarkedElement, value: &RenderedValue);
}

#[derive(Debug, Clone)]
struct MemoryElement {
    marker: String,
    kind: ElementKind,
    content: RenderedValue,
}

#[derive(Debug, Clone, Default)]
/// In-memory page for tests. Clones share elements.
pub struct MemoryInjectionTarget {
    elements: Rc<RefCell<Vec<MemoryElement>>>,
}

impl MemoryInjectionTarget {
    /// Adds an empty element carrying `marker`.
    pub fn add_element(&self, marker: impl Into<String>, kind: ElementKind) {
        self.elements.borrow_mut().push(MemoryElement {
            marker: marker.into(),
            kind,
            content: RenderedValue::blank(kind),
        });
    }

    /// Returns the contents of every element carrying `marker`.
    pub fn contents(&self, marker: &str) -> Vec<RenderedValue> {
        self.elements
            .borrow()
            .iter()
            .filter(|element| element.marker == marker)
            .map(|element| element.content.clone())
            .collect()
    }

    /// Returns the displayed text of the first element carrying `marker`.
    pub fn displayed(&self, marker: &str) -> Option<String> {
        self.contents(marker).first().map(RenderedValue::display)
    }
}

impl InjectionTarget for MemoryInjectionTarget {
    fn find_marked(&self, marker: &str) -> Vec<MarkedElement> {
        self.elements
            .borrow()
            .iter()
            .filter(|element| element.marker == marker)
            .enumerate()
            .map(|(index, element)| MarkedElement {
                marker: marker.to_string(),
                index,
                kind: element.kind,
            })
            .collect()
    }

    fn write(&self, element: &MarkedElement, value: &RenderedValue) {
        if let Some(target) = self
            .elements
            .borrow_mut()
            .iter_mut()
            .filter(|candidate| candidate.marker == element.marker)
            .nth(element.index)
        {
            target.content = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_target_writes_by_marker_and_index() {
        let page = MemoryInjectionTarget::default();
        page.add_element("data-selected-subject", ElementKind::Text);
        page.add_element("data-selected-subject", ElementKind::Input);
        page.add_element("data-selected-detail", ElementKind::Text);

        let marked = page.find_marked("data-selected-subject");
        assert_eq!(marked.len(), 2);
        page.write(&marked[1], &RenderedValue::Value("Hello".to_string()));

        assert_eq!(
            page.contents("data-selected-subject"),
            vec![
                RenderedValue::Text(String::new()),
                RenderedValue::Value("Hello".to_string())
            ]
        );
        assert_eq!(page.displayed("data-selected-detail"), Some(String::new()));
    }

    #[test]
    fn option_lists_display_joined() {
        let value = RenderedValue::Options(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(value.display(), "a, b");
        assert_eq!(
            RenderedValue::blank(ElementKind::Select),
            RenderedValue::Options(Vec::new())
        );
    }
}
