//! Page injection target backed by attribute selectors on `document`.

use notify_host::{ElementKind, InjectionTarget, MarkedElement, RenderedValue};

#[derive(Debug, Clone, Copy, Default)]
/// Browser injection target. Elements are located with `[marker]` attribute selectors.
pub struct WebInjectionTarget;

/// Maps an upper-case tag name to the way the element displays values.
pub fn element_kind(tag_name: &str) -> ElementKind {
    match tag_name.to_ascii_uppercase().as_str() {
        "INPUT" | "TEXTAREA" => ElementKind::Input,
        "SELECT" => ElementKind::Select,
        _ => ElementKind::Text,
    }
}

#[cfg(target_arch = "wasm32")]
fn marked_elements(marker: &str) -> Vec<web_sys::Element> {
    use wasm_bindgen::JsCast;

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return Vec::new();
    };
    let Ok(nodes) = document.query_selector_all(&format!("[{marker}]")) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn write_element(element: &web_sys::Element, value: &RenderedValue) {
    use wasm_bindgen::JsCast;

    match value {
        RenderedValue::Text(text) => element.set_text_content(Some(text)),
        RenderedValue::Value(text) => {
            if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
                input.set_value(text);
            } else if let Some(area) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
                area.set_value(text);
            }
        }
        RenderedValue::Options(options) => {
            let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() else {
                return;
            };
            select.set_length(0);
            for option in options {
                if let Ok(entry) = web_sys::HtmlOptionElement::new_with_text_and_value(option, option)
                {
                    let _ = select.add_with_html_option_element(&entry);
                }
            }
        }
    }
}

impl InjectionTarget for WebInjectionTarget {
    fn find_marked(&self, marker: &str) -> Vec<MarkedElement> {
        #[cfg(target_arch = "wasm32")]
        {
            marked_elements(marker)
                .iter()
                .enumerate()
                .map(|(index, element)| MarkedElement {
                    marker: marker.to_string(),
                    index,
                    kind: element_kind(&element.tag_name()),
                })
                .collect()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = marker;
            Vec::new()
        }
    }

    fn write(&self, element: &MarkedElement, value: &RenderedValue) {
        #[cfg(target_arch = "wasm32")]
        if let Some(target) = marked_elements(&element.marker).get(element.index) {
            write_element(target, value);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = (element, value);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tag_names_map_to_element_kinds() {
        assert_eq!(element_kind("INPUT"), ElementKind::Input);
        assert_eq!(element_kind("textarea"), ElementKind::Input);
        assert_eq!(element_kind("SELECT"), ElementKind::Select);
        assert_eq!(element_kind("SPAN"), ElementKind::Text);
    }
}
