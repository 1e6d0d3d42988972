//! URL helpers for same-page checks and query parameter consumption.

use url::Url;

/// Returns whether `target` (absolute, or relative to `current`) points at the same host and path
/// as `current`. Query strings and fragments are ignored.
pub fn targets_page(current: &str, target: &str) -> bool {
    let Ok(current) = Url::parse(current) else {
        return false;
    };
    let Ok(target) = current.join(target) else {
        return false;
    };
    current.host_str() == target.host_str()
        && current.port_or_known_default() == target.port_or_known_default()
        && current.path() == target.path()
}

/// Removes query parameter `name` from `current`.
///
/// Returns the parameter's first value and the URL without it, or `None` when the parameter is
/// absent or the URL does not parse.
pub fn strip_query_param(current: &str, name: &str) -> Option<(String, String)> {
    let mut url = Url::parse(current).ok()?;
    let mut value = None;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(key, val)| {
            if key == name {
                value.get_or_insert_with(|| val.to_string());
                None
            } else {
                Some((key.into_owned(), val.into_owned()))
            }
        })
        .collect();
    let value = value?;
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Some((value, url.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn same_page_ignores_query_and_fragment() {
        assert!(targets_page(
            "https://shop.test/orders?x=1#top",
            "https://shop.test/orders?id=9"
        ));
        assert!(targets_page("https://shop.test/orders", "/orders?id=9"));
        assert!(!targets_page("https://shop.test/orders", "https://shop.test/cart"));
        assert!(!targets_page("https://shop.test/orders", "https://other.test/orders"));
        assert!(!targets_page("not a url", "/orders"));
    }

    #[test]
    fn strips_only_the_named_parameter() {
        assert_eq!(
            strip_query_param("https://a.test/p?nid=m-1&tab=2", "nid"),
            Some(("m-1".to_string(), "https://a.test/p?tab=2".to_string()))
        );
        assert_eq!(
            strip_query_param("https://a.test/p?nid=m-1", "nid"),
            Some(("m-1".to_string(), "https://a.test/p".to_string()))
        );
        assert_eq!(strip_query_param("https://a.test/p?tab=2", "nid"), None);
    }
}
