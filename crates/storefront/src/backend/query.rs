//! Query-string translation for forwarded requests.
//!
//! Browser code uses snake_case query keys; the backend expects camelCase.

/// Convert a snake_case key to camelCase.
///
/// Leading underscores are kept (`_id` stays `_id`), keys without
/// underscores pass through unchanged.
#[must_use]
pub fn to_camel_case(key: &str) -> String {
    let body = key.trim_start_matches('_');
    let leading = key.len() - body.len();

    let mut out = String::with_capacity(key.len());
    out.extend(std::iter::repeat_n('_', leading));

    let mut upper_next = false;
    for c in body.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    if upper_next {
        out.push('_');
    }

    out
}

/// Decode a raw query string and translate its keys.
#[must_use]
pub fn translate_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|raw| {
        url::form_urlencoded::parse(raw.as_bytes())
            .map(|(key, value)| (to_camel_case(&key), value.into_owned()))
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("page_size"), "pageSize");
        assert_eq!(to_camel_case("sort_by_field"), "sortByField");
        assert_eq!(to_camel_case("page"), "page");
        assert_eq!(to_camel_case("pageSize"), "pageSize");
    }

    #[test]
    fn test_to_camel_case_edge_underscores() {
        assert_eq!(to_camel_case("_id"), "_id");
        assert_eq!(to_camel_case("min__price"), "minPrice");
        assert_eq!(to_camel_case("trailing_"), "trailing_");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_translate_query() {
        let pairs = translate_query(Some("page_size=20&category_id=abc&q=red%20shoes"));
        assert_eq!(
            pairs,
            vec![
                ("pageSize".to_string(), "20".to_string()),
                ("categoryId".to_string(), "abc".to_string()),
                ("q".to_string(), "red shoes".to_string()),
            ]
        );
    }

    #[test]
    fn test_translate_query_empty() {
        assert!(translate_query(None).is_empty());
        assert!(translate_query(Some("")).is_empty());
    }
}
