use std::collections::HashMap;

/// Parse query parameters from a URI string.
///
/// Handles URL decoding and returns a map of parameter key-value pairs.
/// Multiple values for the same key are not supported (only the last is kept).
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    if let Some(query_start) = uri.find('?') {
        let query = &uri[query_start + 1..];
        for param in query.split('&') {
            if let Some(eq_idx) = param.find('=') {
                let key = &param[..eq_idx];
                let encoded_value = &param[eq_idx + 1..];
                let decoded = urlencoding::decode(encoded_value)
                    .unwrap_or(std::borrow::Cow::Borrowed(encoded_value))
                    .to_string();
                params.insert(key.to_string(), decoded);
            } else {
                // Flag parameter without value
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

/// Get an integer parameter with validation and default; values below 1
/// clamp to 1.
pub fn get_int(params: &HashMap<String, String>, key: &str, default: usize) -> usize {
    params.get(key)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_decodes() {
        let params = parse_query_params("/profile/ann?page=2&q=a%20b");
        assert_eq!(params.get("page"), Some(&"2".to_string()));
        assert_eq!(params.get("q"), Some(&"a b".to_string()));
    }

    #[test]
    fn no_query_is_empty() {
        assert!(parse_query_params("/posts").is_empty());
    }

    #[test]
    fn page_clamps_to_one() {
        let params = parse_query_params("/posts?page=0");
        assert_eq!(get_int(&params, "page", 1), 1);

        let params = parse_query_params("/posts?page=junk");
        assert_eq!(get_int(&params, "page", 1), 1);

        let params = parse_query_params("/posts");
        assert_eq!(get_int(&params, "page", 1), 1);
    }
}
