//! Header carriers.
//!
//! The combinator only needs to read every value of a header and replace a
//! header with a single value. [`HeaderCarrier`] captures that, so the same
//! code works against `http::HeaderMap` and plain maps.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Header container addressed by case-insensitive name.
pub trait HeaderCarrier {
    /// All values for `name`, in arrival order.
    fn get_all(&self, name: &str) -> Vec<&[u8]>;

    /// Replace every value for `name` with `value`.
    fn set(&mut self, name: &str, value: String);
}

impl HeaderCarrier for HeaderMap {
    fn get_all(&self, name: &str) -> Vec<&[u8]> {
        HeaderMap::get_all(self, name)
            .iter()
            .map(HeaderValue::as_bytes)
            .collect()
    }

    fn set(&mut self, name: &str, value: String) {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(header = name, error = %e, "Invalid header name, skipping");
                return;
            }
        };
        let value = match HeaderValue::try_from(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(header = %name, error = %e, "Invalid header value, skipping");
                return;
            }
        };
        self.insert(name, value);
    }
}

/// Map from header name to its values. Lookups ignore ASCII case; writes
/// store the lowercase name.
impl HeaderCarrier for HashMap<String, Vec<String>> {
    fn get_all(&self, name: &str) -> Vec<&[u8]> {
        self.iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter().map(String::as_bytes))
            .collect()
    }

    fn set(&mut self, name: &str, value: String) {
        self.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.insert(name.to_ascii_lowercase(), vec![value]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map_get_all_preserves_order() {
        let mut headers = HeaderMap::new();
        headers.append("tracestate", HeaderValue::from_static("a=1"));
        headers.append("TraceState", HeaderValue::from_static("b=2"));

        let values = HeaderCarrier::get_all(&headers, "TRACESTATE");
        assert_eq!(values, vec![b"a=1".as_slice(), b"b=2".as_slice()]);
    }

    #[test]
    fn test_header_map_set_replaces() {
        let mut headers = HeaderMap::new();
        headers.append("tracestate", HeaderValue::from_static("a=1"));
        headers.append("tracestate", HeaderValue::from_static("b=2"));

        HeaderCarrier::set(&mut headers, "tracestate", String::new());
        let values = HeaderCarrier::get_all(&headers, "tracestate");
        assert_eq!(values, vec![b"".as_slice()]);
    }

    #[test]
    fn test_header_map_set_skips_invalid_value() {
        let mut headers = HeaderMap::new();
        HeaderCarrier::set(&mut headers, "tracestate", "a\nb".to_string());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_hash_map_is_case_insensitive() {
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        headers.insert("Traceparent".to_string(), vec!["x".to_string()]);

        assert_eq!(headers.get_all("traceparent"), vec![b"x".as_slice()]);

        headers.set("TRACEPARENT", "y".to_string());
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["traceparent"], vec!["y".to_string()]);
    }
}
