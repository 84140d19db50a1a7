//! Approximate byte-size estimation for cached values.
//!
//! Every value type stored in the cache reports a deep size estimate once at
//! insert time; the tier's byte accounting is built on these estimates. They
//! do not need to be exact, only stable and roughly proportional to real
//! memory use.

/// Approximate deep size of a value in bytes.
pub trait EstimateSize {
    fn estimate_bytes(&self) -> usize;
}

impl EstimateSize for String {
    fn estimate_bytes(&self) -> usize {
        std::mem::size_of::<String>() + self.len()
    }
}

impl EstimateSize for str {
    fn estimate_bytes(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for Vec<u8> {
    fn estimate_bytes(&self) -> usize {
        std::mem::size_of::<Vec<u8>>() + self.len()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_bytes(&self) -> usize {
        match self {
            Some(v) => std::mem::size_of::<Option<T>>() + v.estimate_bytes(),
            None => std::mem::size_of::<Option<T>>(),
        }
    }
}

impl EstimateSize for serde_json::Value {
    fn estimate_bytes(&self) -> usize {
        use serde_json::Value;

        // Per-node overhead approximates the enum discriminant plus
        // allocator bookkeeping for the container variants.
        const NODE: usize = std::mem::size_of::<Value>();

        match self {
            Value::Null | Value::Bool(_) | Value::Number(_) => NODE,
            Value::String(s) => NODE + s.len(),
            Value::Array(items) => {
                NODE + items.iter().map(|v| v.estimate_bytes()).sum::<usize>()
            }
            Value::Object(map) => {
                NODE + map
                    .iter()
                    .map(|(k, v)| k.len() + v.estimate_bytes())
                    .sum::<usize>()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_size_tracks_length() {
        let short = "abc".to_string();
        let long = "a".repeat(10_000);
        assert!(long.estimate_bytes() > short.estimate_bytes());
        assert!(long.estimate_bytes() >= 10_000);
    }

    #[test]
    fn test_byte_vec_size() {
        let payload = vec![0u8; 4096];
        assert!(payload.estimate_bytes() >= 4096);
    }

    #[test]
    fn test_json_size_is_recursive() {
        let flat = json!({"a": 1});
        let nested = json!({
            "entities": [
                {"text": "Donoghue v Stevenson", "label": "CASENAME"},
                {"text": "Companies Act 2006", "label": "LEGISLATION"},
            ],
            "source": "blackstone",
        });
        assert!(nested.estimate_bytes() > flat.estimate_bytes());
    }

    #[test]
    fn test_option_size() {
        let none: Option<String> = None;
        let some = Some("payload".to_string());
        assert!(some.estimate_bytes() > none.estimate_bytes());
    }
}
