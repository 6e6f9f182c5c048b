//! List classifier
//!
//! Decides whether a list found under a scalar-typed field is a uniform list
//! of objects (which would need a nested specification) or anything else,
//! which is stored in the scalar column in serialized form.

use std::collections::BTreeSet;

use crate::models::SourceValue;

/// Structural classification of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListShape {
    /// Non-empty list of objects that all share this key set
    Consistent(BTreeSet<String>),
    /// Empty, scalar, mixed, or objects with differing keys
    Inconsistent,
}

impl ListShape {
    pub fn is_consistent(&self) -> bool {
        matches!(self, ListShape::Consistent(_))
    }
}

/// Classify a list by shape alone; the declared type is not consulted.
///
/// ```rust
/// use response_sql_sdk::convert::{ListShape, classify};
/// use response_sql_sdk::models::SourceValue;
///
/// let list = SourceValue::from(serde_json::json!([{"a": 1}, {"a": 2}]));
/// assert!(classify(list.as_list().unwrap()).is_consistent());
/// assert_eq!(classify(&[]), ListShape::Inconsistent);
/// ```
pub fn classify(values: &[SourceValue]) -> ListShape {
    let mut elements = values.iter();
    let Some(first) = elements.next().and_then(SourceValue::as_object) else {
        return ListShape::Inconsistent;
    };
    let shape: BTreeSet<&String> = first.keys().collect();

    for element in elements {
        match element.as_object() {
            Some(obj) if obj.len() == shape.len() && obj.keys().all(|k| shape.contains(k)) => {}
            _ => return ListShape::Inconsistent,
        }
    }

    ListShape::Consistent(shape.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(value: serde_json::Value) -> Vec<SourceValue> {
        match SourceValue::from(value) {
            SourceValue::List(items) => items,
            other => panic!("expected list, got {}", other.kind()),
        }
    }

    #[test]
    fn test_consistent_ignores_key_order() {
        let items = list(json!([{"a": 1, "b": 2}, {"b": 3, "a": null}]));
        let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(classify(&items), ListShape::Consistent(expected));
    }

    #[test]
    fn test_inconsistent_shapes() {
        assert_eq!(classify(&[]), ListShape::Inconsistent);
        assert_eq!(classify(&list(json!(["johnny", "j"]))), ListShape::Inconsistent);
        assert_eq!(classify(&list(json!([{"a": 1}, {"b": 1}]))), ListShape::Inconsistent);
        assert_eq!(
            classify(&list(json!([{"a": 1}, {"a": 1, "b": 2}]))),
            ListShape::Inconsistent
        );
        assert_eq!(classify(&list(json!([{"a": 1}, 2]))), ListShape::Inconsistent);
        assert_eq!(classify(&list(json!([[{"a": 1}], [{"a": 2}]]))), ListShape::Inconsistent);
    }

    #[test]
    fn test_single_object_and_empty_objects() {
        assert!(classify(&list(json!([{"a": 1}]))).is_consistent());
        assert_eq!(
            classify(&list(json!([{}, {}]))),
            ListShape::Consistent(BTreeSet::new())
        );
    }
}
