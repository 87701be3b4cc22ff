//! Normalization: an order-independent view of a document for diffing.
//!
//! Identifiable arrays become maps keyed by element `id`, so the same
//! elements in a different order normalize to equal trees. Positional arrays
//! stay ordered. Excluded fields are pruned before normalization and never
//! reach the diff step.

use std::collections::BTreeMap;

use docline_types::{
    extract_identity, ExclusionCursor, ExclusionSet, IdentityMode, IdentityPolicy, Value,
};

use crate::error::DiffResult;
use crate::options::DiffOptions;

/// A normalized document tree.
///
/// Identity-keyed arrays are kept distinct from plain objects so that an
/// object turning into an array is still seen as a change of kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    Scalar(Value),
    Object(BTreeMap<String, Normalized>),
    /// An identifiable array, keyed by element `id`.
    Keyed(BTreeMap<String, Normalized>),
    /// A positional array.
    List(Vec<Normalized>),
}

impl Normalized {
    /// Render the normalized view as a plain value, with identifiable arrays
    /// shown as id-keyed objects.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Object(fields) | Self::Keyed(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, child)| (key.clone(), child.to_value()))
                    .collect(),
            ),
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
        }
    }

    /// Whether two nodes can be diffed recursively.
    pub(crate) fn same_shape(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Object(_), Self::Object(_))
                | (Self::Keyed(_), Self::Keyed(_))
                | (Self::List(_), Self::List(_))
        )
    }
}

/// Remove every excluded field from `value`, keeping its shape otherwise.
pub fn prune(value: &Value, exclusions: &ExclusionSet) -> Value {
    prune_at(value, exclusions.cursor())
}

fn prune_at(value: &Value, cursor: ExclusionCursor<'_>) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .filter(|(key, _)| !cursor.excludes(key))
                .map(|(key, child)| (key.clone(), prune_at(child, cursor.descend(key))))
                .collect(),
        ),
        // Array boundaries do not consume an exclusion segment.
        Value::Array(items) => Value::Array(items.iter().map(|item| prune_at(item, cursor)).collect()),
        scalar => scalar.clone(),
    }
}

/// Prune and normalize `value` according to `options`.
pub fn normalize(value: &Value, options: &DiffOptions) -> DiffResult<Normalized> {
    normalize_pruned(&prune(value, &options.exclusions), options.identity)
}

/// Normalize a value that has already been pruned.
pub(crate) fn normalize_pruned(value: &Value, policy: IdentityPolicy) -> DiffResult<Normalized> {
    Ok(match value {
        Value::Object(fields) => Normalized::Object(
            fields
                .iter()
                .map(|(key, child)| Ok((key.clone(), normalize_pruned(child, policy)?)))
                .collect::<DiffResult<_>>()?,
        ),
        Value::Array(items) => match extract_identity(items, policy)? {
            IdentityMode::Identifiable(keyed) => Normalized::Keyed(
                keyed
                    .into_iter()
                    .map(|(id, element)| Ok((id.to_string(), normalize_pruned(element, policy)?)))
                    .collect::<DiffResult<_>>()?,
            ),
            IdentityMode::Positional => Normalized::List(
                items
                    .iter()
                    .map(|item| normalize_pruned(item, policy))
                    .collect::<DiffResult<_>>()?,
            ),
        },
        scalar => Normalized::Scalar(scalar.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use docline_types::TypeError;
    use serde_json::json;

    fn opts(paths: &[&str]) -> DiffOptions {
        DiffOptions::new().with_exclusions(ExclusionSet::from_paths(paths).unwrap())
    }

    #[test]
    fn identifiable_array_becomes_keyed_map() {
        let doc = json!({"toys": [{"id": "t2", "name": "Doll"}, {"id": "t1", "name": "Car"}]});
        let normalized = normalize(&doc, &DiffOptions::default()).unwrap();
        assert_eq!(
            normalized.to_value(),
            json!({"toys": {
                "t1": {"id": "t1", "name": "Car"},
                "t2": {"id": "t2", "name": "Doll"},
            }})
        );
    }

    #[test]
    fn permuted_identifiable_arrays_normalize_equal() {
        let a = json!([{"id": "x", "v": 1}, {"id": "y", "v": 2}]);
        let b = json!([{"id": "y", "v": 2}, {"id": "x", "v": 1}]);
        let options = DiffOptions::default();
        assert_eq!(normalize(&a, &options).unwrap(), normalize(&b, &options).unwrap());
    }

    #[test]
    fn positional_array_keeps_order() {
        let a = normalize(&json!([1, 2]), &DiffOptions::default()).unwrap();
        let b = normalize(&json!([2, 1]), &DiffOptions::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.to_value(), json!([1, 2]));
    }

    #[test]
    fn empty_object_and_empty_array_differ() {
        let a = normalize(&json!({}), &DiffOptions::default()).unwrap();
        let b = normalize(&json!([]), &DiffOptions::default()).unwrap();
        assert_ne!(a, b);
        assert!(!a.same_shape(&b));
    }

    #[test]
    fn excluded_fields_are_dropped_through_arrays() {
        let doc = json!({
            "updatedAt": "now",
            "toys": [{"id": "t1", "secret": 1, "name": "Car"}],
        });
        let normalized = normalize(&doc, &opts(&["updatedAt", "toys/secret"])).unwrap();
        assert_eq!(
            normalized.to_value(),
            json!({"toys": {"t1": {"id": "t1", "name": "Car"}}})
        );
    }

    #[test]
    fn prune_keeps_array_shape() {
        let doc = json!({"toys": [{"id": "t1", "secret": 1}], "n": 1});
        let pruned = prune(&doc, &ExclusionSet::from_paths(["toys/secret"]).unwrap());
        assert_eq!(pruned, json!({"toys": [{"id": "t1"}], "n": 1}));
    }

    #[test]
    fn discriminant_field_is_carried_unchanged() {
        let doc = json!({"pets": [{"id": "p1", "kind": "dog", "barks": true}]});
        let normalized = normalize(&doc, &DiffOptions::default()).unwrap();
        assert_eq!(
            normalized.to_value()["pets"]["p1"]["kind"],
            json!("dog")
        );
    }

    #[test]
    fn duplicate_identity_fails() {
        let doc = json!({"toys": [{"id": "a"}, {"id": "a"}]});
        let err = normalize(&doc, &DiffOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DiffError::Identity(TypeError::DuplicateIdentity { id: "a".into() })
        );
    }

    #[test]
    fn required_identity_fails_on_missing_id() {
        let doc = json!({"toys": [{"id": "a"}, {"name": "b"}]});
        let options = DiffOptions::new().with_identity(IdentityPolicy::Require);
        assert!(matches!(
            normalize(&doc, &options),
            Err(DiffError::Identity(TypeError::MissingIdentity { index: 1 }))
        ));
    }
}
