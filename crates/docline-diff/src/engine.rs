//! Top-level diff: prune, normalize, diff, re-project.

use docline_types::{Change, Value};
use tracing::debug;

use crate::error::DiffResult;
use crate::normalize::{normalize_pruned, prune};
use crate::options::DiffOptions;
use crate::raw::diff_normalized;
use crate::reproject::reproject;

/// Compute the changes that turn `old` into `new`.
///
/// Identifiable arrays are compared by element identity, so reordering them
/// produces no changes. Fields in `options.exclusions` are neither compared
/// nor emitted, including inside added or replaced values. The returned
/// changes must be applied in order.
pub fn compute_diff(old: &Value, new: &Value, options: &DiffOptions) -> DiffResult<Vec<Change>> {
    let old = prune(old, &options.exclusions);
    let new = prune(new, &options.exclusions);

    let normalized_old = normalize_pruned(&old, options.identity)?;
    let normalized_new = normalize_pruned(&new, options.identity)?;

    let changes = diff_normalized(&normalized_old, &normalized_new)
        .iter()
        .map(|raw| reproject(raw, &old, &new, options.identity))
        .collect::<DiffResult<Vec<_>>>()?;

    debug!(changes = changes.len(), "computed document diff");
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use docline_types::{ExclusionSet, Op, Path, TypeError};
    use serde_json::json;

    fn diff(old: &Value, new: &Value) -> Vec<Change> {
        compute_diff(old, new, &DiffOptions::default()).unwrap()
    }

    #[test]
    fn toy_scenario_yields_remove_and_replace() {
        let old = json!({
            "id": "1", "name": "Alice",
            "toys": [{"id": "toy1", "name": "Car"}, {"id": "toy2", "name": "Doll"}],
        });
        let new = json!({
            "id": "1", "name": "Alice",
            "toys": [{"id": "toy2", "name": "Robot"}],
        });

        let changes = diff(&old, &new);
        assert_eq!(
            changes,
            vec![
                Change::remove(Path::parse("/toys/toy1").unwrap(), vec!["toy1".into()]),
                Change::replace(
                    Path::parse("/toys/toy2/name").unwrap(),
                    json!("Robot"),
                    vec!["toy2".into()],
                ),
            ]
        );
    }

    #[test]
    fn identical_documents_have_no_changes() {
        let doc = json!({"a": 1, "list": [{"id": "x"}], "tags": ["t"]});
        assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn reordering_identifiable_array_is_not_a_change() {
        let a = json!({"toys": [{"id": "a", "n": 1}, {"id": "b", "n": 2}, {"id": "c", "n": 3}]});
        let b = json!({"toys": [{"id": "c", "n": 3}, {"id": "a", "n": 1}, {"id": "b", "n": 2}]});
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn added_element_carries_whole_value() {
        let old = json!({"toys": []});
        let new = json!({"toys": [{"id": "t9", "name": "Kite"}]});
        let changes = diff(&old, &new);
        assert_eq!(
            changes,
            vec![Change::add(
                Path::parse("/toys/t9").unwrap(),
                json!({"id": "t9", "name": "Kite"}),
                vec!["t9".into()],
            )]
        );
    }

    #[test]
    fn excluded_fields_never_appear() {
        let options = DiffOptions::new()
            .with_exclusions(ExclusionSet::from_paths(["updatedAt", "toys/secret"]).unwrap());
        let old = json!({"updatedAt": 1, "toys": [{"id": "a", "secret": "x"}]});
        let new = json!({"updatedAt": 2, "toys": [{"id": "a", "secret": "y"}]});
        assert!(compute_diff(&old, &new, &options).unwrap().is_empty());
    }

    #[test]
    fn excluded_fields_are_stripped_from_added_values() {
        let options =
            DiffOptions::new().with_exclusions(ExclusionSet::from_paths(["toys/secret"]).unwrap());
        let old = json!({"toys": []});
        let new = json!({"toys": [{"id": "a", "secret": "x", "name": "Car"}]});
        let changes = compute_diff(&old, &new, &options).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].value, Some(json!({"id": "a", "name": "Car"})));
    }

    #[test]
    fn kind_switch_is_a_whole_replace() {
        let changes = diff(&json!({"v": {"a": 1}}), &json!({"v": [1]}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].op, Op::Replace);
        assert_eq!(changes[0].value, Some(json!([1])));
    }

    #[test]
    fn duplicate_identity_is_reported() {
        let bad = json!({"toys": [{"id": "a"}, {"id": "a"}]});
        let err = compute_diff(&json!({}), &bad, &DiffOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DiffError::Identity(TypeError::DuplicateIdentity { .. })
        ));
    }
}
