//! Generic keyed-tree diff over normalized documents.
//!
//! Raw changes are addressed by normalized keys: object field names, element
//! identities of keyed arrays, and indices of positional arrays.

use std::collections::{BTreeMap, BTreeSet};

use docline_types::{Op, Path};

use crate::normalize::Normalized;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawChange {
    pub op: Op,
    pub path: Path,
}

/// Diff two normalized trees.
///
/// Changes are emitted in an order that can be applied sequentially:
/// map keys in ascending order, then for positional arrays the in-place
/// element changes, surplus removals from the highest index down, and
/// additions in ascending index order.
pub(crate) fn diff_normalized(old: &Normalized, new: &Normalized) -> Vec<RawChange> {
    let mut changes = Vec::new();
    walk(old, new, &Path::root(), &mut changes);
    changes
}

fn walk(old: &Normalized, new: &Normalized, path: &Path, out: &mut Vec<RawChange>) {
    match (old, new) {
        (Normalized::Object(a), Normalized::Object(b))
        | (Normalized::Keyed(a), Normalized::Keyed(b)) => diff_maps(a, b, path, out),
        (Normalized::List(a), Normalized::List(b)) => diff_lists(a, b, path, out),
        _ if old == new => {}
        // Scalar change or kind switch: no recursion across shapes.
        _ => out.push(RawChange {
            op: Op::Replace,
            path: path.clone(),
        }),
    }
}

fn diff_maps(
    old: &BTreeMap<String, Normalized>,
    new: &BTreeMap<String, Normalized>,
    path: &Path,
    out: &mut Vec<RawChange>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for key in keys {
        let child = path.child(key.as_str());
        match (old.get(key), new.get(key)) {
            (Some(a), Some(b)) => walk(a, b, &child, out),
            (Some(_), None) => out.push(RawChange {
                op: Op::Remove,
                path: child,
            }),
            (None, Some(_)) => out.push(RawChange {
                op: Op::Add,
                path: child,
            }),
            (None, None) => unreachable!("key comes from one of the maps"),
        }
    }
}

fn diff_lists(old: &[Normalized], new: &[Normalized], path: &Path, out: &mut Vec<RawChange>) {
    let common = old.len().min(new.len());
    for index in 0..common {
        let (a, b) = (&old[index], &new[index]);
        let child = path.child(index.to_string());
        if a.same_shape(b) {
            walk(a, b, &child, out);
        } else if a != b {
            // An array slot is never replaced in place.
            out.push(RawChange {
                op: Op::Remove,
                path: child.clone(),
            });
            out.push(RawChange {
                op: Op::Add,
                path: child,
            });
        }
    }
    for index in (common..old.len()).rev() {
        out.push(RawChange {
            op: Op::Remove,
            path: path.child(index.to_string()),
        });
    }
    for index in common..new.len() {
        out.push(RawChange {
            op: Op::Add,
            path: path.child(index.to_string()),
        });
    }
}
