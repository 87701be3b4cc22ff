//! Re-projection of raw changes onto the original (un-normalized) documents.

use docline_types::{extract_identity, Change, IdentityMode, IdentityPolicy, Op, Path, Value};

use crate::error::{DiffError, DiffResult};
use crate::raw::RawChange;

/// Location of a raw path inside an original document.
struct Resolved<'a> {
    node: &'a Value,
    item_ids: Vec<String>,
}

/// Turn a raw change into a [`Change`].
///
/// Removals and replacements are resolved against `old`, additions against
/// `new`; values always come from `new`. Each keyed segment is an identity
/// token and is recorded in `item_ids`. Positional segments stay numeric.
pub(crate) fn reproject(
    raw: &RawChange,
    old: &Value,
    new: &Value,
    policy: IdentityPolicy,
) -> DiffResult<Change> {
    let change = match raw.op {
        Op::Remove => {
            let resolved = resolve(old, &raw.path, policy)?;
            Change::remove(raw.path.clone(), resolved.item_ids)
        }
        Op::Add => {
            let resolved = resolve(new, &raw.path, policy)?;
            Change::add(raw.path.clone(), resolved.node.clone(), resolved.item_ids)
        }
        Op::Replace => {
            let resolved = resolve(old, &raw.path, policy)?;
            let value = resolve(new, &raw.path, policy)?.node.clone();
            Change::replace(raw.path.clone(), value, resolved.item_ids)
        }
    };
    Ok(change)
}

fn resolve<'a>(root: &'a Value, path: &Path, policy: IdentityPolicy) -> DiffResult<Resolved<'a>> {
    let not_found = || DiffError::PathNotFound(path.clone());
    let mut node = root;
    let mut item_ids = Vec::new();

    for segment in path.segments() {
        node = match node {
            Value::Object(fields) => fields.get(segment).ok_or_else(not_found)?,
            Value::Array(items) => match extract_identity(items, policy)? {
                IdentityMode::Identifiable(keyed) => {
                    let element = keyed.get(segment.as_str()).copied().ok_or_else(not_found)?;
                    item_ids.push(segment.clone());
                    element
                }
                IdentityMode::Positional => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .ok_or_else(not_found)?,
            },
            _ => return Err(not_found()),
        };
    }

    Ok(Resolved { node, item_ids })
}
