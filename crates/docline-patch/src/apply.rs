use std::iter::Peekable;
use std::slice;

use docline_types::identity::find_by_identity;
use docline_types::{
    extract_identity, Change, IdentityPolicy, Op, Value, ValueKind, APPEND_MARKER, IDENTITY_FIELD,
};
use tracing::debug;

use crate::error::{PatchError, PatchResult};

type Tokens<'a> = Peekable<slice::Iter<'a, String>>;

/// Apply one change to `target`, returning the patched document.
pub fn apply_change(change: &Change, target: &Value) -> PatchResult<Value> {
    let mut document = target.clone();
    apply_in_place(change, &mut document)?;
    Ok(document)
}

/// Apply `changes` to `target` in order.
///
/// Later changes may rely on the state left by earlier ones, so the order
/// produced by the diff engine must be preserved. Any failure aborts the
/// whole sequence.
pub fn apply_change_sequence(changes: &[Change], target: &Value) -> PatchResult<Value> {
    let mut document = target.clone();
    for change in changes {
        apply_in_place(change, &mut document)?;
    }
    debug!(changes = changes.len(), "applied change sequence");
    Ok(document)
}

fn apply_in_place(change: &Change, document: &mut Value) -> PatchResult<()> {
    if change.op.requires_value() && change.value.is_none() {
        return Err(missing_value(change));
    }
    let Some((terminal, parents)) = change.path.split_last() else {
        return apply_at_root(change, document);
    };

    let mut tokens = change.item_ids.iter().peekable();
    let mut node = document;
    for segment in parents {
        node = step(node, segment, &mut tokens, change)?;
    }
    apply_terminal(node, terminal, &mut tokens, change)
}

fn apply_at_root(change: &Change, document: &mut Value) -> PatchResult<()> {
    match change.op {
        Op::Add | Op::Replace => {
            *document = required_value(change)?;
            Ok(())
        }
        Op::Remove => Err(PatchError::TypeMismatch {
            op: change.op,
            path: change.path.clone(),
            found: ValueKind::of(document),
        }),
    }
}

/// Consume the next identity token if it names `segment` and `items` is
/// addressed by identity.
///
/// A segment crossing an identity-resolved array is the identity token
/// itself. A positional index whose text happens to equal the token leaves
/// it for the identity array further down the path.
fn take_token(tokens: &mut Tokens<'_>, items: &[Value], segment: &str) -> bool {
    let names_segment = tokens.peek().is_some_and(|token| token.as_str() == segment);
    if names_segment && is_identity_addressed(items) {
        tokens.next();
        true
    } else {
        false
    }
}

fn is_identity_addressed(items: &[Value]) -> bool {
    extract_identity(items, IdentityPolicy::Infer).is_ok_and(|mode| mode.is_identifiable())
}

fn step<'v>(
    node: &'v mut Value,
    segment: &str,
    tokens: &mut Tokens<'_>,
    change: &Change,
) -> PatchResult<&'v mut Value> {
    match node {
        Value::Object(fields) => fields
            .get_mut(segment)
            .ok_or_else(|| path_not_found(change, segment)),
        Value::Array(items) => {
            let index = if take_token(tokens, items.as_slice(), segment) {
                find_by_identity(items, segment)
                    .ok_or_else(|| identity_not_found(change, segment))?
            } else {
                existing_index(items.len(), segment)
                    .ok_or_else(|| path_not_found(change, segment))?
            };
            Ok(&mut items[index])
        }
        _ => Err(path_not_found(change, segment)),
    }
}

fn apply_terminal(
    node: &mut Value,
    terminal: &str,
    tokens: &mut Tokens<'_>,
    change: &Change,
) -> PatchResult<()> {
    match node {
        Value::Object(fields) => match change.op {
            Op::Remove => fields
                .remove(terminal)
                .map(drop)
                .ok_or_else(|| path_not_found(change, terminal)),
            Op::Replace => {
                let value = required_value(change)?;
                let slot = fields
                    .get_mut(terminal)
                    .ok_or_else(|| path_not_found(change, terminal))?;
                *slot = value;
                Ok(())
            }
            Op::Add => {
                fields.insert(terminal.to_string(), required_value(change)?);
                Ok(())
            }
        },
        Value::Array(items) => {
            let by_identity = take_token(tokens, items.as_slice(), terminal);
            match change.op {
                // Array slots are only ever changed through fields of the
                // element they hold.
                Op::Replace => Err(PatchError::TypeMismatch {
                    op: change.op,
                    path: change.path.clone(),
                    found: ValueKind::Array,
                }),
                Op::Remove => {
                    let index = if by_identity {
                        find_by_identity(items, terminal)
                            .ok_or_else(|| identity_not_found(change, terminal))?
                    } else {
                        existing_index(items.len(), terminal)
                            .ok_or_else(|| path_not_found(change, terminal))?
                    };
                    items.remove(index);
                    Ok(())
                }
                Op::Add if by_identity => {
                    let mut element = required_value(change)?;
                    if !element.is_object() {
                        return Err(PatchError::TypeMismatch {
                            op: change.op,
                            path: change.path.clone(),
                            found: ValueKind::of(&element),
                        });
                    }
                    if let Value::Object(fields) = &mut element {
                        fields.insert(
                            IDENTITY_FIELD.to_string(),
                            Value::String(terminal.to_string()),
                        );
                    }
                    items.push(element);
                    Ok(())
                }
                Op::Add => {
                    let index = insertion_index(items.len(), terminal)
                        .ok_or_else(|| path_not_found(change, terminal))?;
                    items.insert(index, required_value(change)?);
                    Ok(())
                }
            }
        }
        other => Err(PatchError::TypeMismatch {
            op: change.op,
            path: change.path.clone(),
            found: ValueKind::of(other),
        }),
    }
}

fn existing_index(len: usize, segment: &str) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|index| *index < len)
}

fn insertion_index(len: usize, segment: &str) -> Option<usize> {
    if segment == APPEND_MARKER {
        return Some(len);
    }
    segment.parse::<usize>().ok().filter(|index| *index <= len)
}

fn required_value(change: &Change) -> PatchResult<Value> {
    change.value.clone().ok_or_else(|| missing_value(change))
}

fn missing_value(change: &Change) -> PatchError {
    PatchError::MissingValue {
        op: change.op,
        path: change.path.clone(),
    }
}

fn path_not_found(change: &Change, segment: &str) -> PatchError {
    PatchError::PathNotFound {
        path: change.path.clone(),
        segment: segment.to_string(),
    }
}

fn identity_not_found(change: &Change, id: &str) -> PatchError {
    PatchError::IdentityNotFound {
        path: change.path.clone(),
        id: id.to_string(),
    }
}
