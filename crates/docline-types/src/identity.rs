use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;

/// Reserved field carrying an array element's identity token.
pub const IDENTITY_FIELD: &str = "id";

/// How strictly arrays of objects must carry identities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPolicy {
    /// An array with any element lacking `id` is positional.
    #[default]
    Infer,
    /// An array made only of objects must give every element an `id`.
    Require,
}

/// Addressing mode of an array, derived from its elements.
#[derive(Clone, Debug, PartialEq)]
pub enum IdentityMode<'a> {
    /// Every element is an object with a unique string `id`.
    Identifiable(BTreeMap<&'a str, &'a Value>),
    /// Elements are addressed by index.
    Positional,
}

impl IdentityMode<'_> {
    pub fn is_identifiable(&self) -> bool {
        matches!(self, Self::Identifiable(_))
    }
}

/// The identity token of an array element, if it carries one.
///
/// Only string-valued `id` fields count.
pub fn element_identity(element: &Value) -> Option<&str> {
    element.as_object()?.get(IDENTITY_FIELD)?.as_str()
}

/// Position of the element whose `id` equals `id`.
pub fn find_by_identity(array: &[Value], id: &str) -> Option<usize> {
    array
        .iter()
        .position(|element| element_identity(element) == Some(id))
}

/// Determine whether `array` is addressed by identity or by position.
///
/// An empty array is identifiable. Duplicate identities among siblings are an
/// error regardless of policy.
pub fn extract_identity(
    array: &[Value],
    policy: IdentityPolicy,
) -> Result<IdentityMode<'_>, TypeError> {
    let mut ids = Vec::with_capacity(array.len());
    for (index, element) in array.iter().enumerate() {
        match element_identity(element) {
            Some(id) => ids.push(id),
            None => {
                if policy == IdentityPolicy::Require && array.iter().all(Value::is_object) {
                    return Err(TypeError::MissingIdentity { index });
                }
                return Ok(IdentityMode::Positional);
            }
        }
    }

    let mut keyed = BTreeMap::new();
    for (id, element) in ids.into_iter().zip(array) {
        if keyed.insert(id, element).is_some() {
            return Err(TypeError::DuplicateIdentity { id: id.to_string() });
        }
    }
    Ok(IdentityMode::Identifiable(keyed))
}
