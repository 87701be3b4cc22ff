use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::path::Path;

/// Kind of a recorded mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Remove,
    Replace,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
        }
    }

    /// Whether the op carries a value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Self::Remove)
    }
}

impl FromStr for Op {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            other => Err(TypeError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded mutation of a document.
///
/// `item_ids` holds one identity token per identity-resolved array crossed by
/// `path`, in path order. Positional array segments contribute no token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireChange", into = "WireChange")]
pub struct Change {
    pub op: Op,
    pub path: Path,
    pub value: Option<Value>,
    pub item_ids: Vec<String>,
}

impl Change {
    pub fn add(path: Path, value: Value, item_ids: Vec<String>) -> Self {
        Self {
            op: Op::Add,
            path,
            value: Some(value),
            item_ids,
        }
    }

    pub fn remove(path: Path, item_ids: Vec<String>) -> Self {
        Self {
            op: Op::Remove,
            path,
            value: None,
            item_ids,
        }
    }

    pub fn replace(path: Path, value: Value, item_ids: Vec<String>) -> Self {
        Self {
            op: Op::Replace,
            path,
            value: Some(value),
            item_ids,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.path)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        if !self.item_ids.is_empty() {
            write!(f, " [{}]", self.item_ids.join(", "))?;
        }
        Ok(())
    }
}

/// Wire representation: `{ op, path, value?, itemIds }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct WireChange {
    op: String,
    path: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<Value>,
    #[serde(rename = "itemIds", default)]
    item_ids: Vec<String>,
}

/// A present `value` key is `Some`, even when it holds JSON `null`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<WireChange> for Change {
    type Error = TypeError;

    fn try_from(wire: WireChange) -> Result<Self, Self::Error> {
        Ok(Self {
            op: wire.op.parse()?,
            path: Path::parse(&wire.path)?,
            value: wire.value,
            item_ids: wire.item_ids,
        })
    }
}

impl From<Change> for WireChange {
    fn from(change: Change) -> Self {
        Self {
            op: change.op.as_str().to_string(),
            path: change.path.to_string(),
            value: change.value,
            item_ids: change.item_ids,
        }
    }
}
