//! Exclusion sets: field paths that are never compared or emitted.
//!
//! Exclusion paths name object fields only. Array boundaries are transparent,
//! so `toys/secret` excludes the `secret` field of every element of `toys`.

use std::collections::BTreeMap;

use crate::error::TypeError;
use crate::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    root: ExclusionNode,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ExclusionNode {
    excluded: bool,
    children: BTreeMap<String, ExclusionNode>,
}

impl ExclusionSet {
    /// An empty set that excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from field paths such as `"audit/updatedAt"` or
    /// `"/audit/updatedAt"`.
    pub fn from_paths<I, S>(paths: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for raw in paths {
            set.insert_field_path(raw.as_ref())?;
        }
        Ok(set)
    }

    /// Exclude a field given in the same form [`from_paths`] accepts.
    ///
    /// [`from_paths`]: ExclusionSet::from_paths
    pub fn insert_field_path(&mut self, raw: &str) -> Result<(), TypeError> {
        let path = if raw.is_empty() || raw.starts_with('/') {
            Path::parse(raw)?
        } else {
            Path::parse(&format!("/{raw}"))?
        };
        self.insert(&path)
    }

    /// Exclude the field at `path`.
    pub fn insert(&mut self, path: &Path) -> Result<(), TypeError> {
        if path.is_root() {
            return Err(TypeError::InvalidPath {
                path: path.to_string(),
                reason: "cannot exclude the document root".into(),
            });
        }
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.excluded = true;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Cursor positioned at the document root.
    pub fn cursor(&self) -> ExclusionCursor<'_> {
        ExclusionCursor(Some(&self.root))
    }

    /// Whether the field path (field names only) is excluded, either
    /// directly or through an excluded ancestor.
    pub fn is_excluded<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        let mut cursor = self.cursor();
        for field in fields {
            if cursor.excludes(field.as_ref()) {
                return true;
            }
            cursor = cursor.descend(field.as_ref());
        }
        false
    }
}

/// Position inside an [`ExclusionSet`] while walking a document.
#[derive(Clone, Copy, Debug)]
pub struct ExclusionCursor<'a>(Option<&'a ExclusionNode>);

impl<'a> ExclusionCursor<'a> {
    /// A cursor that excludes nothing.
    pub fn none() -> Self {
        Self(None)
    }

    /// Whether `field` of the current object is excluded.
    pub fn excludes(&self, field: &str) -> bool {
        self.0
            .and_then(|node| node.children.get(field))
            .is_some_and(|child| child.excluded)
    }

    /// Cursor for the value of `field`.
    pub fn descend(&self, field: &str) -> ExclusionCursor<'a> {
        ExclusionCursor(self.0.and_then(|node| node.children.get(field)))
    }
}
