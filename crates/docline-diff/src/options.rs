use docline_types::{ExclusionSet, IdentityPolicy};

/// Per-document-type settings consumed by [`compute_diff`](crate::compute_diff).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Fields never compared or emitted.
    pub exclusions: ExclusionSet,
    /// How arrays of objects without `id` are treated.
    pub identity: IdentityPolicy,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_identity(mut self, identity: IdentityPolicy) -> Self {
        self.identity = identity;
        self
    }
}
