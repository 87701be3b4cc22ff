//! TOML configuration.
//!
//! ```toml
//! max_retries = 5
//! notification_capacity = 128
//!
//! [types.person]
//! exclude = ["updatedAt", "toys/internalNote"]
//! identity = "require"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use docline_diff::DiffOptions;
use docline_types::{ExclusionSet, IdentityPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SdkResult;

/// Service-wide settings plus per-document-type diff settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoclineConfig {
    /// Extra attempts after a save conflict before an update gives up.
    pub max_retries: u32,
    /// Buffer size of the broadcast notification channel.
    pub notification_capacity: usize,
    /// Diff settings keyed by document type name.
    pub types: BTreeMap<String, TypeConfig>,
}

impl Default for DoclineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            notification_capacity: 256,
            types: BTreeMap::new(),
        }
    }
}

/// Diff settings for one document type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConfig {
    /// Slash-separated field paths ignored by the diff.
    pub exclude: Vec<String>,
    pub identity: IdentityPolicy,
}

impl DoclineConfig {
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), types = config.types.len(), "loaded config");
        Ok(config)
    }

    /// The diff options for `type_name`. Unknown types get the defaults.
    pub fn diff_options(&self, type_name: &str) -> SdkResult<DiffOptions> {
        let Some(settings) = self.types.get(type_name) else {
            return Ok(DiffOptions::default());
        };
        let exclusions = ExclusionSet::from_paths(&settings.exclude)?;
        Ok(DiffOptions::new()
            .with_exclusions(exclusions)
            .with_identity(settings.identity))
    }
}
