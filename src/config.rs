//! Compiler configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// Compiler Configuration
// ============================================================================

/// Options for one `Compiler`. Every field has a default, so a JSON object
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Add the gene / RNA of every gene product, with `transcribedTo` and
    /// `translatedTo` edges.
    pub complete_origin: bool,

    /// Accept names without a namespace prefix.
    pub allow_naked_names: bool,

    /// Accept every namespace-qualified name and annotation value unchecked.
    pub skip_validation: bool,

    /// Reject qualified statements read while no citation is set.
    pub require_citation: bool,

    /// Annotations that must be set for every qualified statement.
    pub required_annotations: Vec<String>,

    /// Accept legacy spellings with a warning. When false they are errors.
    pub allow_deprecated: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            complete_origin: false,
            allow_naked_names: false,
            skip_validation: false,
            require_citation: false,
            required_annotations: Vec::new(),
            allow_deprecated: true,
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Strict curation: citations required, no legacy spellings.
    pub fn strict() -> Self {
        Self { require_citation: true, allow_deprecated: false, ..Self::default() }
    }
}
