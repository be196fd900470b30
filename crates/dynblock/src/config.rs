//! # Configuration
//!
//! Settings are managed by [`clapfig`], which loads `dynblock.toml` from each
//! search directory and merges them, later directories overriding earlier
//! ones. Missing files fall back to the compiled defaults. Environment
//! variables are not consulted.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `identity_column` | `ID` | Column ignored by duplicate detection |
//! | `default_strategy` | `exact` | Match strategy when none is given |
//! | `regex_case_insensitive` | `true` | Compile row patterns ignoring case |
//! | `default_grip_size` | `1.0` | Size of the grip created with a parameter |

use crate::error::{DynBlockError, Result};
use crate::matching::{MatchConfig, MatchStrategy};
use crate::table::DEFAULT_IDENTITY_COLUMN;
use clapfig::{Clapfig, SearchMode, SearchPath};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = "dynblock.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DynBlockConfig {
    /// Column excluded from duplicate detection (matched ignoring case).
    #[config(default = "ID")]
    pub identity_column: String,

    /// Strategy used when a match request does not name one.
    #[config(default = "exact")]
    pub default_strategy: MatchStrategy,

    #[config(default = true)]
    pub regex_case_insensitive: bool,

    #[config(default = 1.0)]
    pub default_grip_size: f64,
}

impl Default for DynBlockConfig {
    fn default() -> Self {
        Self {
            identity_column: DEFAULT_IDENTITY_COLUMN.to_string(),
            default_strategy: MatchStrategy::Exact,
            regex_case_insensitive: true,
            default_grip_size: 1.0,
        }
    }
}

impl DynBlockConfig {
    /// Match settings for one input and one output column, using the
    /// configured strategy unless `strategy` overrides it.
    pub fn match_config(
        &self,
        input_column: &str,
        output_column: &str,
        strategy: Option<MatchStrategy>,
    ) -> MatchConfig {
        let mut config = MatchConfig::new(
            input_column,
            output_column,
            strategy.unwrap_or(self.default_strategy),
        );
        config.regex_case_insensitive = self.regex_case_insensitive;
        config
    }
}

/// Load and merge `dynblock.toml` from `dirs`, lowest priority first.
pub fn try_load_config(dirs: &[PathBuf]) -> Result<DynBlockConfig> {
    Clapfig::builder()
        .app_name("dynblock")
        .file_name(CONFIG_FILE_NAME)
        .search_paths(dirs.iter().cloned().map(SearchPath::Path).collect())
        .search_mode(SearchMode::Merge)
        .no_env()
        .load()
        .map_err(|e| DynBlockError::Config(e.to_string()))
}

/// Like [`try_load_config`], falling back to defaults on a bad file.
pub fn load_config(dirs: &[PathBuf]) -> DynBlockConfig {
    try_load_config(dirs).unwrap_or_else(|err| {
        warn!(%err, "using default configuration");
        DynBlockConfig::default()
    })
}
