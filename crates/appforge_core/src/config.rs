//! Project configuration (`appforge.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use appforge_spec::{ReferencePolicy, ValidatorOptions};
use appforge_templates::DEFAULT_MAX_OPEN_FILES;

use crate::error::{CoreError, CoreResult};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "appforge.toml";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Directory holding `<name>.json` spec documents.
    pub specs_dir: PathBuf,
    /// Directory holding one subdirectory per template.
    pub templates_dir: PathBuf,
    /// Generated apps land in `<output_dir>/<app-name>`.
    pub output_dir: PathBuf,
    /// Template used when `generate` is not given one. Falls back to the
    /// spec dialect's default.
    pub default_template: Option<String>,
    /// Maximum number of files written at the same time.
    pub max_open_files: usize,
    /// Whether undeclared variable references fail validation.
    pub missing_variables: ReferencePolicy,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            specs_dir: PathBuf::from("sites"),
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("apps"),
            default_template: None,
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            missing_variables: ReferencePolicy::Warn,
        }
    }
}

impl ForgeConfig {
    /// Defaults with every directory placed under `base`.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        Self::default().resolve_against(base.as_ref())
    }

    /// Parse configuration text. Relative paths are kept as written.
    pub fn from_toml(content: &str, origin: &Path) -> CoreResult<Self> {
        toml::from_str(content).map_err(|source| CoreError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path`, resolving relative directories against its parent.
    pub fn load(path: &Path) -> CoreResult<Self> {
        debug!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::from_toml(&content, path)?.resolve_against(base))
    }

    /// Load an explicit config file, or `appforge.toml` in `cwd` when it
    /// exists, or fall back to defaults rooted at `cwd`.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> CoreResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = cwd.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            debug!("No {} in {:?}, using defaults", CONFIG_FILE, cwd);
            Ok(Self::rooted_at(cwd))
        }
    }

    fn resolve_against(mut self, base: &Path) -> Self {
        for dir in [&mut self.specs_dir, &mut self.templates_dir, &mut self.output_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            missing_variables: self.missing_variables,
            ..Default::default()
        }
    }
}
