//! Spec file discovery and reading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{SpecError, SpecResult};

/// Reader for spec documents stored as `<specs_dir>/<name>.json`.
pub struct SpecReader {
    specs_dir: PathBuf,
}

impl SpecReader {
    /// File extension of spec documents.
    pub const EXTENSION: &'static str = "json";

    pub fn new(specs_dir: impl Into<PathBuf>) -> Self {
        Self {
            specs_dir: specs_dir.into(),
        }
    }

    pub fn specs_dir(&self) -> &Path {
        &self.specs_dir
    }

    /// The spec name without a trailing `.json`.
    ///
    /// Names that would escape the specs directory are rejected.
    pub fn spec_name(name: &str) -> SpecResult<&str> {
        let stem = name.strip_suffix(".json").unwrap_or(name);
        if stem.is_empty() || stem == "." || stem == ".." || stem.contains(['/', '\\']) {
            return Err(SpecError::InvalidName(name.to_string()));
        }
        Ok(stem)
    }

    /// Location of the spec called `name`; see [`SpecReader::spec_name`].
    pub fn spec_path(&self, name: &str) -> SpecResult<PathBuf> {
        let stem = Self::spec_name(name)?;
        Ok(self.specs_dir.join(format!("{}.{}", stem, Self::EXTENSION)))
    }

    /// Read the raw bytes of the spec called `name`.
    pub fn read(&self, name: &str) -> SpecResult<Vec<u8>> {
        let path = self.spec_path(name)?;
        debug!("Reading spec from {:?}", path);

        if !path.is_file() {
            return Err(SpecError::NotFound(path));
        }
        Ok(fs::read(&path)?)
    }

    /// Names of all specs in the specs directory, sorted.
    pub fn list(&self) -> SpecResult<Vec<String>> {
        if !self.specs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.specs_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| SpecError::Io(e.into()))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == Self::EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        Ok(names)
    }
}
