//! Template manifest definitions.
//!
//! A template is a directory holding a `template.yaml` definition and the
//! files to generate from, either under a `template/` subdirectory or next to
//! the definition itself.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A file entry as declared in `template.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateFileSpec {
    /// Path relative to the template content directory.
    pub path: String,
    /// Copy verbatim instead of rendering. Detected from content when omitted.
    #[serde(default)]
    pub binary: Option<bool>,
}

/// Contents of a `template.yaml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Unique template identifier; defaults to the directory name.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Template description
    #[serde(default)]
    pub description: String,
    /// Template version
    #[serde(default = "default_version")]
    pub version: String,
    /// Explicit file list. When empty, the content directory is walked.
    #[serde(default)]
    pub files: Vec<TemplateFileSpec>,
    /// Glob patterns (relative to the content directory) never copied.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Where generated route metadata is written in the output tree.
    #[serde(default)]
    pub routes_file: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// One file of a loaded template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFile {
    /// Path relative to the template content directory, preserved under the
    /// output directory.
    pub source_path: PathBuf,
    pub is_binary: bool,
    /// `is_binary` was guessed from the file's first bytes rather than
    /// declared in the manifest.
    #[serde(skip)]
    pub sniffed: bool,
}

impl TemplateFile {
    pub fn text(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            is_binary: false,
            sniffed: false,
        }
    }

    pub fn binary(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            is_binary: true,
            sniffed: false,
        }
    }
}

/// A loaded template. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateManifest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    /// Directory holding `template.yaml`.
    pub dir: PathBuf,
    /// Directory the `files` are relative to.
    pub root: PathBuf,
    /// Files in declaration order, or sorted path order for walked templates.
    pub files: Vec<TemplateFile>,
    pub routes_file: Option<PathBuf>,
}

impl TemplateManifest {
    /// Build a manifest directly, without a `template.yaml`.
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>, files: Vec<TemplateFile>) -> Self {
        let id = id.into();
        let root = root.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            version: default_version(),
            dir: root.clone(),
            root,
            files,
            routes_file: None,
        }
    }

    pub fn with_routes_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.routes_file = Some(path.into());
        self
    }

    /// Absolute location of a file's source.
    pub fn source_of(&self, file: &TemplateFile) -> PathBuf {
        self.root.join(&file.source_path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn binary_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_binary).count()
    }
}

/// Whether `path` is relative and stays inside the directory it is joined to.
pub fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
