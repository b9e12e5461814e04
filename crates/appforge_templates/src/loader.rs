//! Template loading functionality.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{TemplateError, TemplateResult};
use crate::manifest::{is_contained, TemplateDefinition, TemplateFile, TemplateManifest};

/// Name of the template definition file.
pub const MANIFEST_FILE: &str = "template.yaml";
const ALT_MANIFEST_FILE: &str = "template.yml";
/// Optional subdirectory holding a template's files.
pub const CONTENT_DIR: &str = "template";

/// Bytes inspected when guessing whether a file is binary.
const SNIFF_LEN: usize = 8192;

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "ico", "bmp", "avif", "woff", "woff2", "ttf", "otf",
    "eot", "pdf", "zip", "gz", "tgz", "wasm", "mp3", "mp4", "webm", "ogg",
];

/// Template loader.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Load every template directory, in sorted directory order.
    ///
    /// Directories that fail to load are logged and skipped.
    pub fn load_all(&self) -> TemplateResult<Vec<TemplateManifest>> {
        let mut manifests = Vec::new();

        if !self.templates_path.exists() {
            warn!("Templates directory does not exist: {:?}", self.templates_path);
            return Ok(manifests);
        }

        for entry in WalkDir::new(&self.templates_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_dir() {
                match self.load_template(path) {
                    Ok(manifest) => {
                        info!("Loaded template: {} ({} files)", manifest.id, manifest.file_count());
                        manifests.push(manifest);
                    }
                    Err(e) => {
                        warn!("Failed to load template from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(manifests)
    }

    /// Load a single template from a directory.
    pub fn load_template(&self, path: &Path) -> TemplateResult<TemplateManifest> {
        let manifest_path = manifest_file(path).ok_or_else(|| TemplateError::MissingManifest(path.to_path_buf()))?;
        let definition = self.load_definition(&manifest_path)?;

        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = definition.id.clone().unwrap_or(dir_name);

        let root = if path.join(CONTENT_DIR).is_dir() {
            path.join(CONTENT_DIR)
        } else {
            path.to_path_buf()
        };

        let excludes = compile_patterns(&id, &definition.exclude)?;
        let files = if definition.files.is_empty() {
            walk_files(&root, root == path, &excludes)
        } else {
            declared_files(&id, &root, &definition, &excludes)?
        };

        let routes_file = match &definition.routes_file {
            Some(p) if !is_contained(Path::new(p)) => {
                return Err(TemplateError::InvalidManifest {
                    template: id,
                    message: format!("routes_file '{}' must be a relative path inside the output", p),
                });
            }
            Some(p) => Some(PathBuf::from(p)),
            None => None,
        };

        Ok(TemplateManifest {
            name: definition.name.clone().unwrap_or_else(|| id.clone()),
            id,
            description: definition.description,
            version: definition.version,
            dir: path.to_path_buf(),
            root,
            files,
            routes_file,
        })
    }

    /// Load a manifest file.
    fn load_definition(&self, path: &Path) -> TemplateResult<TemplateDefinition> {
        debug!("Loading manifest from {:?}", path);
        let content = fs::read_to_string(path)?;
        let definition: TemplateDefinition = serde_yaml::from_str(&content)?;
        Ok(definition)
    }

    /// Check a template directory for problems without failing on the first.
    pub fn validate_template(&self, path: &Path) -> Vec<String> {
        let mut issues = Vec::new();

        let manifest = match self.load_template(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                issues.push(e.to_string());
                return issues;
            }
        };

        if manifest.files.is_empty() {
            issues.push("Template contains no files".to_string());
        }

        for file in &manifest.files {
            if !manifest.source_of(file).is_file() {
                issues.push(format!(
                    "Referenced file does not exist: {}",
                    file.source_path.display()
                ));
            }
        }

        issues
    }
}

fn manifest_file(dir: &Path) -> Option<PathBuf> {
    [MANIFEST_FILE, ALT_MANIFEST_FILE]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

fn compile_patterns(template: &str, patterns: &[String]) -> TemplateResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| TemplateError::InvalidPattern {
                template: template.to_string(),
                source,
            })
        })
        .collect()
}

fn is_excluded(relative: &Path, excludes: &[Pattern]) -> bool {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    excludes
        .iter()
        .any(|pattern| pattern.matches_path_with(relative, options))
}

/// Files under `root` in sorted path order.
fn walk_files(root: &Path, skip_manifest: bool, excludes: &[Pattern]) -> Vec<TemplateFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        if skip_manifest && (relative == Path::new(MANIFEST_FILE) || relative == Path::new(ALT_MANIFEST_FILE)) {
            continue;
        }
        if is_excluded(relative, excludes) {
            debug!("Excluded: {:?}", relative);
            continue;
        }

        files.push(TemplateFile {
            source_path: relative.to_path_buf(),
            is_binary: is_binary_file(entry.path()),
            sniffed: true,
        });
    }

    files
}

fn declared_files(
    template: &str,
    root: &Path,
    definition: &TemplateDefinition,
    excludes: &[Pattern],
) -> TemplateResult<Vec<TemplateFile>> {
    let mut files: Vec<TemplateFile> = Vec::with_capacity(definition.files.len());

    for spec in &definition.files {
        let relative = PathBuf::from(&spec.path);
        if !is_contained(&relative) {
            return Err(TemplateError::InvalidManifest {
                template: template.to_string(),
                message: format!("file '{}' must be a relative path inside the template", spec.path),
            });
        }
        if files.iter().any(|f| f.source_path == relative) {
            return Err(TemplateError::InvalidManifest {
                template: template.to_string(),
                message: format!("file '{}' is declared twice", spec.path),
            });
        }
        if is_excluded(&relative, excludes) {
            debug!("Excluded: {:?}", relative);
            continue;
        }

        let is_binary = spec
            .binary
            .unwrap_or_else(|| is_binary_file(&root.join(&relative)));
        files.push(TemplateFile {
            source_path: relative,
            is_binary,
            sniffed: spec.binary.is_none(),
        });
    }

    Ok(files)
}

/// Guess whether a file must be copied verbatim.
///
/// Readable files are sniffed: a NUL byte or invalid UTF-8 in the first
/// 8 KiB marks them binary. Unreadable files fall back to their extension.
///
/// Bytes past the sniff window are not inspected. A file that only turns
/// out not to be UTF-8 later on is copied verbatim by the materializer.
pub fn is_binary_file(path: &Path) -> bool {
    match sniff(path) {
        Some(prefix) => looks_binary(&prefix),
        None => has_binary_extension(path),
    }
}

fn sniff(path: &Path) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut prefix).ok()?;
    Some(prefix)
}

fn looks_binary(prefix: &[u8]) -> bool {
    if prefix.contains(&0) {
        return true;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => false,
        // A multi-byte character cut off by the sniff window is still text.
        Err(e) => e.error_len().is_some(),
    }
}

fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}
