//! Writing templates into an output directory.
//!
//! Each template file becomes one [`FileOperation`]. Text files have their
//! `${{NAME}}` tokens substituted; binary files are copied byte for byte.
//! A file's content is rendered fully in memory and written through a
//! temporary file that is renamed into place, so no single file is ever left
//! half-written.
//!
//! Files are processed concurrently on blocking tasks, with at most
//! `max_open_files` in flight. Results are always returned in manifest order.
//!
//! There is no rollback: when a run is interrupted, files already written
//! stay on disk. Running again with `overwrite = false` skips them and
//! completes the rest.

use std::fmt;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use appforge_spec::{substitute, Variables};

use crate::manifest::TemplateManifest;

/// Default cap on files processed at the same time.
pub const DEFAULT_MAX_OPEN_FILES: usize = 16;

/// Why a single file could not be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    SourceMissing,
    PermissionDenied,
    InvalidText,
    Io,
}

impl FileErrorKind {
    fn from_io(e: &io::Error) -> Self {
        match e.kind() {
            ErrorKind::NotFound => FileErrorKind::SourceMissing,
            ErrorKind::PermissionDenied => FileErrorKind::PermissionDenied,
            _ => FileErrorKind::Io,
        }
    }
}

/// What happened to one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Created,
    Overwritten,
    /// The destination already existed and overwriting was not allowed.
    Skipped,
    Failed { kind: FileErrorKind, message: String },
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Created => f.write_str("created"),
            FileOutcome::Overwritten => f.write_str("overwritten"),
            FileOutcome::Skipped => f.write_str("skipped (already exists)"),
            FileOutcome::Failed { message, .. } => write!(f, "failed: {}", message),
        }
    }
}

/// One output file and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOperation {
    /// Path relative to the output directory.
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileOperation {
    fn failed(path: PathBuf, kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            outcome: FileOutcome::Failed {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed { .. })
    }
}

/// Tally of outcomes over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounts {
    pub created: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OperationCounts {
    pub fn tally(operations: &[FileOperation]) -> Self {
        let mut counts = Self::default();
        for op in operations {
            match op.outcome {
                FileOutcome::Created => counts.created += 1,
                FileOutcome::Overwritten => counts.overwritten += 1,
                FileOutcome::Skipped => counts.skipped += 1,
                FileOutcome::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }
}

/// Content source of a single write.
enum Payload {
    /// Template file on disk, rendered unless binary.
    Template {
        source: PathBuf,
        is_binary: bool,
        sniffed: bool,
    },
    /// Content generated in memory.
    Generated(Vec<u8>),
}

struct FileJob {
    relative: PathBuf,
    target: PathBuf,
    payload: Payload,
    variables: Arc<Variables>,
    overwrite: bool,
}

/// Renders templates into output directories.
#[derive(Debug, Clone)]
pub struct Materializer {
    limit: Arc<Semaphore>,
    max_open_files: usize,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OPEN_FILES)
    }
}

impl Materializer {
    pub fn new(max_open_files: usize) -> Self {
        let max_open_files = max_open_files.max(1);
        Self {
            limit: Arc::new(Semaphore::new(max_open_files)),
            max_open_files,
        }
    }

    pub fn max_open_files(&self) -> usize {
        self.max_open_files
    }

    /// Render every file of `manifest` under `destination`.
    pub async fn materialize(
        &self,
        manifest: &TemplateManifest,
        destination: &Path,
        variables: &Variables,
        overwrite: bool,
    ) -> Vec<FileOperation> {
        info!(
            "Materializing template {} into {:?} ({} files)",
            manifest.id,
            destination,
            manifest.file_count()
        );

        let variables = Arc::new(variables.clone());
        let jobs = manifest
            .files
            .iter()
            .map(|file| FileJob {
                relative: file.source_path.clone(),
                target: destination.join(&file.source_path),
                payload: Payload::Template {
                    source: manifest.source_of(file),
                    is_binary: file.is_binary,
                    sniffed: file.sniffed,
                },
                variables: Arc::clone(&variables),
                overwrite,
            })
            .collect();

        let operations = self.run(jobs).await;

        let counts = OperationCounts::tally(&operations);
        info!(
            created = counts.created,
            overwritten = counts.overwritten,
            skipped = counts.skipped,
            failed = counts.failed,
            "Materialized template {}",
            manifest.id
        );
        operations
    }

    /// Write generated `contents` to `destination/relative` under the same
    /// conflict policy as template files.
    pub async fn emit(
        &self,
        destination: &Path,
        relative: &Path,
        contents: Vec<u8>,
        overwrite: bool,
    ) -> FileOperation {
        let job = FileJob {
            relative: relative.to_path_buf(),
            target: destination.join(relative),
            payload: Payload::Generated(contents),
            variables: Arc::default(),
            overwrite,
        };
        let relative = job.relative.clone();

        self.run(vec![job]).await.pop().unwrap_or_else(|| {
            FileOperation::failed(relative, FileErrorKind::Io, "write task did not complete")
        })
    }

    async fn run(&self, jobs: Vec<FileJob>) -> Vec<FileOperation> {
        let paths: Vec<PathBuf> = jobs.iter().map(|j| j.relative.clone()).collect();
        let mut results: Vec<Option<FileOperation>> = vec![None; jobs.len()];
        let mut tasks = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let permit = match Arc::clone(&self.limit).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    results[index] = Some(FileOperation::failed(
                        job.relative,
                        FileErrorKind::Io,
                        "file limiter closed",
                    ));
                    continue;
                }
            };
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, write_file(job))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, operation)) => results[index] = Some(operation),
                Err(e) => warn!("File task failed: {}", e),
            }
        }

        results
            .into_iter()
            .zip(paths)
            .map(|(result, path)| {
                result.unwrap_or_else(|| FileOperation::failed(path, FileErrorKind::Io, "write task did not complete"))
            })
            .collect()
    }
}

fn write_file(job: FileJob) -> FileOperation {
    let FileJob {
        relative,
        target,
        payload,
        variables,
        overwrite,
    } = job;

    let existed = target.exists();
    if existed && !overwrite {
        debug!("Skipped (exists): {:?}", relative);
        return FileOperation {
            path: relative,
            outcome: FileOutcome::Skipped,
        };
    }

    let (contents, permissions) = match render(payload, &variables) {
        Ok(rendered) => rendered,
        Err((kind, message)) => return FileOperation::failed(relative, kind, message),
    };

    match persist(&target, &contents, permissions, overwrite) {
        Ok(true) => {
            let outcome = if existed {
                FileOutcome::Overwritten
            } else {
                FileOutcome::Created
            };
            debug!("{}: {:?}", outcome, relative);
            FileOperation { path: relative, outcome }
        }
        // Another writer created the file after the existence check.
        Ok(false) => FileOperation {
            path: relative,
            outcome: FileOutcome::Skipped,
        },
        Err(e) => {
            let kind = match e.kind() {
                ErrorKind::PermissionDenied => FileErrorKind::PermissionDenied,
                _ => FileErrorKind::Io,
            };
            FileOperation::failed(relative, kind, format!("cannot write: {}", e))
        }
    }
}

/// Produce the bytes to write and the permissions the file should carry.
fn render(payload: Payload, variables: &Variables) -> Result<(Vec<u8>, Option<fs::Permissions>), (FileErrorKind, String)> {
    match payload {
        Payload::Generated(contents) => Ok((contents, None)),
        Payload::Template {
            source,
            is_binary,
            sniffed,
        } => {
            let read_failed = |e: io::Error| {
                let kind = FileErrorKind::from_io(&e);
                let message = match kind {
                    FileErrorKind::SourceMissing => format!("source file missing: {}", source.display()),
                    _ => format!("cannot read {}: {}", source.display(), e),
                };
                (kind, message)
            };

            let permissions = fs::metadata(&source).map_err(read_failed)?.permissions();
            let bytes = fs::read(&source).map_err(read_failed)?;

            if is_binary {
                return Ok((bytes, Some(permissions)));
            }

            match String::from_utf8(bytes) {
                Ok(text) => Ok((substitute(&text, variables).into_bytes(), Some(permissions))),
                Err(e) if sniffed => {
                    warn!("{} is not valid UTF-8 past its first 8 KiB, copied verbatim", source.display());
                    Ok((e.into_bytes(), Some(permissions)))
                }
                Err(_) => Err((
                    FileErrorKind::InvalidText,
                    format!("{} is not valid UTF-8; mark it binary", source.display()),
                )),
            }
        }
    }
}

/// Atomically place `contents` at `target`.
///
/// Returns `Ok(false)` when `overwrite` is off and the target appeared in the
/// meantime.
fn persist(target: &Path, contents: &[u8], permissions: Option<fs::Permissions>, overwrite: bool) -> io::Result<bool> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "output path has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(contents)?;
    staged.flush()?;
    if let Some(permissions) = permissions.or_else(default_permissions) {
        fs::set_permissions(staged.path(), permissions)?;
    }

    if overwrite {
        staged.persist(target).map_err(|e| e.error)?;
        return Ok(true);
    }

    match staged.persist_noclobber(target) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

/// Temp files are created owner-only; generated files get the usual mode.
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::TemplateLoader;
    use crate::manifest::TemplateFile;
    use tempfile::tempdir;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs.iter().map(|(k, v)| (k.to_string(), (*v).into())).collect()
    }

    #[tokio::test]
    async fn test_text_is_rendered_binary_is_copied() {
        let source = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(source.path().join("index.html"), "<h1>${{TITLE}}</h1>").unwrap();
        fs::write(source.path().join("raw.bin"), b"${{TITLE}}\0").unwrap();

        let manifest = TemplateManifest::new(
            "t",
            source.path(),
            vec![TemplateFile::text("index.html"), TemplateFile::binary("raw.bin")],
        );
        let ops = Materializer::default()
            .materialize(&manifest, out.path(), &vars(&[("TITLE", "Acme")]), false)
            .await;

        assert!(ops.iter().all(|op| op.outcome == FileOutcome::Created));
        assert_eq!(fs::read_to_string(out.path().join("index.html")).unwrap(), "<h1>Acme</h1>");
        assert_eq!(fs::read(out.path().join("raw.bin")).unwrap(), b"${{TITLE}}\0");
    }

    #[tokio::test]
    async fn test_overwrite_policy() {
        let source = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(source.path().join("a.txt"), "new").unwrap();
        fs::write(out.path().join("a.txt"), "old").unwrap();

        let manifest = TemplateManifest::new("t", source.path(), vec![TemplateFile::text("a.txt")]);
        let materializer = Materializer::new(1);

        let ops = materializer.materialize(&manifest, out.path(), &Variables::new(), false).await;
        assert_eq!(ops[0].outcome, FileOutcome::Skipped);
        assert_eq!(fs::read_to_string(out.path().join("a.txt")).unwrap(), "old");

        let ops = materializer.materialize(&manifest, out.path(), &Variables::new(), true).await;
        assert_eq!(ops[0].outcome, FileOutcome::Overwritten);
        assert_eq!(fs::read_to_string(out.path().join("a.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_fails_that_file() {
        let source = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(source.path().join("latin1.txt"), [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let manifest = TemplateManifest::new("t", source.path(), vec![TemplateFile::text("latin1.txt")]);
        let ops = Materializer::default()
            .materialize(&manifest, out.path(), &Variables::new(), false)
            .await;

        match &ops[0].outcome {
            FileOutcome::Failed { kind, .. } => assert_eq!(*kind, FileErrorKind::InvalidText),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!out.path().join("latin1.txt").exists());
    }

    #[tokio::test]
    async fn test_late_invalid_utf8_in_walked_file_is_copied_verbatim() {
        let source = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut contents = b"${{TITLE}}\n".repeat(1024);
        contents.push(0xff);
        fs::write(source.path().join("bundle.txt"), &contents).unwrap();
        fs::write(source.path().join("template.yaml"), "name: Bundle\n").unwrap();

        let manifest = TemplateLoader::new(source.path()).load_template(source.path()).unwrap();
        assert!(manifest.files[0].sniffed);
        assert!(!manifest.files[0].is_binary);

        let ops = Materializer::default()
            .materialize(&manifest, out.path(), &Variables::new(), false)
            .await;

        assert_eq!(ops[0].outcome, FileOutcome::Created);
        assert_eq!(fs::read(out.path().join("bundle.txt")).unwrap(), contents);
    }

    #[tokio::test]
    async fn test_emit_generated_file() {
        let out = tempdir().unwrap();
        let materializer = Materializer::default();

        let op = materializer
            .emit(out.path(), Path::new("meta/routes.json"), b"[]".to_vec(), false)
            .await;
        assert_eq!(op.outcome, FileOutcome::Created);
        assert_eq!(op.path, Path::new("meta/routes.json"));

        let op = materializer
            .emit(out.path(), Path::new("meta/routes.json"), b"[1]".to_vec(), false)
            .await;
        assert_eq!(op.outcome, FileOutcome::Skipped);
        assert_eq!(fs::read(out.path().join("meta/routes.json")).unwrap(), b"[]");
    }

    #[test]
    fn test_tally() {
        let ops = vec![
            FileOperation { path: "a".into(), outcome: FileOutcome::Created },
            FileOperation { path: "b".into(), outcome: FileOutcome::Skipped },
            FileOperation::failed("c".into(), FileErrorKind::SourceMissing, "gone"),
        ];
        let counts = OperationCounts::tally(&ops);
        assert_eq!(counts, OperationCounts { created: 1, overwritten: 0, skipped: 1, failed: 1 });
        assert!(ops[2].is_failure());
        assert_eq!(ops[1].outcome.to_string(), "skipped (already exists)");
    }
}
