//! Registry of available templates.
//!
//! The registry is opened once by its owner, scanned eagerly, and never
//! mutated afterwards. Share it as `Arc<TemplateRegistry>`; lookups hand out
//! `Arc<TemplateManifest>` so callers never copy file lists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{TemplateError, TemplateResult};
use crate::loader::TemplateLoader;
use crate::manifest::TemplateManifest;

/// Registry of available templates.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates_path: PathBuf,
    order: Vec<String>,
    templates: HashMap<String, Arc<TemplateManifest>>,
}

impl TemplateRegistry {
    /// Scan `templates_path` and build the registry.
    pub fn open(templates_path: impl Into<PathBuf>) -> TemplateResult<Self> {
        let templates_path = templates_path.into();
        let manifests = TemplateLoader::new(&templates_path).load_all()?;
        let registry = Self::from_manifests(templates_path, manifests);
        info!(
            "Opened template registry at {:?} ({} templates)",
            registry.templates_path,
            registry.order.len()
        );
        Ok(registry)
    }

    /// Build a registry from already-loaded manifests, keeping their order.
    ///
    /// When two manifests share an id, the first one wins.
    pub fn from_manifests(templates_path: impl Into<PathBuf>, manifests: Vec<TemplateManifest>) -> Self {
        let mut registry = Self {
            templates_path: templates_path.into(),
            ..Default::default()
        };

        for manifest in manifests {
            if registry.templates.contains_key(&manifest.id) {
                warn!("Duplicate template id '{}', keeping the first definition", manifest.id);
                continue;
            }
            registry.order.push(manifest.id.clone());
            registry.templates.insert(manifest.id.clone(), Arc::new(manifest));
        }

        registry
    }

    /// Template ids in stable order.
    pub fn list_templates(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Look up a template by id.
    pub fn load(&self, id: &str) -> TemplateResult<Arc<TemplateManifest>> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// Check if a template exists.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// All manifests, in listing order.
    pub fn manifests(&self) -> impl Iterator<Item = &TemplateManifest> {
        self.order
            .iter()
            .filter_map(|id| self.templates.get(id))
            .map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Release the registry. Outstanding manifest handles stay valid.
    pub fn close(self) {
        debug!("Closing template registry at {:?}", self.templates_path);
    }
}
