//! The validate-then-generate pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use appforge_spec::{
    resolve_data, ApplicationSpec, SpecReader, SpecValidator, VariableValue, Variables,
    BUILTIN_APP_NAME, BUILTIN_APP_VERSION,
};
use appforge_templates::{Materializer, TemplateManifest, TemplateRegistry};

use crate::config::ForgeConfig;
use crate::error::{CoreError, CoreResult};
use crate::report::{GenerateReport, ValidateReport};

/// Options for [`Compiler::generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Template id; falls back to the configured default, then to the spec
    /// dialect's default.
    pub template: Option<String>,
    /// Replace files that already exist.
    pub overwrite: bool,
    /// Parent directory of the generated app, instead of the configured one.
    pub output: Option<PathBuf>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Reads specs, validates them and renders templates from them.
pub struct Compiler {
    config: ForgeConfig,
    specs: SpecReader,
    validator: SpecValidator,
    registry: Arc<TemplateRegistry>,
    materializer: Materializer,
}

impl Compiler {
    /// Open the template registry named by `config` and build a compiler.
    pub fn open(config: ForgeConfig) -> CoreResult<Self> {
        let registry = TemplateRegistry::open(&config.templates_dir)?;
        Ok(Self::with_registry(config, Arc::new(registry)))
    }

    /// Build a compiler around an already opened registry.
    pub fn with_registry(config: ForgeConfig, registry: Arc<TemplateRegistry>) -> Self {
        Self {
            specs: SpecReader::new(&config.specs_dir),
            validator: SpecValidator::with_options(config.validator_options()),
            materializer: Materializer::new(config.max_open_files),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Validate `<specs_dir>/<spec_name>.json`.
    ///
    /// A missing or unreadable file is an error; an invalid document is not.
    pub fn validate(&self, spec_name: &str) -> CoreResult<ValidateReport> {
        let (report, _) = load_spec(&self.specs, &self.validator, spec_name)?;
        Ok(report)
    }

    /// Validate the spec named `app_name` and, when it is valid, render its
    /// template into `<output>/<app_name>`.
    ///
    /// A trailing `.json` on `app_name` is dropped. Nothing is written for an
    /// invalid spec.
    pub async fn generate(&self, app_name: &str, options: &GenerateOptions) -> CoreResult<GenerateReport> {
        let app_name = SpecReader::spec_name(app_name)?;
        let (validation, spec) = load_spec(&self.specs, &self.validator, app_name)?;
        let destination = options
            .output
            .as_ref()
            .unwrap_or(&self.config.output_dir)
            .join(app_name);

        let Some(spec) = spec else {
            info!("Spec {} is invalid, nothing generated", app_name);
            return Ok(GenerateReport {
                app_name: app_name.to_string(),
                validation: validation.result,
                template: None,
                destination,
                operations: Vec::new(),
            });
        };

        if destination.exists() && !destination.is_dir() {
            return Err(CoreError::OutputNotDirectory(destination));
        }

        let dialect = spec.dialect();
        let template_id = options
            .template
            .as_deref()
            .or(self.config.default_template.as_deref())
            .unwrap_or(dialect.default_template());
        let manifest = self.registry.load(template_id)?;

        info!(
            "Generating {} with template {} (dialect {}) into {:?}",
            app_name, manifest.id, dialect, destination
        );

        let variables = template_variables(&spec);
        let mut operations = self
            .materializer
            .materialize(&manifest, &destination, &variables, options.overwrite)
            .await;

        let routes_file = routes_file(&manifest, &spec);
        let metadata = serde_json::to_vec_pretty(&route_metadata(&spec, &variables))?;
        if manifest.files.iter().any(|f| f.source_path == routes_file) {
            warn!(
                "Template {} ships {:?}; route metadata follows the same overwrite policy",
                manifest.id, routes_file
            );
        }
        operations.push(
            self.materializer
                .emit(&destination, &routes_file, with_newline(metadata), options.overwrite)
                .await,
        );

        Ok(GenerateReport {
            app_name: app_name.to_string(),
            validation: validation.result,
            template: Some(manifest.id.clone()),
            destination,
            operations,
        })
    }

    /// Release the registry.
    pub fn close(self) {
        match Arc::try_unwrap(self.registry) {
            Ok(registry) => registry.close(),
            Err(_) => debug!("Template registry still shared, leaving it open"),
        }
    }
}

/// Validate `<specs_dir>/<spec_name>.json` without opening the template
/// registry.
pub fn validate_spec(config: &ForgeConfig, spec_name: &str) -> CoreResult<ValidateReport> {
    let specs = SpecReader::new(&config.specs_dir);
    let validator = SpecValidator::with_options(config.validator_options());
    let (report, _) = load_spec(&specs, &validator, spec_name)?;
    Ok(report)
}

fn load_spec(
    specs: &SpecReader,
    validator: &SpecValidator,
    name: &str,
) -> CoreResult<(ValidateReport, Option<ApplicationSpec>)> {
    let spec_path = specs.spec_path(name)?;
    let raw = specs.read(name)?;
    let (result, spec) = validator.parse(&raw);

    debug!(
        "Validated {:?}: {} errors, {} warnings",
        spec_path,
        result.errors.len(),
        result.warnings.len()
    );

    let report = ValidateReport {
        spec_path,
        application: spec.as_ref().map(|s| s.application.clone()),
        route_count: spec.as_ref().map(ApplicationSpec::route_count).unwrap_or(0),
        result,
    };
    Ok((report, spec))
}

/// Variables available to templates: built-ins overlaid by declarations.
pub fn template_variables(spec: &ApplicationSpec) -> Variables {
    let mut variables = Variables::new();
    variables.insert(
        BUILTIN_APP_NAME.to_string(),
        VariableValue::from(spec.application.name.as_str()),
    );
    variables.insert(
        BUILTIN_APP_VERSION.to_string(),
        VariableValue::from(spec.application.version.as_str()),
    );
    variables.extend(spec.variables.clone());
    variables
}

/// The route metadata document, with every variable substituted.
pub fn route_metadata(spec: &ApplicationSpec, variables: &Variables) -> Value {
    let routes: Vec<Value> = spec
        .data
        .routes
        .iter()
        .map(|route| {
            let roles = spec.data.permissions.get(&route.path).cloned().unwrap_or_default();
            json!({
                "path": route.path,
                "protected": route.protected,
                "roles": roles,
                "component": route.component,
                "dataBindings": route.data_bindings,
            })
        })
        .collect();

    let document = json!({
        "application": spec.application,
        "dialect": spec.dialect().to_string(),
        "routes": routes,
        "components": spec.data.components,
    });
    resolve_data(&document, variables)
}

fn routes_file(manifest: &TemplateManifest, spec: &ApplicationSpec) -> PathBuf {
    manifest
        .routes_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(spec.dialect().route_metadata_file()))
}

fn with_newline(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.push(b'\n');
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use appforge_spec::{ApplicationInfo, CompilerInfo, ComponentNode, ComponentRef, RouteSpec, SpecData};
    use std::collections::BTreeMap;

    fn spec() -> ApplicationSpec {
        let mut variables = Variables::new();
        variables.insert("TITLE".to_string(), "Acme".into());

        let mut permissions = BTreeMap::new();
        permissions.insert("/admin".to_string(), vec!["admin".to_string()]);

        ApplicationSpec {
            application: ApplicationInfo {
                name: "acme".to_string(),
                version: "1.2.0".to_string(),
            },
            compiler: CompilerInfo {
                id: "appforge".to_string(),
                version: "1.0.0".to_string(),
            },
            variables,
            data: SpecData {
                routes: vec![
                    RouteSpec {
                        path: "/".to_string(),
                        component: ComponentRef::Inline(
                            ComponentNode::new("Page").with_prop("title", "${{TITLE}} Home"),
                        ),
                        protected: false,
                        data_bindings: Vec::new(),
                    },
                    RouteSpec {
                        path: "/admin".to_string(),
                        component: ComponentRef::Named("Dashboard".to_string()),
                        protected: true,
                        data_bindings: Vec::new(),
                    },
                ],
                components: BTreeMap::from([("Dashboard".to_string(), ComponentNode::new("Grid"))]),
                permissions,
            },
        }
    }

    #[test]
    fn test_declarations_override_builtins() {
        let mut spec = spec();
        spec.variables.insert(BUILTIN_APP_NAME.to_string(), "Custom".into());

        let variables = template_variables(&spec);
        assert_eq!(variables[BUILTIN_APP_NAME].to_string(), "Custom");
        assert_eq!(variables[BUILTIN_APP_VERSION].to_string(), "1.2.0");
        assert_eq!(variables["TITLE"].to_string(), "Acme");
    }

    #[test]
    fn test_route_metadata() {
        let spec = spec();
        let metadata = route_metadata(&spec, &template_variables(&spec));

        assert_eq!(metadata["dialect"], "v1");
        assert_eq!(metadata["routes"][0]["component"]["props"]["title"], "Acme Home");
        assert_eq!(metadata["routes"][1]["protected"], true);
        assert_eq!(metadata["routes"][1]["roles"], json!(["admin"]));
        assert_eq!(metadata["routes"][1]["component"], "Dashboard");
        assert_eq!(metadata["components"]["Dashboard"]["type"], "Grid");
    }

    #[test]
    fn test_generate_options_builder() {
        let options = GenerateOptions::new()
            .with_template("classic")
            .with_overwrite(true)
            .with_output("/tmp/out");
        assert_eq!(options.template.as_deref(), Some("classic"));
        assert!(options.overwrite);
        assert_eq!(options.output, Some(PathBuf::from("/tmp/out")));
    }
}
