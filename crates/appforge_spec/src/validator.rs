//! Structural validation of application specs.
//!
//! The validator walks the raw JSON document rather than deserializing it
//! straight into [`ApplicationSpec`], so that every violation can be reported
//! with its location and all of them surface in a single pass.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dialect::SpecDialect;
use crate::models::{ApplicationSpec, CompilerInfo, HttpMethod, VariableValue, Variables};
use crate::path::{self, ROOT};
use crate::variables::{is_builtin_variable, is_variable_name, resolve_references};

const TOP_LEVEL_FIELDS: &[&str] = &["application", "compiler", "variables", "data"];
const ROUTE_FIELDS: &[&str] = &["path", "component", "protected", "dataBindings"];

/// A single finding, located by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validation result with details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationIssue::new(path, message));
    }

    pub fn add_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(path, message));
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// How undeclared variable references are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    #[default]
    Warn,
    Error,
}

/// Knobs for [`SpecValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub missing_variables: ReferencePolicy,
    pub warn_unused_variables: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            missing_variables: ReferencePolicy::Warn,
            warn_unused_variables: true,
        }
    }
}

/// Validator for application spec documents.
#[derive(Debug, Clone, Default)]
pub struct SpecValidator {
    options: ValidatorOptions,
}

impl SpecValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Validate raw spec bytes.
    pub fn validate(&self, raw: &[u8]) -> ValidationResult {
        self.parse(raw).0
    }

    /// Validate raw spec bytes and, when they are valid, return the typed
    /// document alongside the result.
    pub fn parse(&self, raw: &[u8]) -> (ValidationResult, Option<ApplicationSpec>) {
        let document: Value = match serde_json::from_slice(raw) {
            Ok(value) => value,
            Err(e) => {
                let mut result = ValidationResult::new();
                result.add_error(ROOT, format!("document is not valid JSON: {}", e));
                return (result, None);
            }
        };

        let mut result = self.validate_value(&document);
        if !result.valid {
            return (result, None);
        }

        match serde_json::from_value::<ApplicationSpec>(document) {
            Ok(spec) => (result, Some(spec)),
            Err(e) => {
                result.add_error(ROOT, format!("document does not match the spec shape: {}", e));
                (result, None)
            }
        }
    }

    /// Validate an already-parsed document.
    pub fn validate_value(&self, document: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(root) = document.as_object() else {
            result.add_error(ROOT, format!("expected an object, found {}", kind(document)));
            return result;
        };

        for key in root.keys() {
            if !TOP_LEVEL_FIELDS.contains(&key.as_str()) {
                result.add_warning(path::key(ROOT, key), "unknown field is ignored");
            }
        }

        Self::validate_application(root, &mut result);
        Self::validate_compiler(root, &mut result);
        let declared = Self::validate_variables(root, &mut result);

        if let Some(data) = required_object(root, ROOT, "data", &mut result) {
            Self::validate_data(data, &mut result);
            if let Some(declared) = &declared {
                self.check_references(&root["data"], declared, &mut result);
            }
        }

        debug!(
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Validated spec document"
        );
        result
    }

    fn validate_application(root: &Map<String, Value>, result: &mut ValidationResult) {
        let at = path::key(ROOT, "application");
        if let Some(app) = required_object(root, ROOT, "application", result) {
            required_non_empty_string(app, &at, "name", result);
            required_non_empty_string(app, &at, "version", result);
        }
    }

    fn validate_compiler(root: &Map<String, Value>, result: &mut ValidationResult) {
        let at = path::key(ROOT, "compiler");
        let Some(compiler) = required_object(root, ROOT, "compiler", result) else {
            return;
        };

        let id = required_non_empty_string(compiler, &at, "id", result);
        let version = required_non_empty_string(compiler, &at, "version", result);

        if let (Some(id), Some(version)) = (id, version) {
            let info = CompilerInfo {
                id: id.to_string(),
                version: version.to_string(),
            };
            if let Err(reason) = SpecDialect::detect(&info) {
                result.add_warning(at, reason);
            }
        }
    }

    /// Returns the usable declarations, or `None` when `variables` is absent
    /// or not an object.
    fn validate_variables(root: &Map<String, Value>, result: &mut ValidationResult) -> Option<Variables> {
        let at = path::key(ROOT, "variables");
        let variables = required_object(root, ROOT, "variables", result)?;

        let mut declared = Variables::new();
        for (name, value) in variables {
            let var_path = path::key(&at, name);
            if !is_variable_name(name) {
                result.add_warning(
                    &var_path,
                    format!(
                        "variable '{}' can never be referenced; names may only contain letters, digits and underscores",
                        name
                    ),
                );
            }
            match VariableValue::from_json(value) {
                Some(v) => {
                    declared.insert(name.clone(), v);
                }
                None => result.add_error(
                    var_path,
                    format!("expected a string, number or boolean, found {}", kind(value)),
                ),
            }
        }
        Some(declared)
    }

    fn validate_data(data: &Map<String, Value>, result: &mut ValidationResult) {
        let at = path::key(ROOT, "data");

        let components = match data.get("components") {
            None => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                result.add_error(
                    path::key(&at, "components"),
                    format!("expected an object, found {}", kind(other)),
                );
                None
            }
        };

        if let Some(components) = components {
            let components_path = path::key(&at, "components");
            for (name, node) in components {
                validate_node(node, &path::key(&components_path, name), result);
            }
            Self::check_component_cycles(components, &components_path, result);
        }

        let mut route_paths: Vec<&str> = Vec::new();
        let routes_path = path::key(&at, "routes");
        match data.get("routes") {
            None => result.add_error(&routes_path, "missing required field"),
            Some(Value::Array(routes)) => {
                let mut seen: HashMap<&str, usize> = HashMap::new();
                for (i, route) in routes.iter().enumerate() {
                    let route_at = path::index(&routes_path, i);
                    if let Some(route_path) = Self::validate_route(route, &route_at, components, result) {
                        match seen.get(route_path).copied() {
                            Some(first) => result.add_error(
                                path::key(&route_at, "path"),
                                format!(
                                    "duplicate route path '{}' (routes[{}] and routes[{}])",
                                    route_path, first, i
                                ),
                            ),
                            None => {
                                seen.insert(route_path, i);
                            }
                        }
                        route_paths.push(route_path);
                    }
                }
            }
            Some(other) => result.add_error(&routes_path, format!("expected an array, found {}", kind(other))),
        }

        match data.get("permissions") {
            None => {}
            Some(Value::Object(permissions)) => {
                let permissions_path = path::key(&at, "permissions");
                for (route, roles) in permissions {
                    let rule_at = path::key(&permissions_path, route);
                    if !route_paths.contains(&route.as_str()) {
                        result.add_warning(&rule_at, format!("no route is declared with path '{}'", route));
                    }
                    match roles {
                        Value::Array(items) => {
                            for (i, role) in items.iter().enumerate() {
                                if !role.is_string() {
                                    result.add_error(
                                        path::index(&rule_at, i),
                                        format!("expected a role name, found {}", kind(role)),
                                    );
                                }
                            }
                        }
                        other => result.add_error(rule_at, format!("expected an array of roles, found {}", kind(other))),
                    }
                }
            }
            Some(other) => result.add_error(
                path::key(&at, "permissions"),
                format!("expected an object, found {}", kind(other)),
            ),
        }
    }

    /// Validate one route; returns its path when it is a usable string.
    fn validate_route<'a>(
        route: &'a Value,
        at: &str,
        components: Option<&Map<String, Value>>,
        result: &mut ValidationResult,
    ) -> Option<&'a str> {
        let Some(route) = route.as_object() else {
            result.add_error(at, format!("expected an object, found {}", kind(route)));
            return None;
        };

        for key in route.keys() {
            if !ROUTE_FIELDS.contains(&key.as_str()) {
                result.add_warning(path::key(at, key), "unknown field is ignored");
            }
        }

        let route_path = required_non_empty_string(route, at, "path", result);
        if let Some(p) = route_path {
            if !p.starts_with('/') {
                result.add_error(path::key(at, "path"), format!("route path '{}' must start with '/'", p));
            }
        }

        let component_at = path::key(at, "component");
        match route.get("component") {
            None => result.add_error(&component_at, "missing required field"),
            Some(Value::String(name)) if name.is_empty() => {
                result.add_error(&component_at, "must not be empty")
            }
            Some(Value::String(name)) => {
                if !components.is_some_and(|c| c.contains_key(name)) {
                    result.add_warning(
                        &component_at,
                        format!("unknown component '{}' is expected from the design system", name),
                    );
                }
            }
            Some(node @ Value::Object(_)) => validate_node(node, &component_at, result),
            Some(other) => result.add_error(
                &component_at,
                format!("expected a component name or node, found {}", kind(other)),
            ),
        }

        match route.get("protected") {
            None | Some(Value::Bool(_)) => {}
            Some(other) => result.add_error(
                path::key(at, "protected"),
                format!("expected a boolean, found {}", kind(other)),
            ),
        }

        let bindings_at = path::key(at, "dataBindings");
        match route.get("dataBindings") {
            None => {}
            Some(Value::Array(bindings)) => {
                for (i, binding) in bindings.iter().enumerate() {
                    validate_binding(binding, &path::index(&bindings_at, i), result);
                }
            }
            Some(other) => result.add_error(bindings_at, format!("expected an array, found {}", kind(other))),
        }

        route_path
    }

    /// Named components may reference each other by `type`, but never in a
    /// cycle.
    fn check_component_cycles(
        components: &Map<String, Value>,
        at: &str,
        result: &mut ValidationResult,
    ) {
        let edges: HashMap<&str, Vec<&str>> = components
            .iter()
            .map(|(name, node)| {
                let mut refs = Vec::new();
                collect_component_refs(node, components, &mut refs);
                (name.as_str(), refs)
            })
            .collect();

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit<'a>(
            name: &'a str,
            edges: &HashMap<&'a str, Vec<&'a str>>,
            marks: &mut HashMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
            cycles: &mut Vec<Vec<&'a str>>,
        ) {
            marks.insert(name, Mark::InProgress);
            stack.push(name);

            for &next in edges.get(name).into_iter().flatten() {
                match marks.get(next).copied().unwrap_or(Mark::Unvisited) {
                    Mark::Unvisited => visit(next, edges, marks, stack, cycles),
                    Mark::InProgress => {
                        if let Some(start) = stack.iter().position(|n| *n == next) {
                            let mut cycle = stack[start..].to_vec();
                            cycle.push(next);
                            cycles.push(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }

            stack.pop();
            marks.insert(name, Mark::Done);
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut cycles = Vec::new();
        for name in components.keys() {
            if marks.get(name.as_str()).copied().unwrap_or(Mark::Unvisited) == Mark::Unvisited {
                visit(name, &edges, &mut marks, &mut Vec::new(), &mut cycles);
            }
        }

        for cycle in cycles {
            result.add_error(
                path::key(at, cycle[0]),
                format!("circular component reference: {}", cycle.join(" -> ")),
            );
        }
    }

    fn check_references(&self, data: &Value, declared: &Variables, result: &mut ValidationResult) {
        let report = resolve_references(data, declared);

        for name in &report.missing_variables {
            if is_builtin_variable(name) {
                continue;
            }
            let at = report
                .graph
                .usages(name)
                .first()
                .cloned()
                .unwrap_or_else(|| path::key(ROOT, "data"));
            let message = format!("variable '{}' is referenced but not declared", name);
            match self.options.missing_variables {
                ReferencePolicy::Warn => result.add_warning(at, message),
                ReferencePolicy::Error => result.add_error(at, message),
            }
        }

        if self.options.warn_unused_variables {
            let variables_path = path::key(ROOT, "variables");
            for name in &report.unused_variables {
                if !is_variable_name(name) {
                    continue;
                }
                result.add_warning(
                    path::key(&variables_path, name),
                    format!("variable '{}' is declared but never referenced", name),
                );
            }
        }
    }
}

fn validate_node(node: &Value, at: &str, result: &mut ValidationResult) {
    let Some(node) = node.as_object() else {
        result.add_error(at, format!("expected a component node, found {}", kind(node)));
        return;
    };

    required_non_empty_string(node, at, "type", result);

    match node.get("props") {
        None | Some(Value::Object(_)) => {}
        Some(other) => result.add_error(path::key(at, "props"), format!("expected an object, found {}", kind(other))),
    }

    let children_at = path::key(at, "children");
    match node.get("children") {
        None => {}
        Some(Value::Array(children)) => {
            for (i, child) in children.iter().enumerate() {
                validate_node(child, &path::index(&children_at, i), result);
            }
        }
        Some(other) => result.add_error(children_at, format!("expected an array, found {}", kind(other))),
    }
}

fn validate_binding(binding: &Value, at: &str, result: &mut ValidationResult) {
    let Some(binding) = binding.as_object() else {
        result.add_error(at, format!("expected an object, found {}", kind(binding)));
        return;
    };

    required_non_empty_string(binding, at, "url", result);

    match binding.get("method") {
        None => {}
        Some(Value::String(method)) => {
            if HttpMethod::parse(method).is_none() {
                result.add_error(path::key(at, "method"), format!("unsupported HTTP method '{}'", method));
            }
        }
        Some(other) => result.add_error(path::key(at, "method"), format!("expected a string, found {}", kind(other))),
    }

    match binding.get("name") {
        None | Some(Value::String(_)) => {}
        Some(other) => result.add_error(path::key(at, "name"), format!("expected a string, found {}", kind(other))),
    }
}

/// Collect names of components referenced anywhere under `node`.
fn collect_component_refs<'a>(node: &'a Value, components: &Map<String, Value>, out: &mut Vec<&'a str>) {
    let Some(node) = node.as_object() else {
        return;
    };
    if let Some(Value::String(node_type)) = node.get("type") {
        if components.contains_key(node_type) && !out.contains(&node_type.as_str()) {
            out.push(node_type);
        }
    }
    if let Some(Value::Array(children)) = node.get("children") {
        for child in children {
            collect_component_refs(child, components, out);
        }
    }
}

fn required_object<'a>(
    parent: &'a Map<String, Value>,
    parent_path: &str,
    field: &str,
    result: &mut ValidationResult,
) -> Option<&'a Map<String, Value>> {
    let at = path::key(parent_path, field);
    match parent.get(field) {
        None => {
            result.add_error(at, "missing required field");
            None
        }
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            result.add_error(at, format!("expected an object, found {}", kind(other)));
            None
        }
    }
}

fn required_non_empty_string<'a>(
    parent: &'a Map<String, Value>,
    parent_path: &str,
    field: &str,
    result: &mut ValidationResult,
) -> Option<&'a str> {
    let at = path::key(parent_path, field);
    match parent.get(field) {
        None => {
            result.add_error(at, "missing required field");
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            result.add_error(at, "must not be empty");
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            result.add_error(at, format!("expected a string, found {}", kind(other)));
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "application": { "name": "acme-site", "version": "1.0.0" },
            "compiler": { "id": "appforge", "version": "1.0.0" },
            "variables": { "TITLE": "Acme" },
            "data": {
                "routes": [
                    { "path": "/", "component": { "type": "Page", "props": { "title": "${{TITLE}} Home" } } }
                ]
            }
        })
    }

    fn validate(document: &Value) -> ValidationResult {
        SpecValidator::new().validate(document.to_string().as_bytes())
    }

    #[test]
    fn test_valid_document() {
        let result = validate(&valid_document());
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parse_error_is_single_root_error() {
        let result = SpecValidator::new().validate(b"{ not json");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "$");
    }

    #[test]
    fn test_non_object_root() {
        let result = SpecValidator::new().validate(b"[1, 2]");
        assert!(!result.valid);
        assert_eq!(result.errors[0].message, "expected an object, found an array");
    }

    #[test]
    fn test_wrong_types_are_all_reported() {
        let mut doc = valid_document();
        doc["application"]["version"] = json!(3);
        doc["data"]["routes"][0]["protected"] = json!("yes");
        doc["variables"]["LIST"] = json!([1]);

        let result = validate(&doc);
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "$.application.version",
                "$.variables.LIST",
                "$.data.routes[0].protected"
            ]
        );
    }

    #[test]
    fn test_route_path_must_be_absolute() {
        let mut doc = valid_document();
        doc["data"]["routes"][0]["path"] = json!("home");
        let result = validate(&doc);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "$.data.routes[0].path");
    }

    #[test]
    fn test_unknown_named_component() {
        let mut doc = valid_document();
        doc["data"]["routes"][0]["component"] = json!("HeroBanner");
        let result = validate(&doc);
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "$.data.routes[0].component");
        assert_eq!(
            result.warnings[0].message,
            "unknown component 'HeroBanner' is expected from the design system"
        );

        let (_, spec) = SpecValidator::new().parse(doc.to_string().as_bytes());
        assert!(spec.is_some());
    }

    #[test]
    fn test_non_identifier_variable_name_is_warning() {
        let mut doc = valid_document();
        doc["variables"]["site-title"] = json!("Acme");
        let result = validate(&doc);
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "$.variables[\"site-title\"]");
        assert!(result.warnings[0].message.contains("can never be referenced"));
    }

    #[test]
    fn test_builtin_variables_need_no_declaration() {
        let mut doc = valid_document();
        doc["data"]["routes"][0]["component"]["props"]["footer"] = json!("${{APP_NAME}} ${{APP_VERSION}}");
        let result = validate(&doc);
        assert!(result.valid);
        assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_component_cycle() {
        let mut doc = valid_document();
        doc["data"]["components"] = json!({
            "Shell": { "type": "Layout", "children": [{ "type": "Nav" }] },
            "Nav": { "type": "Menu", "children": [{ "type": "Shell" }] },
            "Leaf": { "type": "Text" }
        });
        let result = validate(&doc);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "$.data.components.Shell");
        assert_eq!(
            result.errors[0].message,
            "circular component reference: Shell -> Nav -> Shell"
        );
    }

    #[test]
    fn test_self_referencing_component() {
        let mut doc = valid_document();
        doc["data"]["components"] = json!({ "Tree": { "type": "Tree" } });
        let result = validate(&doc);
        assert_eq!(result.errors[0].message, "circular component reference: Tree -> Tree");
    }

    #[test]
    fn test_component_dag_is_allowed() {
        let mut doc = valid_document();
        doc["data"]["components"] = json!({
            "Button": { "type": "ds-button" },
            "Toolbar": { "type": "Row", "children": [{ "type": "Button" }, { "type": "Button" }] },
            "Header": { "type": "Column", "children": [{ "type": "Toolbar" }, { "type": "Button" }] }
        });
        doc["data"]["routes"][0]["component"] = json!("Header");
        let result = validate(&doc);
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn test_bindings_and_permissions() {
        let mut doc = valid_document();
        doc["data"]["routes"][0]["dataBindings"] = json!([
            { "url": "https://api.example.com/${{TITLE}}", "method": "POST" },
            { "url": "", "method": "FETCH" }
        ]);
        doc["data"]["permissions"] = json!({ "/": ["admin"], "/ghost": ["admin", 7] });

        let result = validate(&doc);
        let errors: Vec<_> = result.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            vec![
                "$.data.routes[0].dataBindings[1].url: must not be empty",
                "$.data.routes[0].dataBindings[1].method: unsupported HTTP method 'FETCH'",
                "$.data.permissions[\"/ghost\"][1]: expected a role name, found a number",
            ]
        );
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "$.data.permissions[\"/ghost\"]");
    }

    #[test]
    fn test_compiler_mismatch_is_warning() {
        let mut doc = valid_document();
        doc["compiler"]["version"] = json!("9.0.0");
        let result = validate(&doc);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "$.compiler");
    }

    #[test]
    fn test_unused_variable_warning() {
        let mut doc = valid_document();
        doc["variables"]["EXTRA"] = json!(1);
        let result = validate(&doc);
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![ValidationIssue::new(
                "$.variables.EXTRA",
                "variable 'EXTRA' is declared but never referenced"
            )]
        );
    }

    #[test]
    fn test_missing_variable_policy() {
        let mut doc = valid_document();
        doc["data"]["routes"][0]["component"]["props"]["alt"] = json!("${{MISSING}}");

        let lenient = validate(&doc);
        assert!(lenient.valid);
        assert_eq!(lenient.warnings.len(), 1);
        assert_eq!(lenient.warnings[0].path, "$.data.routes[0].component.props.alt");

        let strict = SpecValidator::with_options(ValidatorOptions {
            missing_variables: ReferencePolicy::Error,
            ..Default::default()
        })
        .validate(doc.to_string().as_bytes());
        assert!(!strict.valid);
        assert_eq!(strict.errors[0].message, "variable 'MISSING' is referenced but not declared");
    }

    #[test]
    fn test_parse_returns_typed_spec() {
        let (result, spec) = SpecValidator::new().parse(valid_document().to_string().as_bytes());
        assert!(result.valid);
        let spec = spec.unwrap();
        assert_eq!(spec.application.name, "acme-site");
        assert_eq!(spec.route_count(), 1);
        assert_eq!(spec.dialect(), SpecDialect::V1);
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationResult::new();
        let mut b = ValidationResult::new();
        b.add_error("$.x", "bad");
        b.add_warning("$.y", "meh");
        a.merge(b);
        assert!(!a.valid);
        assert_eq!(a.errors.len(), 1);
        assert_eq!(a.warnings.len(), 1);
    }
}
