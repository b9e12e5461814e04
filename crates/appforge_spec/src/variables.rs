//! Variable references and substitution.
//!
//! Specs embed `${{NAME}}` tokens in string fields. This module builds the
//! reference graph between declared variables and their usage sites and
//! performs substitution.
//!
//! Substitution is a single left-to-right pass: a substituted value is never
//! scanned again, so a variable whose value itself contains a token is
//! emitted verbatim rather than expanded.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::models::Variables;
use crate::path;

/// Filled from `application.name` by the generator.
pub const BUILTIN_APP_NAME: &str = "APP_NAME";
/// Filled from `application.version` by the generator.
pub const BUILTIN_APP_VERSION: &str = "APP_VERSION";

/// Variables specs may reference without declaring them. A declaration with
/// the same name takes precedence.
pub const BUILTIN_VARIABLES: &[&str] = &[BUILTIN_APP_NAME, BUILTIN_APP_VERSION];

/// Whether `name` is filled in by the generator.
pub fn is_builtin_variable(name: &str) -> bool {
    BUILTIN_VARIABLES.contains(&name)
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{\{([A-Za-z0-9_]+)\}\}").unwrap())
}

/// Whether `name` can appear inside a `${{...}}` token.
pub fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Variable names referenced by `value`, in order of appearance.
pub fn scan_tokens(value: &str) -> impl Iterator<Item = &str> {
    token_pattern()
        .captures_iter(value)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Replace every `${{NAME}}` token with the declared value of `NAME`.
///
/// Unresolved tokens become the empty string.
pub fn substitute(value: &str, declared: &Variables) -> String {
    token_pattern()
        .replace_all(value, |caps: &Captures| {
            declared
                .get(&caps[1])
                .map(|v| v.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Usage sites of every referenced variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGraph {
    usages: BTreeMap<String, Vec<String>>,
}

impl ReferenceGraph {
    /// Walk `root` in document order, recording each token found in a string
    /// value. `root_path` is the location of `root` in the enclosing document.
    pub fn build(root: &Value, root_path: &str) -> Self {
        let mut graph = Self::default();
        graph.visit(root, root_path);
        graph
    }

    fn visit(&mut self, value: &Value, at: &str) {
        match value {
            Value::String(s) => {
                for name in scan_tokens(s) {
                    let sites = self.usages.entry(name.to_string()).or_default();
                    if sites.last().map(String::as_str) != Some(at) {
                        sites.push(at.to_string());
                    }
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.visit(item, &path::index(at, i));
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    self.visit(v, &path::key(at, k));
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Referenced variable names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.usages.keys().map(String::as_str)
    }

    /// Locations where `name` is referenced, in document order.
    pub fn usages(&self, name: &str) -> &[String] {
        self.usages.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_referenced(&self, name: &str) -> bool {
        self.usages.contains_key(name)
    }
}

/// Outcome of checking references against declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    /// Referenced but not declared.
    pub missing_variables: BTreeSet<String>,
    /// Declared but never referenced.
    pub unused_variables: BTreeSet<String>,
    pub graph: ReferenceGraph,
}

impl ReferenceReport {
    pub fn is_clean(&self) -> bool {
        self.missing_variables.is_empty() && self.unused_variables.is_empty()
    }
}

/// Check the `${{NAME}}` references inside a spec's `data` section.
pub fn resolve_references(data: &Value, declared: &Variables) -> ReferenceReport {
    let graph = ReferenceGraph::build(data, &path::key(path::ROOT, "data"));

    let missing_variables = graph
        .names()
        .filter(|name| !declared.contains_key(*name))
        .map(String::from)
        .collect();

    let unused_variables = declared
        .keys()
        .filter(|name| !graph.is_referenced(name))
        .cloned()
        .collect();

    ReferenceReport {
        missing_variables,
        unused_variables,
        graph,
    }
}

/// Substitute every string value in `data`, leaving keys and structure as is.
pub fn resolve_data(data: &Value, declared: &Variables) -> Value {
    match data {
        Value::String(s) => Value::String(substitute(s, declared)),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve_data(v, declared)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_data(v, declared)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VariableValue;
    use serde_json::json;

    fn vars(pairs: &[(&str, VariableValue)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_substitute_declared() {
        let declared = vars(&[("TITLE", "Acme".into()), ("PORT", 8080i64.into())]);
        assert_eq!(substitute("${{TITLE}} Home", &declared), "Acme Home");
        assert_eq!(substitute("http://localhost:${{PORT}}/", &declared), "http://localhost:8080/");
        assert_eq!(substitute("no tokens here", &declared), "no tokens here");
    }

    #[test]
    fn test_substitute_unresolved_is_empty() {
        let declared = Variables::new();
        assert_eq!(substitute("[${{MISSING}}]", &declared), "[]");
    }

    #[test]
    fn test_substitute_is_not_recursive() {
        let declared = vars(&[("A", "${{B}}".into()), ("B", "boom".into())]);
        assert_eq!(substitute("${{A}}", &declared), "${{B}}");

        let declared = vars(&[("SELF", "${{SELF}}".into())]);
        assert_eq!(substitute("${{SELF}}", &declared), "${{SELF}}");
    }

    #[test]
    fn test_malformed_tokens_are_left_alone() {
        let declared = vars(&[("A", "x".into())]);
        assert_eq!(substitute("${{ A }} ${A} {{A}} ${{A-B}}", &declared), "${{ A }} ${A} {{A}} ${{A-B}}");
    }

    #[test]
    fn test_resolve_references() {
        let data = json!({
            "routes": [
                { "path": "/", "component": { "type": "Page", "props": { "title": "${{TITLE}} ${{TITLE}}" } } },
                { "path": "/x", "component": { "type": "Page", "props": { "alt": "${{MISSING}}" } } }
            ]
        });
        let declared = vars(&[("TITLE", "Acme".into()), ("UNUSED", true.into())]);

        let report = resolve_references(&data, &declared);
        assert_eq!(report.missing_variables.iter().collect::<Vec<_>>(), vec!["MISSING"]);
        assert_eq!(report.unused_variables.iter().collect::<Vec<_>>(), vec!["UNUSED"]);
        assert_eq!(
            report.graph.usages("TITLE"),
            &["$.data.routes[0].component.props.title".to_string()]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_resolve_data() {
        let data = json!({ "title": "${{TITLE}}!", "count": 3, "list": ["${{NOPE}}"] });
        let declared = vars(&[("TITLE", "Acme".into())]);
        assert_eq!(
            resolve_data(&data, &declared),
            json!({ "title": "Acme!", "count": 3, "list": [""] })
        );
    }
}
