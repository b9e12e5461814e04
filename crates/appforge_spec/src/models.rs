//! Data models for application specs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::dialect::SpecDialect;

/// Declared variables, keyed by name.
///
/// Ordered by name so every traversal over declarations is reproducible.
pub type Variables = BTreeMap<String, VariableValue>;

/// Default value of a declared variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Number(Number),
    String(String),
}

impl VariableValue {
    /// Convert a JSON scalar into a variable value.
    ///
    /// Returns `None` for arrays, objects and `null`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Bool(b) => write!(f, "{}", b),
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Identity of the application being generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    pub version: String,
}

/// Compiler dialect the spec was written against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub id: String,
    pub version: String,
}

/// Root application spec document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    pub application: ApplicationInfo,
    pub compiler: CompilerInfo,
    #[serde(default)]
    pub variables: Variables,
    pub data: SpecData,
}

impl ApplicationSpec {
    /// Number of declared routes.
    pub fn route_count(&self) -> usize {
        self.data.routes.len()
    }

    /// Routes that require an authenticated session.
    pub fn protected_routes(&self) -> impl Iterator<Item = &RouteSpec> {
        self.data.routes.iter().filter(|r| r.protected)
    }

    /// Dialect selected by the `compiler` block, falling back to the latest
    /// dialect when the declaration is not recognised.
    pub fn dialect(&self) -> SpecDialect {
        SpecDialect::detect(&self.compiler).unwrap_or(SpecDialect::LATEST)
    }
}

/// The `data` section: routes, reusable components, and access rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecData {
    pub routes: Vec<RouteSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentNode>,
    /// Route path to the roles allowed to access it.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub permissions: BTreeMap<String, Vec<String>>,
}

/// One page/route of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub path: String,
    pub component: ComponentRef,
    #[serde(default)]
    pub protected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_bindings: Vec<DataBinding>,
}

/// A route's component: either a named component or an inline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentRef {
    Named(String),
    Inline(ComponentNode),
}

/// A node of the component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            props: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// HTTP method of an external data binding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External API binding attached to a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBinding {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variable_value_display() {
        assert_eq!(VariableValue::from("Acme").to_string(), "Acme");
        assert_eq!(VariableValue::from(42i64).to_string(), "42");
        assert_eq!(VariableValue::from(true).to_string(), "true");

        let float = VariableValue::from_json(&json!(1.5)).unwrap();
        assert_eq!(float.to_string(), "1.5");
        assert!(VariableValue::from_json(&json!(null)).is_none());
        assert!(VariableValue::from_json(&json!(["a"])).is_none());
    }

    #[test]
    fn test_route_component_forms() {
        let routes: Vec<RouteSpec> = serde_json::from_value(json!([
            { "path": "/", "component": "HomePage" },
            {
                "path": "/about",
                "component": { "type": "Page", "children": [{ "type": "Text" }] },
                "protected": true,
                "dataBindings": [{ "url": "https://api.example.com/team" }]
            }
        ]))
        .unwrap();

        assert_eq!(routes[0].component, ComponentRef::Named("HomePage".into()));
        assert!(!routes[0].protected);

        match &routes[1].component {
            ComponentRef::Inline(node) => assert_eq!(node.node_count(), 2),
            other => panic!("expected inline node, got {:?}", other),
        }
        assert!(routes[1].protected);
        assert_eq!(routes[1].data_bindings[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("get"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
