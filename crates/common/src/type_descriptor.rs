//! Language-independent type descriptors inferred from schema nodes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Inferred data shape of a schema node
///
/// Serialized adjacently tagged (`{"kind": "array_of", "value": ...}`) so
/// templates can branch on `kind` without knowing Rust enum layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// One of `string`, `integer`, `number`, `boolean`
    Primitive(String),

    /// Homogeneous array
    ArrayOf(Box<TypeDescriptor>),

    /// Object with declared properties, in declaration order
    ObjectOf(IndexMap<String, TypeDescriptor>),

    /// Object schema without `properties`
    KeyValue,

    /// Closed set of literal values
    Enum(Vec<serde_json::Value>),

    /// Reference to a component schema, not substituted
    NamedRef(String),

    /// No `type`, `$ref` or `enum` could be interpreted
    Unknown,
}

impl TypeDescriptor {
    /// Shorthand for `Primitive`
    pub fn primitive(name: &str) -> Self {
        TypeDescriptor::Primitive(name.to_string())
    }

    /// Shorthand for `ArrayOf`
    pub fn array_of(item: TypeDescriptor) -> Self {
        TypeDescriptor::ArrayOf(Box::new(item))
    }

    /// Shorthand for `NamedRef`
    pub fn named(name: &str) -> Self {
        TypeDescriptor::NamedRef(name.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeDescriptor::Unknown)
    }

    /// Component names referenced anywhere inside this descriptor, first occurrence order
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::NamedRef(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            TypeDescriptor::ArrayOf(item) => item.collect_names(names),
            TypeDescriptor::ObjectOf(props) => {
                for prop in props.values() {
                    prop.collect_names(names);
                }
            }
            _ => {}
        }
    }

    /// Substitute every `NamedRef` with the component it names
    ///
    /// A name already being expanded higher up the stack stays a `NamedRef`,
    /// so self-referencing schemas terminate. Names missing from `schemas`
    /// are left as references too.
    pub fn expand(&self, schemas: &IndexMap<String, TypeDescriptor>) -> TypeDescriptor {
        let mut in_progress = HashSet::new();
        self.expand_guarded(schemas, &mut in_progress)
    }

    fn expand_guarded(
        &self,
        schemas: &IndexMap<String, TypeDescriptor>,
        in_progress: &mut HashSet<String>,
    ) -> TypeDescriptor {
        match self {
            TypeDescriptor::NamedRef(name) => {
                if in_progress.contains(name) {
                    return self.clone();
                }
                let Some(target) = schemas.get(name) else {
                    return self.clone();
                };
                in_progress.insert(name.clone());
                let expanded = target.expand_guarded(schemas, in_progress);
                in_progress.remove(name);
                expanded
            }
            TypeDescriptor::ArrayOf(item) => {
                TypeDescriptor::ArrayOf(Box::new(item.expand_guarded(schemas, in_progress)))
            }
            TypeDescriptor::ObjectOf(props) => TypeDescriptor::ObjectOf(
                props
                    .iter()
                    .map(|(name, prop)| (name.clone(), prop.expand_guarded(schemas, in_progress)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(name) => write!(f, "{}", name),
            TypeDescriptor::ArrayOf(item) => write!(f, "array<{}>", item),
            TypeDescriptor::ObjectOf(props) => {
                write!(f, "{{")?;
                for (i, (name, prop)) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, prop)?;
                }
                write!(f, "}}")
            }
            TypeDescriptor::KeyValue => write!(f, "map"),
            TypeDescriptor::Enum(values) => {
                let literals: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "enum({})", literals.join(", "))
            }
            TypeDescriptor::NamedRef(name) => write!(f, "{}", name),
            TypeDescriptor::Unknown => write!(f, "any"),
        }
    }
}
