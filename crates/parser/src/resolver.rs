//! Reference resolution against the component table

use serde_json::{Map, Value};
use std::collections::HashSet;

const COMPONENTS_PREFIX: &str = "#/components/";

/// Resolves `#/components/...` pointers
///
/// Borrows the component table of one document; lookups have no side
/// effects, so one resolver can serve any number of concurrent readers.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    components: &'a Map<String, Value>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(components: &'a Map<String, Value>) -> Self {
        Self { components }
    }

    /// Build a resolver over `document.components`, empty when absent
    pub fn for_document(document: &'a Value) -> Self {
        static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
        let components = document
            .get("components")
            .and_then(Value::as_object)
            .unwrap_or_else(|| EMPTY.get_or_init(Map::new));
        Self::new(components)
    }

    pub fn components(&self) -> &'a Map<String, Value> {
        self.components
    }

    /// Look up a pointer, `None` when any segment is missing
    pub fn lookup(&self, pointer: &str) -> Option<&'a Value> {
        let Some(rest) = pointer.strip_prefix(COMPONENTS_PREFIX) else {
            tracing::warn!(pointer, "reference outside the component table");
            return None;
        };

        let mut segments = rest.split('/').map(decode_segment);
        let first = segments.next()?;
        let mut current = self.components.get(&first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(&segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Value at `pointer`, or an empty mapping when unresolved
    pub fn resolve(&self, pointer: &str) -> Value {
        match self.lookup(pointer) {
            Some(value) => value.clone(),
            None => {
                tracing::warn!(pointer, "unresolved reference, using empty mapping");
                Value::Object(Map::new())
            }
        }
    }

    /// Resolve a parameter/body/response entry that may be a `$ref`
    ///
    /// Entries without `$ref` are returned as-is. Chains of references are
    /// followed; a chain that revisits a pointer resolves to an empty mapping.
    pub fn resolve_entry(&self, entry: &Value) -> Value {
        let mut current = entry;
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(pointer) = reference_of(current) {
            if !visited.insert(pointer) {
                tracing::warn!(pointer, "reference cycle detected, using empty mapping");
                return Value::Object(Map::new());
            }
            match self.lookup(pointer) {
                Some(target) => current = target,
                None => {
                    tracing::warn!(pointer, "unresolved reference, using empty mapping");
                    return Value::Object(Map::new());
                }
            }
        }

        current.clone()
    }
}

/// The `$ref` string of a node, if it is a reference
pub fn reference_of(node: &Value) -> Option<&str> {
    node.get("$ref").and_then(Value::as_str)
}

/// Component name addressed by a pointer (its final segment)
pub fn component_name(pointer: &str) -> String {
    decode_segment(pointer.rsplit('/').next().unwrap_or(pointer))
}

/// Undo JSON-pointer escaping (`~1` → `/`, `~0` → `~`)
fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
