//! Schema-to-type inference
//!
//! Maps a schema node to a `TypeDescriptor`. Inference is total: any node,
//! including non-mappings, yields a descriptor, with `Unknown` as the
//! fallback. References are kept shallow (`NamedRef`), so inference never
//! descends into the component table and cannot loop on recursive schemas.

use crate::resolver::{component_name, reference_of, ReferenceResolver};
use indexmap::IndexMap;
use serde_json::Value;
use specforge_common::TypeDescriptor;

const PRIMITIVES: [&str; 4] = ["string", "integer", "number", "boolean"];

/// Infers type descriptors for schemas of one document
#[derive(Debug, Clone, Copy)]
pub struct TypeInferencer<'a> {
    resolver: ReferenceResolver<'a>,
}

impl<'a> TypeInferencer<'a> {
    pub fn new(resolver: ReferenceResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Infer the descriptor of a schema node
    ///
    /// Priority: `enum`, then `$ref`, then `array` with `items`, then `object`
    /// with `properties`, then primitives. An `object` without `properties`
    /// is a generic key-value type.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use specforge_common::TypeDescriptor;
    /// use specforge_parser::{ReferenceResolver, TypeInferencer};
    ///
    /// let doc = json!({});
    /// let inferencer = TypeInferencer::new(ReferenceResolver::for_document(&doc));
    ///
    /// assert_eq!(inferencer.infer(&json!({})), TypeDescriptor::Unknown);
    /// assert_eq!(
    ///     inferencer.infer(&json!({"type": "array", "items": {"type": "integer"}})),
    ///     TypeDescriptor::array_of(TypeDescriptor::primitive("integer"))
    /// );
    /// ```
    pub fn infer(&self, schema: &Value) -> TypeDescriptor {
        let Some(node) = schema.as_object() else {
            return TypeDescriptor::Unknown;
        };

        if let Some(values) = node.get("enum").and_then(Value::as_array) {
            return TypeDescriptor::Enum(values.clone());
        }

        if let Some(pointer) = reference_of(schema) {
            return TypeDescriptor::NamedRef(component_name(pointer));
        }

        match node.get("type").and_then(Value::as_str) {
            Some("array") => match node.get("items") {
                Some(items) => TypeDescriptor::ArrayOf(Box::new(self.infer(items))),
                None => TypeDescriptor::Unknown,
            },
            Some("object") => match node.get("properties").and_then(Value::as_object) {
                Some(properties) => TypeDescriptor::ObjectOf(
                    properties
                        .iter()
                        .map(|(name, prop)| (name.clone(), self.infer(prop)))
                        .collect(),
                ),
                None => TypeDescriptor::KeyValue,
            },
            Some(name) if PRIMITIVES.contains(&name) => TypeDescriptor::primitive(name),
            _ => TypeDescriptor::Unknown,
        }
    }

    /// Infer every entry of `components.schemas`, in document order
    pub fn infer_components(&self) -> IndexMap<String, TypeDescriptor> {
        self.resolver
            .components()
            .get("schemas")
            .and_then(Value::as_object)
            .map(|schemas| {
                schemas
                    .iter()
                    .map(|(name, schema)| (name.clone(), self.infer(schema)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infer(schema: Value) -> TypeDescriptor {
        let doc = json!({});
        TypeInferencer::new(ReferenceResolver::for_document(&doc)).infer(&schema)
    }

    #[test]
    fn test_empty_schema_is_unknown() {
        assert_eq!(infer(json!({})), TypeDescriptor::Unknown);
        assert_eq!(infer(json!(null)), TypeDescriptor::Unknown);
        assert_eq!(infer(json!("string")), TypeDescriptor::Unknown);
        assert_eq!(infer(json!({"type": "file"})), TypeDescriptor::Unknown);
        assert_eq!(infer(json!({"type": 7})), TypeDescriptor::Unknown);
    }

    #[test]
    fn test_primitives() {
        for name in PRIMITIVES {
            assert_eq!(
                infer(json!({"type": name})),
                TypeDescriptor::primitive(name)
            );
        }
    }

    #[test]
    fn test_enum_wins_over_type() {
        assert_eq!(
            infer(json!({"type": "string", "enum": ["a", "b"]})),
            TypeDescriptor::Enum(vec![json!("a"), json!("b")])
        );
    }

    #[test]
    fn test_enum_wins_over_ref() {
        assert_eq!(
            infer(json!({"$ref": "#/components/schemas/Color", "enum": [1, 2]})),
            TypeDescriptor::Enum(vec![json!(1), json!(2)])
        );
    }

    #[test]
    fn test_ref_wins_over_type() {
        assert_eq!(
            infer(json!({"type": "object", "$ref": "#/components/schemas/Pet"})),
            TypeDescriptor::named("Pet")
        );
    }

    #[test]
    fn test_nested_arrays() {
        assert_eq!(
            infer(json!({"type": "array", "items": {"type": "array", "items": {"type": "integer"}}})),
            TypeDescriptor::array_of(TypeDescriptor::array_of(TypeDescriptor::primitive(
                "integer"
            )))
        );
    }

    #[test]
    fn test_array_without_items_is_unknown() {
        assert_eq!(infer(json!({"type": "array"})), TypeDescriptor::Unknown);
    }

    #[test]
    fn test_object_properties_keep_declaration_order() {
        let ty = infer(json!({
            "type": "object",
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"$ref": "#/components/schemas/Owner"},
                "mid": {"type": "boolean"}
            }
        }));

        let TypeDescriptor::ObjectOf(props) = ty else {
            panic!("expected object");
        };
        let names: Vec<&String> = props.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(props["alpha"], TypeDescriptor::named("Owner"));
    }

    #[test]
    fn test_object_without_properties_is_key_value() {
        assert_eq!(infer(json!({"type": "object"})), TypeDescriptor::KeyValue);
        assert_eq!(
            infer(json!({"type": "object", "additionalProperties": {"type": "string"}})),
            TypeDescriptor::KeyValue
        );
    }

    #[test]
    fn test_infer_components_shallow_on_self_reference() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": {
                            "next": {"$ref": "#/components/schemas/Node"}
                        }
                    }
                }
            }
        });
        let schemas = TypeInferencer::new(ReferenceResolver::for_document(&doc)).infer_components();

        let mut props = IndexMap::new();
        props.insert("next".to_string(), TypeDescriptor::named("Node"));
        assert_eq!(schemas["Node"], TypeDescriptor::ObjectOf(props));
    }

    #[test]
    fn test_inference_is_deterministic() {
        let schema = json!({
            "type": "object",
            "properties": {"tags": {"type": "array", "items": {"enum": ["x", "y"]}}}
        });
        assert_eq!(infer(schema.clone()), infer(schema));
    }
}
