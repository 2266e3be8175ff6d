//! Rendering type descriptors as Python and JavaScript type annotations

use crate::naming::pascal_case;
use serde_json::Value;
use specforge_common::TypeDescriptor;

/// Python annotation for a type (`typing` names)
///
/// Named references render as quoted forward references to the generated
/// `TypedDict` classes.
pub fn python_type(ty: &TypeDescriptor) -> String {
    match ty {
        TypeDescriptor::Primitive(name) => match name.as_str() {
            "string" => "str",
            "integer" => "int",
            "number" => "float",
            "boolean" => "bool",
            _ => "Any",
        }
        .to_string(),
        TypeDescriptor::ArrayOf(item) => format!("List[{}]", python_type(item)),
        TypeDescriptor::ObjectOf(_) | TypeDescriptor::KeyValue => "Dict[str, Any]".to_string(),
        TypeDescriptor::Enum(values) => {
            if !values.is_empty() && values.iter().all(Value::is_string) {
                let literals: Vec<String> = values.iter().map(Value::to_string).collect();
                format!("Literal[{}]", literals.join(", "))
            } else {
                "Any".to_string()
            }
        }
        TypeDescriptor::NamedRef(name) => format!("\"{}\"", pascal_case(name)),
        TypeDescriptor::Unknown => "Any".to_string(),
    }
}

/// JSDoc type expression for a type
pub fn js_type(ty: &TypeDescriptor) -> String {
    match ty {
        TypeDescriptor::Primitive(name) => match name.as_str() {
            "string" => "string",
            "integer" | "number" => "number",
            "boolean" => "boolean",
            _ => "*",
        }
        .to_string(),
        TypeDescriptor::ArrayOf(item) => format!("Array<{}>", js_type(item)),
        TypeDescriptor::ObjectOf(props) => {
            let fields: Vec<String> = props
                .iter()
                .map(|(name, prop)| format!("{}: {}", name, js_type(prop)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        TypeDescriptor::KeyValue => "Object<string, *>".to_string(),
        TypeDescriptor::Enum(values) if !values.is_empty() => values
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("|"),
        TypeDescriptor::Enum(_) => "*".to_string(),
        TypeDescriptor::NamedRef(name) => pascal_case(name),
        TypeDescriptor::Unknown => "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn test_python_types() {
        assert_eq!(python_type(&TypeDescriptor::primitive("integer")), "int");
        assert_eq!(
            python_type(&TypeDescriptor::array_of(TypeDescriptor::named("pet"))),
            "List[\"Pet\"]"
        );
        assert_eq!(python_type(&TypeDescriptor::KeyValue), "Dict[str, Any]");
        assert_eq!(
            python_type(&TypeDescriptor::Enum(vec![json!("asc"), json!("desc")])),
            "Literal[\"asc\", \"desc\"]"
        );
        assert_eq!(python_type(&TypeDescriptor::Enum(vec![json!(1)])), "Any");
        assert_eq!(python_type(&TypeDescriptor::Unknown), "Any");
    }

    #[test]
    fn test_js_types() {
        let mut props = IndexMap::new();
        props.insert("id".to_string(), TypeDescriptor::primitive("integer"));
        props.insert(
            "tags".to_string(),
            TypeDescriptor::array_of(TypeDescriptor::primitive("string")),
        );

        assert_eq!(
            js_type(&TypeDescriptor::ObjectOf(props)),
            "{id: number, tags: Array<string>}"
        );
        assert_eq!(js_type(&TypeDescriptor::named("Pet")), "Pet");
        assert_eq!(
            js_type(&TypeDescriptor::Enum(vec![json!("a"), json!(2)])),
            "\"a\"|2"
        );
    }
}
