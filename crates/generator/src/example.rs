//! Example payloads for mock responses

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use specforge_common::{EndpointDescriptor, TypeDescriptor, JSON_MEDIA_TYPE};

/// Status code and body returned by a mock handler
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    /// `None` for responses without content
    pub body: Option<Value>,
}

/// Build a sample value matching a type
///
/// The type is expanded against `schemas` first; references that remain
/// after expansion (cycles, unknown names) become empty objects.
pub fn example_value(ty: &TypeDescriptor, schemas: &IndexMap<String, TypeDescriptor>) -> Value {
    sample(&ty.expand(schemas))
}

fn sample(ty: &TypeDescriptor) -> Value {
    match ty {
        TypeDescriptor::Primitive(name) => match name.as_str() {
            "string" => json!("string"),
            "integer" => json!(0),
            "number" => json!(0.0),
            "boolean" => json!(true),
            _ => Value::Null,
        },
        TypeDescriptor::ArrayOf(item) => json!([sample(item)]),
        TypeDescriptor::ObjectOf(props) => Value::Object(
            props
                .iter()
                .map(|(name, prop)| (name.clone(), sample(prop)))
                .collect::<Map<String, Value>>(),
        ),
        TypeDescriptor::KeyValue | TypeDescriptor::NamedRef(_) => json!({}),
        TypeDescriptor::Enum(values) => values.first().cloned().unwrap_or(Value::Null),
        TypeDescriptor::Unknown => Value::Null,
    }
}

/// Pick the mock response for an endpoint
///
/// Uses the first declared 2xx status (200 if none); the body comes from its
/// JSON content, or its first content type. Endpoints that declare no success
/// response answer with a placeholder message.
pub fn mock_response(
    endpoint: &EndpointDescriptor,
    schemas: &IndexMap<String, TypeDescriptor>,
) -> MockResponse {
    let success = endpoint
        .responses
        .iter()
        .find_map(|(code, response)| match code.parse::<u16>() {
            Ok(status) if (200..300).contains(&status) => Some((status, response)),
            _ => None,
        });

    let Some((status, response)) = success else {
        return MockResponse {
            status: 200,
            body: Some(json!({"message": "This is a mock response"})),
        };
    };

    let content = response
        .content
        .get(JSON_MEDIA_TYPE)
        .or_else(|| response.content.values().next());

    MockResponse {
        status,
        body: content.map(|ty| example_value(ty, schemas)),
    }
}

/// Render a JSON value as a Python literal
pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
