//! Rewrites a RAML 1.0 document into OpenAPI path/method/schema shape
//!
//! Everything downstream (resolver, inferencer, normalizer) only ever sees
//! the OpenAPI shape, so this is the whole of the RAML adapter's work.

use serde_json::{json, Map, Value};
use specforge_common::HttpMethod;

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Convert a decoded RAML document
pub fn convert_raml_to_openapi(raml: &Value) -> Value {
    let empty = Map::new();
    let root = raml.as_object().unwrap_or(&empty);

    let version = scalar_text(root.get("version")).unwrap_or_default();

    let mut document = Map::new();
    document.insert("openapi".to_string(), json!("3.0.0"));
    document.insert(
        "info".to_string(),
        json!({
            "title": scalar_text(root.get("title")).unwrap_or_default(),
            "version": version,
            "description": scalar_text(root.get("description")).unwrap_or_default(),
        }),
    );

    if let Some(base_uri) = scalar_text(root.get("baseUri")) {
        document.insert(
            "servers".to_string(),
            json!([{"url": base_uri.replace("{version}", &version)}]),
        );
    }

    let media_type = root
        .get("mediaType")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MEDIA_TYPE);

    let mut paths = Map::new();
    collect_resources(root, "", &[], media_type, &mut paths);
    document.insert("paths".to_string(), Value::Object(paths));

    let mut components = Map::new();
    let types = root.get("types").or_else(|| root.get("schemas"));
    if let Some(types) = types.and_then(Value::as_object) {
        let schemas: Map<String, Value> = types
            .iter()
            .map(|(name, decl)| (name.clone(), type_schema(decl)))
            .collect();
        components.insert("schemas".to_string(), Value::Object(schemas));
    }
    if let Some(schemes) = root.get("securitySchemes").and_then(Value::as_object) {
        components.insert(
            "securitySchemes".to_string(),
            Value::Object(schemes.clone()),
        );
    }
    if !components.is_empty() {
        document.insert("components".to_string(), Value::Object(components));
    }

    Value::Object(document)
}

/// Walk nested `/resource` keys, concatenating paths
///
/// URI parameters declared on a resource apply to every nested resource.
fn collect_resources(
    node: &Map<String, Value>,
    prefix: &str,
    inherited_uri_params: &[Value],
    media_type: &str,
    paths: &mut Map<String, Value>,
) {
    for (key, resource) in node {
        if !key.starts_with('/') {
            continue;
        }
        let Some(resource) = resource.as_object() else {
            continue;
        };

        let path = format!("{}{}", prefix, key);
        let mut uri_params = inherited_uri_params.to_vec();
        uri_params.extend(named_parameters(resource.get("uriParameters"), "path"));

        let mut item = Map::new();
        for (method_key, method) in resource {
            if HttpMethod::from_key(method_key).is_none() {
                continue;
            }
            let empty = Map::new();
            let method = method.as_object().unwrap_or(&empty);
            item.insert(
                method_key.to_ascii_lowercase(),
                convert_method(&path, method, &uri_params, media_type),
            );
        }

        if !item.is_empty() {
            paths.insert(path.clone(), Value::Object(item));
        }

        collect_resources(resource, &path, &uri_params, media_type, paths);
    }
}

fn convert_method(
    path: &str,
    method: &Map<String, Value>,
    uri_params: &[Value],
    media_type: &str,
) -> Value {
    let description = scalar_text(method.get("description")).unwrap_or_default();

    let mut parameters: Vec<Value> = Vec::new();
    for name in template_names(path) {
        let declared = uri_params
            .iter()
            .rev()
            .find(|p| p.get("name").and_then(Value::as_str) == Some(name.as_str()));
        parameters.push(declared.cloned().unwrap_or_else(|| {
            json!({"name": name, "in": "path", "required": true, "schema": {"type": "string"}})
        }));
    }
    parameters.extend(named_parameters(method.get("queryParameters"), "query"));
    parameters.extend(named_parameters(method.get("headers"), "header"));

    let mut operation = Map::new();
    operation.insert("summary".to_string(), json!(description));
    operation.insert("description".to_string(), json!(description));
    if let Some(name) = scalar_text(method.get("displayName")) {
        operation.insert("operationId".to_string(), json!(name));
    }
    operation.insert("parameters".to_string(), Value::Array(parameters));

    if let Some(body) = method.get("body") {
        operation.insert(
            "requestBody".to_string(),
            json!({"content": body_content(body, media_type)}),
        );
    }

    let mut responses = Map::new();
    if let Some(declared) = method.get("responses").and_then(Value::as_object) {
        for (code, response) in declared {
            let mut converted = Map::new();
            converted.insert(
                "description".to_string(),
                json!(scalar_text(response.get("description")).unwrap_or_default()),
            );
            if let Some(body) = response.get("body") {
                converted.insert("content".to_string(), body_content(body, media_type));
            }
            responses.insert(code.clone(), Value::Object(converted));
        }
    }
    operation.insert("responses".to_string(), Value::Object(responses));

    Value::Object(operation)
}

/// `{name}` segments of a path template, in order
fn template_names(path: &str) -> Vec<String> {
    path.split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}').map(|(name, _)| name.to_string()))
        .collect()
}

/// Convert a RAML named-parameter map (`queryParameters`, `headers`, ...)
///
/// RAML parameters are required unless marked otherwise; a trailing `?` on
/// the name also marks them optional.
fn named_parameters(declared: Option<&Value>, location: &str) -> Vec<Value> {
    let Some(declared) = declared.and_then(Value::as_object) else {
        return Vec::new();
    };

    declared
        .iter()
        .map(|(raw_name, decl)| {
            let (name, optional) = split_optional(raw_name);
            let required = decl
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(!optional);

            let mut param = Map::new();
            param.insert("name".to_string(), json!(name));
            param.insert("in".to_string(), json!(location));
            if let Some(description) = scalar_text(decl.get("description")) {
                param.insert("description".to_string(), json!(description));
            }
            param.insert("required".to_string(), json!(required));
            param.insert("schema".to_string(), type_schema(decl));
            if let Some(default) = decl.get("default") {
                param.insert("default".to_string(), default.clone());
            }
            Value::Object(param)
        })
        .collect()
}

/// Convert a `body` node into an OpenAPI `content` map
///
/// A body keyed by media types keeps them; a bare type declaration uses the
/// document's default media type.
fn body_content(body: &Value, media_type: &str) -> Value {
    let mut content = Map::new();
    match body.as_object() {
        Some(map) if map.keys().any(|k| k.contains('/')) => {
            for (media, decl) in map {
                content.insert(media.clone(), json!({"schema": type_schema(decl)}));
            }
        }
        _ => {
            content.insert(media_type.to_string(), json!({"schema": type_schema(body)}));
        }
    }
    Value::Object(content)
}

/// Convert a RAML type declaration into an OpenAPI schema
///
/// Declarations are either a type expression string or a mapping with
/// `type`, `properties`, `items`, `enum`. Without an explicit `type`, a
/// declaration with `properties` is an object and anything else a string.
pub fn type_schema(decl: &Value) -> Value {
    let Some(map) = decl.as_object() else {
        return match decl.as_str() {
            Some(expr) => type_expression(expr),
            None => json!({}),
        };
    };

    let explicit = map.get("type").or_else(|| map.get("schema"));
    let mut schema = match explicit {
        Some(Value::String(expr)) => type_expression(expr),
        Some(inline @ Value::Object(_)) => type_schema(inline),
        _ if map.contains_key("properties") => json!({"type": "object"}),
        _ if map.contains_key("items") => json!({"type": "array"}),
        _ => json!({"type": "string"}),
    };

    let Some(schema_map) = schema.as_object_mut() else {
        return schema;
    };

    if let Some(values) = map.get("enum").and_then(Value::as_array) {
        schema_map.insert("enum".to_string(), Value::Array(values.clone()));
    }

    if let Some(items) = map.get("items") {
        schema_map.insert("type".to_string(), json!("array"));
        schema_map.insert("items".to_string(), type_schema(items));
    }

    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        let mut converted = Map::new();
        let mut required = Vec::new();
        for (raw_name, prop) in properties {
            let (name, optional) = split_optional(raw_name);
            let is_required = prop
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(!optional);
            if is_required {
                required.push(json!(name));
            }
            converted.insert(name.to_string(), type_schema(prop));
        }
        schema_map.insert("type".to_string(), json!("object"));
        schema_map.insert("properties".to_string(), Value::Object(converted));
        if !required.is_empty() {
            schema_map.insert("required".to_string(), Value::Array(required));
        }
    }

    if let Some(description) = scalar_text(map.get("description")) {
        schema_map.insert("description".to_string(), json!(description));
    }
    if let Some(default) = map.get("default") {
        schema_map.insert("default".to_string(), default.clone());
    }

    schema
}

/// Convert a RAML type expression (`string`, `Pet`, `Pet[]`, `A | B`)
fn type_expression(expr: &str) -> Value {
    let expr = expr.trim();

    if let Some(item) = expr.strip_suffix("[]") {
        return json!({"type": "array", "items": type_expression(item)});
    }
    if expr.contains('|') {
        return json!({});
    }

    match expr {
        "string" | "integer" | "number" | "boolean" | "object" | "array" => json!({"type": expr}),
        "date-only" | "time-only" | "datetime-only" | "datetime" | "file" | "nil" => {
            json!({"type": "string"})
        }
        "any" | "" => json!({}),
        name => json!({"$ref": format!("{}{}", SCHEMA_PREFIX, name)}),
    }
}

fn split_optional(name: &str) -> (&str, bool) {
    match name.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (name, false),
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expressions() {
        assert_eq!(type_expression("integer"), json!({"type": "integer"}));
        assert_eq!(
            type_expression("Pet[]"),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}})
        );
        assert_eq!(type_expression("datetime"), json!({"type": "string"}));
        assert_eq!(type_expression("Cat | Dog"), json!({}));
    }

    #[test]
    fn test_declaration_defaults() {
        assert_eq!(type_schema(&json!({"description": "x"})), json!({"type": "string", "description": "x"}));
        assert_eq!(
            type_schema(&json!({"properties": {"name": "string", "age?": "integer"}})),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "age": {"type": "integer"}},
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_enum_declaration() {
        assert_eq!(
            type_schema(&json!({"enum": ["asc", "desc"]})),
            json!({"type": "string", "enum": ["asc", "desc"]})
        );
    }

    #[test]
    fn test_traits_are_not_tags() {
        let raml = json!({
            "title": "Paged",
            "/items": {
                "get": {
                    "is": ["paged", "secured"],
                    "responses": {"200": {"description": "OK"}}
                }
            }
        });

        let document = convert_raml_to_openapi(&raml);
        let operation = &document["paths"]["/items"]["get"];
        assert!(operation.get("tags").is_none());
        assert_eq!(operation["responses"]["200"]["description"], "OK");
    }

    #[test]
    fn test_template_names() {
        assert_eq!(template_names("/users/{userId}/pets/{petId}"), vec!["userId", "petId"]);
        assert!(template_names("/users").is_empty());
    }

    #[test]
    fn test_nested_resources_and_uri_parameters() {
        let raml = json!({
            "title": "Pets",
            "version": "v1",
            "baseUri": "https://api.example.com/{version}",
            "/pets": {
                "get": {
                    "description": "List pets",
                    "queryParameters": {"limit": {"type": "integer", "required": false}}
                },
                "/{petId}": {
                    "uriParameters": {"petId": {"type": "integer"}},
                    "delete": {"responses": {"204": {"description": "gone"}}}
                }
            }
        });

        let doc = convert_raml_to_openapi(&raml);
        assert_eq!(doc["servers"][0]["url"], "https://api.example.com/v1");
        assert_eq!(doc["paths"]["/pets"]["get"]["summary"], "List pets");
        assert_eq!(
            doc["paths"]["/pets"]["get"]["parameters"][0],
            json!({"name": "limit", "in": "query", "required": false, "schema": {"type": "integer"}})
        );

        let delete = &doc["paths"]["/pets/{petId}"]["delete"];
        assert_eq!(
            delete["parameters"][0],
            json!({"name": "petId", "in": "path", "required": true, "schema": {"type": "integer"}})
        );
        assert_eq!(delete["responses"]["204"]["description"], "gone");
    }

    #[test]
    fn test_body_media_types() {
        let keyed = body_content(
            &json!({"application/xml": {"type": "Pet"}}),
            DEFAULT_MEDIA_TYPE,
        );
        assert_eq!(
            keyed,
            json!({"application/xml": {"schema": {"$ref": "#/components/schemas/Pet"}}})
        );

        let bare = body_content(&json!({"type": "Pet"}), DEFAULT_MEDIA_TYPE);
        assert_eq!(
            bare,
            json!({"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}})
        );
    }
}
