//! Assembles the SpecificationModel from an OpenAPI-shaped document

use crate::inference::TypeInferencer;
use crate::normalizer::EndpointNormalizer;
use crate::resolver::ReferenceResolver;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use specforge_common::{
    ApiInfo, EndpointDescriptor, ExternalDocs, Server, SpecificationModel, Tag,
};

/// Build the full model
pub fn convert_document_to_model(document: &Value, api_version: Option<&str>) -> SpecificationModel {
    let resolver = ReferenceResolver::for_document(document);

    SpecificationModel {
        info: extract_api_info(document),
        servers: extract_servers(document),
        security_schemes: extract_security_schemes(document),
        security: document
            .get("security")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        tags: extract_tags(document),
        external_docs: extract_external_docs(document),
        schemas: TypeInferencer::new(resolver).infer_components(),
        endpoints: extract_endpoints(document, api_version),
    }
}

/// Endpoint descriptors only
pub fn extract_endpoints(
    document: &Value,
    api_version: Option<&str>,
) -> IndexMap<String, EndpointDescriptor> {
    let resolver = ReferenceResolver::for_document(document);
    EndpointNormalizer::new(resolver).normalize(document, api_version)
}

/// `info` block with empty defaults
pub fn extract_api_info(document: &Value) -> ApiInfo {
    let empty = Map::new();
    let info = document
        .get("info")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    ApiInfo {
        title: text(info, "title"),
        version: text(info, "version"),
        description: text(info, "description"),
        terms_of_service: text(info, "termsOfService"),
        contact: mapping(info, "contact"),
        license: mapping(info, "license"),
    }
}

/// `servers`, skipping entries that are not mappings
pub fn extract_servers(document: &Value) -> Vec<Server> {
    entries(document, "servers")
        .map(|server| Server {
            url: text(server, "url"),
            description: optional_text(server, "description"),
        })
        .collect()
}

/// `tags`, skipping entries that are not mappings
pub fn extract_tags(document: &Value) -> Vec<Tag> {
    entries(document, "tags")
        .map(|tag| Tag {
            name: text(tag, "name"),
            description: optional_text(tag, "description"),
        })
        .collect()
}

/// `externalDocs`, `None` unless it carries a URL
pub fn extract_external_docs(document: &Value) -> Option<ExternalDocs> {
    let docs = document.get("externalDocs")?.as_object()?;
    Some(ExternalDocs {
        url: docs.get("url")?.as_str()?.to_string(),
        description: optional_text(docs, "description"),
    })
}

/// `components.securitySchemes`, unresolved
pub fn extract_security_schemes(document: &Value) -> IndexMap<String, Value> {
    document
        .get("components")
        .and_then(|c| c.get("securitySchemes"))
        .and_then(Value::as_object)
        .map(|schemes| {
            schemes
                .iter()
                .map(|(name, scheme)| (name.clone(), scheme.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn entries<'a>(document: &'a Value, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    document
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text(node: &Map<String, Value>, key: &str) -> String {
    optional_text(node, key).unwrap_or_default()
}

fn optional_text(node: &Map<String, Value>, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn mapping(node: &Map<String, Value>, key: &str) -> Map<String, Value> {
    node.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_info_defaults() {
        let info = extract_api_info(&json!({}));
        assert_eq!(info, ApiInfo::default());

        let info = extract_api_info(&json!({
            "info": {
                "title": "Pets",
                "version": 2,
                "termsOfService": "https://example.com/tos",
                "contact": {"name": "API team"},
                "license": "MIT"
            }
        }));
        assert_eq!(info.title, "Pets");
        assert_eq!(info.version, "2");
        assert_eq!(info.terms_of_service, "https://example.com/tos");
        assert_eq!(info.contact.get("name"), Some(&json!("API team")));
        assert!(info.license.is_empty());
    }

    #[test]
    fn test_servers_and_tags_keep_order() {
        let doc = json!({
            "servers": [
                {"url": "https://b.example.com"},
                "garbage",
                {"url": "https://a.example.com", "description": "staging"}
            ],
            "tags": [{"name": "pets", "description": "Pet ops"}, {"name": "store"}]
        });

        let servers = extract_servers(&doc);
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].url, "https://b.example.com");
        assert_eq!(servers[1].description.as_deref(), Some("staging"));

        let tags = extract_tags(&doc);
        assert_eq!(tags[0].name, "pets");
        assert_eq!(tags[1].description, None);
    }

    #[test]
    fn test_external_docs_requires_url() {
        assert_eq!(extract_external_docs(&json!({"externalDocs": {}})), None);
        let docs = extract_external_docs(&json!({
            "externalDocs": {"url": "https://docs.example.com"}
        }))
        .unwrap();
        assert_eq!(docs.url, "https://docs.example.com");
    }

    #[test]
    fn test_security_schemes_from_components() {
        let doc = json!({
            "components": {
                "securitySchemes": {
                    "api_key": {"type": "apiKey", "in": "header", "name": "X-Key"},
                    "oauth": {"type": "oauth2"}
                }
            }
        });
        let schemes = extract_security_schemes(&doc);
        let names: Vec<&String> = schemes.keys().collect();
        assert_eq!(names, vec!["api_key", "oauth"]);
    }
}
