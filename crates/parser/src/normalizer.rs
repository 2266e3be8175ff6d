//! Endpoint normalization
//!
//! Walks `paths`, resolves every parameter/body/response entry and infers
//! their schemas, producing one `EndpointDescriptor` per (method, path).
//! Malformed entries degrade to empty defaults; they never abort siblings.

use crate::inference::TypeInferencer;
use crate::resolver::ReferenceResolver;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use specforge_common::{
    endpoint_key, BodyDescriptor, EndpointDescriptor, HttpMethod, ParameterDescriptor,
    ParameterLocation, ResponseDescriptor, TypeDescriptor,
};

/// Vendor extension carrying an operation's API version
pub const API_VERSION_EXTENSION: &str = "x-api-version";

/// Builds endpoint descriptors for one document
#[derive(Debug, Clone, Copy)]
pub struct EndpointNormalizer<'a> {
    resolver: ReferenceResolver<'a>,
    inferencer: TypeInferencer<'a>,
}

impl<'a> EndpointNormalizer<'a> {
    pub fn new(resolver: ReferenceResolver<'a>) -> Self {
        Self {
            resolver,
            inferencer: TypeInferencer::new(resolver),
        }
    }

    /// Normalize every allowed (method, path) pair of `document`
    ///
    /// With `api_version`, only operations tagged with that version or not
    /// tagged at all are kept. Keys are `"<METHOD> <path>"`; when two entries
    /// produce the same key (e.g. `get` and `GET` under one path) the later
    /// one wins.
    pub fn normalize(
        &self,
        document: &Value,
        api_version: Option<&str>,
    ) -> IndexMap<String, EndpointDescriptor> {
        let mut endpoints = IndexMap::new();

        let Some(paths) = document.get("paths").and_then(Value::as_object) else {
            return endpoints;
        };

        for (path, path_item) in paths {
            let Some(path_item) = path_item.as_object() else {
                tracing::debug!(path = %path, "skipping non-mapping path item");
                continue;
            };
            let shared_parameters = path_item
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for (key, operation) in path_item {
                let Some(method) = HttpMethod::from_key(key) else {
                    if key != "parameters" {
                        tracing::debug!(path = %path, key = %key, "ignoring non-method key");
                    }
                    continue;
                };

                if let Some(version) = api_version {
                    if !matches_version(operation, version) {
                        tracing::debug!(
                            path = %path,
                            key = %key,
                            version,
                            "filtered out by API version"
                        );
                        continue;
                    }
                }

                let endpoint = self.endpoint(method, path, operation, shared_parameters);
                let key = endpoint_key(method, path);
                if endpoints.insert(key.clone(), endpoint).is_some() {
                    tracing::debug!(key = %key, "duplicate endpoint key, later entry wins");
                }
            }
        }

        endpoints
    }

    /// Build one descriptor
    pub fn endpoint(
        &self,
        method: HttpMethod,
        path: &str,
        operation: &Value,
        shared_parameters: &[Value],
    ) -> EndpointDescriptor {
        let empty = Map::new();
        let op = operation.as_object().unwrap_or(&empty);

        EndpointDescriptor {
            method,
            path: path.to_string(),
            summary: string_field(op, "summary"),
            description: string_field(op, "description"),
            operation_id: string_field(op, "operationId"),
            parameters: self.parameters(
                shared_parameters,
                op.get("parameters")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
            ),
            request_body: op.get("requestBody").map(|body| self.request_body(body)),
            responses: op
                .get("responses")
                .map(|responses| self.responses(responses))
                .unwrap_or_default(),
            security: op
                .get("security")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            tags: op
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Resolve path-level then operation-level parameters
    ///
    /// An operation parameter with the same (name, in) as a path-level one
    /// replaces it in place.
    fn parameters(&self, shared: &[Value], own: &[Value]) -> Vec<ParameterDescriptor> {
        let mut parameters: Vec<ParameterDescriptor> = shared
            .iter()
            .map(|entry| self.parameter(entry))
            .collect();

        let shared_count = parameters.len();
        for entry in own {
            let param = self.parameter(entry);
            match parameters[..shared_count]
                .iter()
                .position(|p| p.name == param.name && p.location == param.location)
            {
                Some(index) => parameters[index] = param,
                None => parameters.push(param),
            }
        }

        parameters
    }

    /// Resolve and describe one parameter entry
    pub fn parameter(&self, entry: &Value) -> ParameterDescriptor {
        let resolved = self.resolver.resolve_entry(entry);
        let schema = resolved.get("schema");

        let name = resolved
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let location = match resolved.get("in").and_then(Value::as_str) {
            Some(raw) => raw.parse::<ParameterLocation>().unwrap_or_else(|e| {
                tracing::warn!(name = %name, error = %e, "treating parameter as query");
                ParameterLocation::Query
            }),
            None => ParameterLocation::Query,
        };

        ParameterDescriptor {
            name,
            location,
            description: resolved
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            required: resolved.get("required").and_then(Value::as_bool),
            schema: schema
                .map(|s| self.inferencer.infer(s))
                .unwrap_or(TypeDescriptor::Unknown),
            default: resolved
                .get("default")
                .or_else(|| schema.and_then(|s| s.get("default")))
                .cloned(),
        }
    }

    /// Resolve and describe a request body
    pub fn request_body(&self, entry: &Value) -> BodyDescriptor {
        let resolved = self.resolver.resolve_entry(entry);
        BodyDescriptor {
            description: resolved
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            required: resolved
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            content: self.content(&resolved),
        }
    }

    /// Resolve and describe a responses mapping
    pub fn responses(&self, entry: &Value) -> IndexMap<String, ResponseDescriptor> {
        let Some(responses) = entry.as_object() else {
            return IndexMap::new();
        };

        responses
            .iter()
            .map(|(status, response)| {
                let resolved = self.resolver.resolve_entry(response);
                let descriptor = ResponseDescriptor {
                    description: resolved
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    content: self.content(&resolved),
                };
                (status.clone(), descriptor)
            })
            .collect()
    }

    fn content(&self, node: &Value) -> IndexMap<String, TypeDescriptor> {
        let Some(content) = node.get("content").and_then(Value::as_object) else {
            return IndexMap::new();
        };

        content
            .iter()
            .map(|(media_type, entry)| {
                let ty = entry
                    .get("schema")
                    .map(|schema| self.inferencer.infer(schema))
                    .unwrap_or(TypeDescriptor::Unknown);
                (media_type.clone(), ty)
            })
            .collect()
    }
}

/// Whether an operation survives the version filter
///
/// Untagged operations are version-agnostic and always kept. Numeric tags
/// compare by their textual form, so YAML `x-api-version: 2` matches `"2"`.
pub fn matches_version(operation: &Value, version: &str) -> bool {
    match operation.get(API_VERSION_EXTENSION) {
        None => true,
        Some(Value::String(tag)) => tag == version,
        Some(Value::Number(tag)) => tag.to_string() == version,
        Some(_) => false,
    }
}

/// Drop operations not matching `version` from the raw document
///
/// Paths left without any method entry are removed.
pub fn filter_by_version(document: &mut Value, version: &str) {
    let Some(paths) = document.get_mut("paths").and_then(Value::as_object_mut) else {
        return;
    };

    paths.retain(|path, item| {
        let Some(item) = item.as_object_mut() else {
            return false;
        };
        item.retain(|key, operation| {
            HttpMethod::from_key(key).is_none() || matches_version(operation, version)
        });
        let kept = item.keys().any(|key| HttpMethod::from_key(key).is_some());
        if !kept {
            tracing::debug!(path = %path, version, "dropping path with no matching operations");
        }
        kept
    });
}

fn string_field(node: &Map<String, Value>, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
