//! Specification Model: the intermediate representation every emitter consumes
//!
//! The model is built once per ingestion and never mutated afterwards. All
//! types are plain owned data, so a model can be shared across threads for
//! concurrent read-only traversal.

use crate::TypeDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Media type preferred when a single body type is needed
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Root aggregate produced by ingestion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationModel {
    /// API metadata
    pub info: ApiInfo,

    /// Servers, in document order
    pub servers: Vec<Server>,

    /// Security schemes from the component table, unresolved
    pub security_schemes: IndexMap<String, Value>,

    /// Top-level security requirements, pass-through
    pub security: Vec<Value>,

    /// Tags, in document order
    pub tags: Vec<Tag>,

    /// External documentation pointer
    pub external_docs: Option<ExternalDocs>,

    /// Component schemas, shallowly inferred
    pub schemas: IndexMap<String, TypeDescriptor>,

    /// Endpoints keyed by `"<METHOD> <path>"`
    ///
    /// A duplicate key overwrites the earlier descriptor (last write wins).
    pub endpoints: IndexMap<String, EndpointDescriptor>,
}

impl SpecificationModel {
    /// Look up an endpoint by method and path
    pub fn endpoint(&self, method: HttpMethod, path: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.get(&endpoint_key(method, path))
    }

    /// Distinct paths, in first-seen order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for endpoint in self.endpoints.values() {
            if !paths.contains(&endpoint.path.as_str()) {
                paths.push(&endpoint.path);
            }
        }
        paths
    }
}

/// Build an endpoint key
pub fn endpoint_key(method: HttpMethod, path: &str) -> String {
    format!("{} {}", method, path)
}

/// API information block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: String,
    pub terms_of_service: String,
    pub contact: Map<String, Value>,
    pub license: Map<String, Value>,
}

/// Server entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Tag entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// External documentation pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// HTTP methods that produce endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    /// Match a path-item key, case-insensitively
    ///
    /// Returns `None` for anything outside the allowed set (`trace`,
    /// `parameters`, extension keys, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(key))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (method, path) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub summary: String,
    pub description: String,
    pub operation_id: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub request_body: Option<BodyDescriptor>,
    pub responses: IndexMap<String, ResponseDescriptor>,
    pub security: Vec<Value>,
    pub tags: Vec<String>,
}

impl EndpointDescriptor {
    /// Type of the JSON request body, `Unknown` without one
    pub fn request_body_type(&self) -> TypeDescriptor {
        self.request_body
            .as_ref()
            .and_then(|body| body.content.get(JSON_MEDIA_TYPE))
            .cloned()
            .unwrap_or(TypeDescriptor::Unknown)
    }

    /// Type of the first JSON success response among 200, 201 and default
    pub fn response_type(&self) -> TypeDescriptor {
        ["200", "201", "default"]
            .iter()
            .filter_map(|status| self.responses.get(*status))
            .find_map(|response| response.content.get(JSON_MEDIA_TYPE))
            .cloned()
            .unwrap_or(TypeDescriptor::Unknown)
    }

    /// Parameters at one location, in declaration order
    pub fn parameters_in(&self, location: ParameterLocation) -> Vec<&ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(|p| p.location == location)
            .collect()
    }
}

/// Where a parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "query" => Ok(ParameterLocation::Query),
            "path" => Ok(ParameterLocation::Path),
            "header" => Ok(ParameterLocation::Header),
            "cookie" => Ok(ParameterLocation::Cookie),
            other => Err(format!("unknown parameter location '{}'", other)),
        }
    }
}

/// A fully resolved parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub schema: TypeDescriptor,
    pub default: Option<Value>,
}

/// A resolved request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub description: String,
    pub required: bool,
    pub content: IndexMap<String, TypeDescriptor>,
}

/// A resolved response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    pub description: String,
    pub content: IndexMap<String, TypeDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(responses: IndexMap<String, ResponseDescriptor>) -> EndpointDescriptor {
        EndpointDescriptor {
            method: HttpMethod::Get,
            path: "/pets".to_string(),
            summary: String::new(),
            description: String::new(),
            operation_id: "listPets".to_string(),
            parameters: vec![],
            request_body: None,
            responses,
            security: vec![],
            tags: vec![],
        }
    }

    fn json_response(ty: TypeDescriptor) -> ResponseDescriptor {
        let mut content = IndexMap::new();
        content.insert(JSON_MEDIA_TYPE.to_string(), ty);
        ResponseDescriptor {
            description: String::new(),
            content,
        }
    }

    #[test]
    fn test_http_method_from_key() {
        assert_eq!(HttpMethod::from_key("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_key("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::from_key("trace"), None);
        assert_eq!(HttpMethod::from_key("parameters"), None);
    }

    #[test]
    fn test_response_type_prefers_200_then_201() {
        let mut responses = IndexMap::new();
        responses.insert(
            "201".to_string(),
            json_response(TypeDescriptor::primitive("integer")),
        );
        responses.insert(
            "200".to_string(),
            json_response(TypeDescriptor::primitive("string")),
        );
        assert_eq!(
            endpoint(responses).response_type(),
            TypeDescriptor::primitive("string")
        );
    }

    #[test]
    fn test_response_type_ignores_non_json() {
        let mut content = IndexMap::new();
        content.insert("text/plain".to_string(), TypeDescriptor::primitive("string"));
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            ResponseDescriptor {
                description: "ok".to_string(),
                content,
            },
        );
        assert_eq!(endpoint(responses).response_type(), TypeDescriptor::Unknown);
    }

    #[test]
    fn test_endpoint_key_format() {
        assert_eq!(endpoint_key(HttpMethod::Delete, "/pets/{id}"), "DELETE /pets/{id}");
    }

    #[test]
    fn test_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpecificationModel>();
    }
}
