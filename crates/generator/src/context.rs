//! Template context assembly
//!
//! Flattens the `SpecificationModel` into view structs that templates can
//! consume without re-deriving names, signatures or sample payloads.

use crate::config::GeneratorConfig;
use crate::example::{mock_response, python_literal};
use crate::naming::{js_ident, method_name, pascal_case, path_template, python_ident};
use serde::Serialize;
use serde_json::json;
use specforge_common::{
    EndpointDescriptor, ParameterDescriptor, ParameterLocation, SpecificationModel, TypeDescriptor,
};
use std::collections::HashSet;
use tera::Context;

/// Names generated client methods bind themselves
const RESERVED_IDENTS: &[&str] = &["self", "data"];

/// Template view of one endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EndpointView {
    /// `"GET /pets"`
    pub key: String,
    pub method: String,
    pub path: String,
    /// Path as a Python f-string body (`/pets/{pet_id}`)
    pub python_path: String,
    /// Path as a JavaScript template literal body
    pub js_path: String,
    /// snake_case method name
    pub name: String,
    /// camelCase method name
    pub js_name: String,
    pub summary: String,
    pub description: String,
    pub operation_id: String,
    pub tags: Vec<String>,

    /// Declaration order
    pub parameters: Vec<ParameterView>,
    /// Required parameters first, for signatures with defaults
    pub signature: Vec<ParameterView>,
    pub path_params: Vec<ParameterView>,
    pub query_params: Vec<ParameterView>,
    pub header_params: Vec<ParameterView>,

    pub body: Option<BodyView>,
    pub response_type: TypeDescriptor,
    pub responses: Vec<ResponseView>,
    pub mock: MockView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterView {
    pub name: String,
    /// snake_case identifier
    pub ident: String,
    /// camelCase identifier
    pub js_ident: String,
    pub location: ParameterLocation,
    pub description: String,
    pub required: bool,
    pub schema: TypeDescriptor,
    /// Python literal, `None` when the parameter declares no default
    pub default: String,
    /// JSON literal, `undefined` when the parameter declares no default
    pub js_default: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyView {
    pub description: String,
    pub required: bool,
    pub schema: TypeDescriptor,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub status: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MockView {
    pub status: u16,
    /// Python literal of the payload, empty for no content
    pub payload: String,
}

/// Template view of a component schema
#[derive(Debug, Clone, Serialize)]
pub struct SchemaView {
    pub name: String,
    pub class_name: String,
    pub schema: TypeDescriptor,
}

impl ParameterView {
    fn new(param: &ParameterDescriptor) -> Self {
        Self {
            name: param.name.clone(),
            ident: python_ident(&param.name),
            js_ident: js_ident(&param.name),
            location: param.location,
            description: param.description.clone().unwrap_or_default(),
            required: param.required.unwrap_or(param.location == ParameterLocation::Path),
            schema: param.schema.clone(),
            default: param
                .default
                .as_ref()
                .map(python_literal)
                .unwrap_or_else(|| "None".to_string()),
            js_default: param
                .default
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "undefined".to_string()),
        }
    }
}

/// Claim `ident`, or the first free `ident<sep>2`, `ident<sep>3`, ...
fn claim(taken: &mut HashSet<String>, ident: String, sep: &str) -> String {
    let mut candidate = ident.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}{}{}", ident, sep, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Parameter views with identifiers unique within one method signature
fn parameter_views(params: &[ParameterDescriptor]) -> Vec<ParameterView> {
    let reserved: HashSet<String> = RESERVED_IDENTS.iter().map(|s| s.to_string()).collect();
    let mut python_taken = reserved.clone();
    let mut js_taken = reserved;

    params
        .iter()
        .map(|param| {
            let mut view = ParameterView::new(param);
            view.ident = claim(&mut python_taken, view.ident, "_");
            view.js_ident = claim(&mut js_taken, view.js_ident, "");
            view
        })
        .collect()
}

impl EndpointView {
    pub fn new(key: &str, endpoint: &EndpointDescriptor, model: &SpecificationModel) -> Self {
        let parameters = parameter_views(&endpoint.parameters);
        let path_param = |name: &str| {
            parameters
                .iter()
                .find(|p| p.location == ParameterLocation::Path && p.name == name)
        };
        let python_path = path_template(
            &endpoint.path,
            |name| path_param(name).map_or_else(|| python_ident(name), |p| p.ident.clone()),
            "{",
            "}",
        );
        let js_path = path_template(
            &endpoint.path,
            |name| path_param(name).map_or_else(|| js_ident(name), |p| p.js_ident.clone()),
            "${encodeURIComponent(",
            ")}",
        );

        let mut signature = parameters.clone();
        signature.sort_by_key(|p| !p.required);

        let located = |location: ParameterLocation| -> Vec<ParameterView> {
            parameters
                .iter()
                .filter(|p| p.location == location)
                .cloned()
                .collect()
        };

        let mock = mock_response(endpoint, &model.schemas);
        let name = method_name(endpoint);

        Self {
            key: key.to_string(),
            method: endpoint.method.as_str().to_string(),
            path: endpoint.path.clone(),
            python_path,
            js_path,
            js_name: js_ident(&name),
            name: python_ident(&name),
            summary: endpoint.summary.clone(),
            description: endpoint.description.clone(),
            operation_id: endpoint.operation_id.clone(),
            tags: endpoint.tags.clone(),
            path_params: located(ParameterLocation::Path),
            query_params: located(ParameterLocation::Query),
            header_params: located(ParameterLocation::Header),
            signature,
            parameters,
            body: endpoint.request_body.as_ref().map(|body| BodyView {
                description: body.description.clone(),
                required: body.required,
                schema: endpoint.request_body_type(),
            }),
            response_type: endpoint.response_type(),
            responses: endpoint
                .responses
                .iter()
                .map(|(status, response)| ResponseView {
                    status: status.clone(),
                    description: response.description.clone(),
                })
                .collect(),
            mock: MockView {
                status: mock.status,
                payload: mock.body.as_ref().map(python_literal).unwrap_or_default(),
            },
        }
    }
}

/// Base URL baked into clients: first server, else the configured default
pub fn base_url(model: &SpecificationModel, config: &GeneratorConfig) -> String {
    model
        .servers
        .first()
        .map(|server| server.url.clone())
        .or_else(|| config.base_url.clone())
        .unwrap_or_default()
}

/// Class name of generated clients (`Swagger Petstore` → `SwaggerPetstoreClient`)
pub fn client_name(model: &SpecificationModel) -> String {
    let title = pascal_case(&model.info.title);
    if title.is_empty() || title.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Api{}Client", title)
    } else {
        format!("{}Client", title)
    }
}

/// Build the context shared by every template
pub fn build_context(model: &SpecificationModel, config: &GeneratorConfig) -> Context {
    let mut context = Context::new();

    let endpoints: Vec<EndpointView> = model
        .endpoints
        .iter()
        .map(|(key, endpoint)| EndpointView::new(key, endpoint, model))
        .collect();
    let schemas: Vec<SchemaView> = model
        .schemas
        .iter()
        .map(|(name, schema)| SchemaView {
            name: name.clone(),
            class_name: pascal_case(name),
            schema: schema.clone(),
        })
        .collect();

    context.insert("api_info", &model.info);
    context.insert("client_name", &client_name(model));
    context.insert("endpoints", &endpoints);
    context.insert("schemas", &schemas);
    context.insert("servers", &model.servers);
    context.insert("base_url", &base_url(model, config));
    context.insert("security_schemes", &model.security_schemes);
    context.insert("tags", &model.tags);
    context.insert("external_docs", &model.external_docs);
    context.insert("custom_headers", &config.custom_headers);
    context.insert("rate_limit", &config.rate_limit);
    context.insert("retries", &config.retries);
    context.insert("pagination", &config.pagination);
    context.insert("auth", &config.auth);
    context.insert("cache", &json!({ "ttl": config.cache_ttl }));
    context.insert("webhook", &config.webhook);

    context
}
