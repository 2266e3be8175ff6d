//! OpenAPI spec file parser

use crate::document::{load_document, DocumentFormat};
use crate::normalizer::filter_by_version;
use crate::{SpecFormat, SpecParser};
use serde_json::Value;
use specforge_common::Result;
use std::path::Path;

/// OpenAPI specification parser
///
/// Holds the decoded document. When an API version is set, the document is
/// filtered once at construction so the raw passthrough and the endpoint
/// descriptors agree.
pub struct OpenApiParser {
    /// Decoded, version-filtered document
    document: Value,

    /// Requested API version
    api_version: Option<String>,
}

impl OpenApiParser {
    /// Load an OpenAPI document from a `.json`, `.yaml` or `.yml` file
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = OpenApiParser::from_file("petstore.yaml")?.with_api_version("2");
    /// let model = parser.parse()?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_value(load_document(path.as_ref())?))
    }

    /// Parse an OpenAPI document from text
    pub fn from_text(text: &str, format: DocumentFormat) -> Result<Self> {
        Ok(Self::from_value(format.decode(text)?))
    }

    /// Wrap an already decoded document
    pub fn from_value(document: Value) -> Self {
        Self {
            document,
            api_version: None,
        }
    }

    /// Keep only operations tagged with `version` (or untagged)
    pub fn with_api_version(mut self, version: &str) -> Self {
        filter_by_version(&mut self.document, version);
        self.api_version = Some(version.to_string());
        self
    }
}

impl SpecParser for OpenApiParser {
    fn format(&self) -> SpecFormat {
        SpecFormat::OpenApi
    }

    fn document(&self) -> &Value {
        &self.document
    }

    fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_openapi() {
        let openapi_json = r#"{
            "openapi": "3.0.0",
            "info": {
                "title": "Test API",
                "version": "1.0.0"
            },
            "paths": {}
        }"#;

        let parser = OpenApiParser::from_text(openapi_json, DocumentFormat::Json);
        assert!(parser.is_ok());

        let parser = parser.unwrap();
        assert_eq!(parser.document["openapi"], "3.0.0");

        let model = parser.parse().unwrap();
        assert_eq!(model.info.title, "Test API");
        assert!(model.endpoints.is_empty());
    }

    #[test]
    fn test_with_api_version_filters_document() {
        let yaml = r#"
paths:
  /pets:
    get:
      x-api-version: "2"
    post:
      operationId: createPet
"#;
        let parser = OpenApiParser::from_text(yaml, DocumentFormat::Yaml)
            .unwrap()
            .with_api_version("1");

        assert!(parser.document()["paths"]["/pets"].get("get").is_none());
        let endpoints = parser.endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints["POST /pets"].operation_id, "createPet");
    }
}
