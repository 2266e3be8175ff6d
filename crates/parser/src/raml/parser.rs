//! RAML spec file parser

use super::converter::convert_raml_to_openapi;
use crate::document::DocumentFormat;
use crate::normalizer::filter_by_version;
use crate::{SpecFormat, SpecParser};
use serde_json::Value;
use specforge_common::{GeneratorError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// RAML 1.0 specification parser
///
/// Decodes the RAML YAML and immediately rewrites it into OpenAPI shape;
/// the original RAML tree is not kept.
pub struct RamlParser {
    /// OpenAPI-shaped document
    document: Value,

    /// Requested API version
    api_version: Option<String>,
}

impl RamlParser {
    /// Load a RAML document (`.raml`, `.yaml` or `.yml`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !matches!(extension.as_str(), "raml" | "yaml" | "yml") {
            return Err(GeneratorError::unsupported_extension(extension));
        }

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GeneratorError::NotFound(path.display().to_string()),
            _ => GeneratorError::Io(e),
        })?;

        Self::from_text(&content)
    }

    /// Parse RAML text
    pub fn from_text(text: &str) -> Result<Self> {
        let raml = DocumentFormat::Yaml.decode(text).map_err(|e| match e {
            GeneratorError::Decode(msg) => {
                GeneratorError::Decode(format!("Error parsing RAML specification: {}", msg))
            }
            other => other,
        })?;

        if !raml.is_object() {
            return Err(GeneratorError::Decode(
                "Error parsing RAML specification: root is not a mapping".to_string(),
            ));
        }

        Ok(Self {
            document: convert_raml_to_openapi(&raml),
            api_version: None,
        })
    }

    /// Keep only operations tagged with `version` (or untagged)
    pub fn with_api_version(mut self, version: &str) -> Self {
        filter_by_version(&mut self.document, version);
        self.api_version = Some(version.to_string());
        self
    }
}

impl SpecParser for RamlParser {
    fn format(&self) -> SpecFormat {
        SpecFormat::Raml
    }

    fn document(&self) -> &Value {
        &self.document
    }

    fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }
}
