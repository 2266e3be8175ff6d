//! Specification ingestion for specforge
//!
//! This crate turns a specification document into the `SpecificationModel`
//! IR consumed by every emitter.
//!
//! ## Pipeline
//!
//! Format adapter → raw OpenAPI-shaped document → endpoint normalizer (using
//! the reference resolver and type inferencer) → `SpecificationModel`.
//!
//! - **OpenAPI** documents are used as decoded.
//! - **RAML** documents are rewritten into OpenAPI shape first.
//!
//! Only document-level failures (missing file, undecodable content,
//! unsupported format) are errors. Anything malformed inside the document
//! degrades to empty defaults or `TypeDescriptor::Unknown`.

mod document;
mod inference;
mod normalizer;
pub mod openapi;
pub mod raml;
mod resolver;

pub use document::{load_document, DocumentFormat};
pub use inference::TypeInferencer;
pub use normalizer::{
    filter_by_version, matches_version, EndpointNormalizer, API_VERSION_EXTENSION,
};
pub use openapi::OpenApiParser;
pub use raml::RamlParser;
pub use resolver::{component_name, ReferenceResolver};

use indexmap::IndexMap;
use serde_json::Value;
use specforge_common::{ApiInfo, EndpointDescriptor, GeneratorError, Result, SpecificationModel};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported specification formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecFormat {
    /// OpenAPI 3 (native)
    OpenApi,
    /// RAML 1.0
    Raml,
}

impl SpecFormat {
    pub const ALL: [SpecFormat; 2] = [SpecFormat::OpenApi, SpecFormat::Raml];

    pub fn name(&self) -> &'static str {
        match self {
            SpecFormat::OpenApi => "openapi",
            SpecFormat::Raml => "raml",
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpecFormat {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openapi" => Ok(SpecFormat::OpenApi),
            "raml" => Ok(SpecFormat::Raml),
            _ => Err(GeneratorError::unsupported_format(s)),
        }
    }
}

/// Capability interface shared by all format parsers
///
/// Implementors only expose their OpenAPI-shaped document; metadata,
/// endpoints and the full model are derived from it the same way for
/// every format.
pub trait SpecParser: Send + Sync {
    /// Format this parser reads
    fn format(&self) -> SpecFormat;

    /// Decoded, OpenAPI-shaped, version-filtered document
    fn document(&self) -> &Value;

    /// Requested API version, if any
    fn api_version(&self) -> Option<&str>;

    /// API metadata
    fn api_info(&self) -> ApiInfo {
        openapi::extract_api_info(self.document())
    }

    /// Endpoint descriptors keyed by `"<METHOD> <path>"`
    fn endpoints(&self) -> IndexMap<String, EndpointDescriptor> {
        openapi::extract_endpoints(self.document(), self.api_version())
    }

    /// Build the complete model
    fn parse(&self) -> Result<SpecificationModel> {
        let model = openapi::convert_document_to_model(self.document(), self.api_version());
        tracing::debug!(
            format = %self.format(),
            endpoints = model.endpoints.len(),
            schemas = model.schemas.len(),
            "specification ingested"
        );
        Ok(model)
    }
}

/// Create the parser for `format` reading `path`
///
/// # Example
/// ```rust,ignore
/// let parser = create_parser("petstore.yaml", SpecFormat::OpenApi, Some("2"))?;
/// let model = parser.parse()?;
/// ```
pub fn create_parser<P: AsRef<Path>>(
    path: P,
    format: SpecFormat,
    api_version: Option<&str>,
) -> Result<Box<dyn SpecParser>> {
    let parser: Box<dyn SpecParser> = match (format, api_version) {
        (SpecFormat::OpenApi, None) => Box::new(OpenApiParser::from_file(path)?),
        (SpecFormat::OpenApi, Some(v)) => {
            Box::new(OpenApiParser::from_file(path)?.with_api_version(v))
        }
        (SpecFormat::Raml, None) => Box::new(RamlParser::from_file(path)?),
        (SpecFormat::Raml, Some(v)) => Box::new(RamlParser::from_file(path)?.with_api_version(v)),
    };
    Ok(parser)
}

/// Ingest document text into a model
///
/// `document_format` selects the decoder; `format` selects the adapter.
/// RAML is always decoded as YAML.
pub fn ingest(
    source: &str,
    document_format: DocumentFormat,
    format: SpecFormat,
    api_version: Option<&str>,
) -> Result<SpecificationModel> {
    let parser: Box<dyn SpecParser> = match format {
        SpecFormat::OpenApi => {
            let parser = OpenApiParser::from_text(source, document_format)?;
            match api_version {
                Some(v) => Box::new(parser.with_api_version(v)),
                None => Box::new(parser),
            }
        }
        SpecFormat::Raml => {
            let parser = RamlParser::from_text(source)?;
            match api_version {
                Some(v) => Box::new(parser.with_api_version(v)),
                None => Box::new(parser),
            }
        }
    };
    parser.parse()
}
