//! Common types and utilities for specforge
//!
//! This crate contains the intermediate representation (`SpecificationModel`)
//! shared by the parser, the generator and the CLI, together with the error
//! type every library crate returns.

mod model;
mod type_descriptor;

pub use model::{
    endpoint_key, ApiInfo, BodyDescriptor, EndpointDescriptor, ExternalDocs, HttpMethod,
    ParameterDescriptor, ParameterLocation, ResponseDescriptor, Server, SpecificationModel, Tag,
    JSON_MEDIA_TYPE,
};
pub use type_descriptor::TypeDescriptor;

use thiserror::Error;

/// Errors that can occur while ingesting a specification or emitting artifacts
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The specification file does not exist
    #[error("Specification file not found: {0}")]
    NotFound(String),

    /// Unsupported document extension or specification format
    #[error("Unsupported {kind}: {value}")]
    ContentFormat { kind: &'static str, value: String },

    /// The document exists but could not be decoded
    #[error("Error parsing specification file: {0}")]
    Decode(String),

    /// An emitter failed; names the emitter and the underlying cause
    #[error("Failed to generate {emitter}: {cause}")]
    Configuration { emitter: String, cause: String },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    /// Unsupported specification format (e.g. `apiblueprint`)
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        GeneratorError::ContentFormat {
            kind: "specification format",
            value: format.into(),
        }
    }

    /// Unsupported file extension
    pub fn unsupported_extension(extension: impl Into<String>) -> Self {
        GeneratorError::ContentFormat {
            kind: "file format",
            value: extension.into(),
        }
    }

    /// Wrap an emitter failure
    pub fn configuration(emitter: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        GeneratorError::Configuration {
            emitter: emitter.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type for specforge operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_cause() {
        let err = GeneratorError::unsupported_format("apiblueprint");
        assert_eq!(
            err.to_string(),
            "Unsupported specification format: apiblueprint"
        );

        let err = GeneratorError::configuration("mock server", "disk full");
        assert_eq!(err.to_string(), "Failed to generate mock server: disk full");
    }

    #[test]
    fn test_not_found_distinct_from_decode() {
        let missing = GeneratorError::NotFound("api.yaml".to_string());
        let broken = GeneratorError::Decode("expected mapping".to_string());
        assert!(matches!(missing, GeneratorError::NotFound(_)));
        assert!(matches!(broken, GeneratorError::Decode(_)));
    }
}
