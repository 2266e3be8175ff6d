//! Structured-data decoding of specification documents
//!
//! Both YAML and JSON decode into `serde_json::Value` so the rest of the
//! pipeline works on one untyped tree. Mapping order is preserved.

use serde_json::{Map, Number, Value};
use specforge_common::{GeneratorError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Decoder selected from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick the decoder for a path (`.yaml`/`.yml` → YAML, `.json` → JSON)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            _ => Err(GeneratorError::unsupported_extension(extension)),
        }
    }

    /// Decode document text
    pub fn decode(&self, text: &str) -> Result<Value> {
        match self {
            DocumentFormat::Json => serde_json::from_str(text)
                .map_err(|e| GeneratorError::Decode(format!("invalid JSON: {}", e))),
            DocumentFormat::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(text)
                    .map_err(|e| GeneratorError::Decode(format!("invalid YAML: {}", e)))?;
                Ok(yaml_to_json(yaml))
            }
        }
    }
}

/// Read and decode a document from disk
///
/// A missing file is reported as `NotFound`, distinct from a decode failure.
pub fn load_document(path: &Path) -> Result<Value> {
    let format = DocumentFormat::from_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GeneratorError::NotFound(path.display().to_string()),
        _ => GeneratorError::Io(e),
    })?;

    tracing::debug!(path = %path.display(), ?format, "decoding specification document");
    format.decode(&content)
}

/// Convert a YAML tree into a JSON tree
///
/// Non-string mapping keys (`200:`, `true:`) are stringified; tags are dropped.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                object.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => match yaml_to_json(other) {
            Value::String(s) => s,
            json => json.to_string(),
        },
    }
}
