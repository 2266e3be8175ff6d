//! OpenAPI 3 specification parser
//!
//! The native format. Documents are decoded untyped so malformed or partial
//! specs still produce a best-effort model instead of a deserialization error.
//!
//! ## Usage
//! ```rust,ignore
//! use specforge_parser::{openapi::OpenApiParser, SpecParser};
//!
//! let parser = OpenApiParser::from_file("petstore.yaml")?;
//! let model = parser.parse()?;
//! ```

mod converter;
mod parser;

pub use converter::{
    convert_document_to_model, extract_api_info, extract_endpoints, extract_external_docs,
    extract_security_schemes, extract_servers, extract_tags,
};
pub use parser::OpenApiParser;
