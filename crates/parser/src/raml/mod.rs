//! RAML 1.0 specification parser
//!
//! Adapts RAML documents to the OpenAPI shape before normalization:
//!
//! - `title`/`version`/`description` → `info`
//! - `baseUri` → `servers` (with `{version}` substituted)
//! - nested `/resource` keys → `paths` (concatenated)
//! - `queryParameters`, `uriParameters`, `headers` → `parameters`
//! - `body` → `requestBody.content`, `responses.<code>.body` → `content`
//! - `types` → `components.schemas`
//!
//! ## Usage
//! ```rust,ignore
//! use specforge_parser::{raml::RamlParser, SpecParser};
//!
//! let parser = RamlParser::from_file("api.raml")?;
//! let model = parser.parse()?;
//! ```

mod converter;
mod parser;

pub use converter::{convert_raml_to_openapi, type_schema};
pub use parser::RamlParser;
