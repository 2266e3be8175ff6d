//! Client, documentation and mock server generation for specforge
//!
//! This crate renders a `SpecificationModel` into artifacts:
//!
//! - async Python client (`aiohttp`), and a sync variant derived from it
//! - JavaScript client (`fetch`)
//! - Markdown documentation plus an HTML page
//! - FastAPI mock server answering with example payloads
//!
//! Every emitter wraps its failures in `GeneratorError::Configuration`
//! naming the emitter. Templates see the model's views and, under
//! `document`, the raw decoded document the model was built from.

mod config;
mod context;
mod example;
mod naming;
mod plugins;
mod sync;
mod templates;
mod types;

pub use config::{
    AuthConfig, GeneratorConfig, PaginationConfig, PaginationStrategy, RateLimitConfig,
    WebhookConfig,
};
pub use context::{build_context, client_name, EndpointView, ParameterView};
pub use example::{example_value, mock_response, python_literal, MockResponse};
pub use naming::{camel_case, pascal_case, snake_case};
pub use plugins::{
    CustomHeaderPlugin, InsertPosition, InsertionPlugin, Plugin, PluginManager, PluginManifest,
};
pub use sync::convert_to_sync;
pub use types::{js_type, python_type};

use serde_json::Value;
use specforge_common::{GeneratorError, Result, SpecificationModel};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;

const ASYNC_CLIENT_EMITTER: &str = "API client";
const SYNC_CLIENT_EMITTER: &str = "synchronous API client";
const JS_CLIENT_EMITTER: &str = "JavaScript API client";
const DOCS_EMITTER: &str = "API documentation";
const MOCK_SERVER_EMITTER: &str = "mock server";

/// File names of artifacts written next to the main client
pub const SYNC_CLIENT_FILE: &str = "sync_client.py";
pub const JS_CLIENT_FILE: &str = "js_client.js";
pub const DOCS_FILE: &str = "api_documentation.md";
pub const MOCK_SERVER_DIR: &str = "mock_server";
pub const MOCK_SERVER_FILE: &str = "mock_server.py";

/// Optional artifacts emitted alongside the async client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    pub sync_client: bool,
    pub js_client: bool,
    pub documentation: bool,
    pub mock_server: bool,
}

/// API artifact generator
///
/// Holds the model, the generator configuration, the loaded templates and
/// the plugin registry. Rendering never mutates the model, so one generator
/// can emit any number of artifacts.
pub struct ApiGenerator {
    model: SpecificationModel,
    document: Value,
    config: GeneratorConfig,
    tera: Tera,
    plugins: PluginManager,
}

impl ApiGenerator {
    /// Create a generator with default configuration and built-in plugins
    pub fn new(model: SpecificationModel) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            model,
            document: Value::Null,
            config: GeneratorConfig::default(),
            tera,
            plugins: PluginManager::new(),
        })
    }

    /// Expose the decoded source document to templates as `document`
    ///
    /// Without it `document` renders as null.
    pub fn with_document(mut self, document: Value) -> Self {
        self.document = document;
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the built-in async client template with a template file
    ///
    /// The sync client is derived from whatever this template renders.
    pub fn with_client_template(mut self, path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| {
            GeneratorError::configuration(ASYNC_CLIENT_EMITTER, format!("{}: {}", path.display(), e))
        })?;
        templates::override_template(&mut self.tera, templates::ASYNC_CLIENT, &source)?;
        tracing::debug!(template = %path.display(), "using custom client template");
        Ok(self)
    }

    /// Load manifest plugins from a directory
    pub fn with_plugins_dir(mut self, dir: &Path) -> Result<Self> {
        let loaded = self.plugins.load_dir(dir)?;
        tracing::debug!(dir = %dir.display(), loaded, "loaded plugins");
        Ok(self)
    }

    /// Register an additional plugin
    pub fn with_plugin(mut self, plugin: Box<dyn Plugin>) -> Self {
        self.plugins.register(plugin);
        self
    }

    pub fn model(&self) -> &SpecificationModel {
        &self.model
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    fn render(&self, template: &str, emitter: &str) -> Result<String> {
        let mut context = build_context(&self.model, &self.config);
        context.insert("document", &self.document);
        self.tera
            .render(template, &context)
            .map_err(|e| GeneratorError::configuration(emitter, templates::describe(&e)))
    }

    fn write(&self, path: &Path, contents: &str, emitter: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GeneratorError::configuration(emitter, e))?;
        }
        fs::write(path, contents).map_err(|e| GeneratorError::configuration(emitter, e))?;
        tracing::info!(path = %path.display(), "{} generated", emitter);
        Ok(())
    }

    /// Render the async Python client
    pub fn render_async_client(&self) -> Result<String> {
        self.render(templates::ASYNC_CLIENT, ASYNC_CLIENT_EMITTER)
    }

    /// Render the sync Python client (the async client, converted)
    pub fn render_sync_client(&self) -> Result<String> {
        let async_code = self.render(templates::ASYNC_CLIENT, SYNC_CLIENT_EMITTER)?;
        Ok(convert_to_sync(&async_code))
    }

    pub fn render_js_client(&self) -> Result<String> {
        self.render(templates::JS_CLIENT, JS_CLIENT_EMITTER)
    }

    /// Render Markdown documentation
    pub fn render_documentation(&self) -> Result<String> {
        self.render(templates::DOCS_MARKDOWN, DOCS_EMITTER)
    }

    /// Render the HTML documentation page
    pub fn render_documentation_html(&self) -> Result<String> {
        self.render(templates::DOCS_HTML, DOCS_EMITTER)
    }

    pub fn render_mock_server(&self) -> Result<String> {
        self.render(templates::MOCK_SERVER, MOCK_SERVER_EMITTER)
    }

    /// Write the async Python client to `output_file`
    pub fn generate(&self, output_file: &Path) -> Result<()> {
        let code = self.render_async_client()?;
        self.write(output_file, &code, ASYNC_CLIENT_EMITTER)
    }

    pub fn generate_sync_client(&self, output_file: &Path) -> Result<()> {
        let code = self.render_sync_client()?;
        self.write(output_file, &code, SYNC_CLIENT_EMITTER)
    }

    pub fn generate_js_client(&self, output_file: &Path) -> Result<()> {
        let code = self.render_js_client()?;
        self.write(output_file, &code, JS_CLIENT_EMITTER)
    }

    /// Write Markdown documentation to `output_file` and HTML next to it
    ///
    /// Returns the HTML path.
    pub fn generate_documentation(&self, output_file: &Path) -> Result<PathBuf> {
        let markdown = self.render_documentation()?;
        let html = self.render_documentation_html()?;
        let html_path = output_file.with_extension("html");

        self.write(output_file, &markdown, DOCS_EMITTER)?;
        self.write(&html_path, &html, DOCS_EMITTER)?;
        Ok(html_path)
    }

    /// Write `mock_server.py` into `output_dir`
    pub fn generate_mock_server(&self, output_dir: &Path) -> Result<PathBuf> {
        let code = self.render_mock_server()?;
        let path = output_dir.join(MOCK_SERVER_FILE);
        self.write(&path, &code, MOCK_SERVER_EMITTER)?;
        Ok(path)
    }

    /// Write the async client and every requested sibling artifact
    ///
    /// Siblings land in the client's directory: `sync_client.py`,
    /// `js_client.js`, `api_documentation.md` (+ `.html`) and
    /// `mock_server/mock_server.py`. Returns every written path.
    pub fn generate_all(&self, client_file: &Path, options: &EmitOptions) -> Result<Vec<PathBuf>> {
        let dir = client_file.parent().unwrap_or_else(|| Path::new(""));
        let mut written = Vec::new();

        self.generate(client_file)?;
        written.push(client_file.to_path_buf());

        if options.mock_server {
            written.push(self.generate_mock_server(&dir.join(MOCK_SERVER_DIR))?);
        }
        if options.documentation {
            let docs = dir.join(DOCS_FILE);
            let html = self.generate_documentation(&docs)?;
            written.push(docs);
            written.push(html);
        }
        if options.sync_client {
            let path = dir.join(SYNC_CLIENT_FILE);
            self.generate_sync_client(&path)?;
            written.push(path);
        }
        if options.js_client {
            let path = dir.join(JS_CLIENT_FILE);
            self.generate_js_client(&path)?;
            written.push(path);
        }

        Ok(written)
    }

    /// Run a plugin over generated text
    pub fn execute_plugin(&self, name: &str, code: &str, args: &[String]) -> Result<String> {
        self.plugins.execute(name, code, args)
    }

    /// Run a plugin over a generated file, rewriting it in place
    pub fn apply_plugin_to_file(&self, name: &str, path: &Path, args: &[String]) -> Result<()> {
        let code = fs::read_to_string(path)
            .map_err(|e| GeneratorError::configuration("plugin output", e))?;
        let updated = self.execute_plugin(name, &code, args)?;
        fs::write(path, updated).map_err(|e| GeneratorError::configuration("plugin output", e))?;
        tracing::info!(plugin = name, path = %path.display(), "plugin applied");
        Ok(())
    }

    /// Names of available plugins
    pub fn list_plugins(&self) -> Vec<String> {
        self.plugins.list()
    }

    /// Available plugins with their descriptions
    pub fn describe_plugins(&self) -> Vec<(String, String)> {
        self.plugins
            .list()
            .into_iter()
            .filter_map(|name| {
                let description = self.plugins.get(&name)?.description();
                Some((name, description))
            })
            .collect()
    }
}
