//! Post-processing plugins for generated code
//!
//! A plugin receives generated text and returns modified text. Plugins
//! come from two places:
//!
//! - built-ins registered by [`PluginManager::new`] (`custom_header`)
//! - YAML manifests in a plugins directory, each declaring an anchor-based
//!   text insertion
//!
//! ## Manifest format
//! ```yaml
//! name: license_banner
//! description: Prepend a license banner
//! position: start          # after | before | start | end
//! anchor: "import aiohttp" # required for after/before
//! text: "# Licensed under {0}"
//! ```
//! `{0}`, `{1}`, ... in `text` are replaced by the plugin arguments.

use indexmap::IndexMap;
use serde::Deserialize;
use specforge_common::{GeneratorError, Result};
use std::fs;
use std::path::Path;

const PLUGIN_EMITTER: &str = "plugin output";

/// Text transformation applied to generated code
#[cfg_attr(test, mockall::automock)]
pub trait Plugin: Send + Sync {
    /// Name used to select the plugin
    fn name(&self) -> String;

    /// One-line summary for listings
    fn description(&self) -> String;

    /// Transform `code` using positional `args`
    fn apply(&self, code: &str, args: &[String]) -> Result<String>;
}

/// Insert a header entry into the client's default header map
///
/// Arguments: header name, header value. The entry goes on the line after
/// the first `headers = {`, indented one level deeper than that line.
pub struct CustomHeaderPlugin;

const HEADERS_ANCHOR: &str = "headers = {";

impl Plugin for CustomHeaderPlugin {
    fn name(&self) -> String {
        "custom_header".to_string()
    }

    fn description(&self) -> String {
        "Add a header to every request made by the generated client".to_string()
    }

    fn apply(&self, code: &str, args: &[String]) -> Result<String> {
        let [header_name, header_value, ..] = args else {
            return Err(GeneratorError::configuration(
                PLUGIN_EMITTER,
                "custom_header expects <header-name> <header-value>",
            ));
        };

        let anchor = code.find(HEADERS_ANCHOR).ok_or_else(|| {
            GeneratorError::configuration(
                PLUGIN_EMITTER,
                format!("anchor '{}' not found in generated code", HEADERS_ANCHOR),
            )
        })?;

        let line_start = code[..anchor].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let indent: String = code[line_start..anchor]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        let entry = format!(
            "{}    '{}': '{}',\n",
            indent,
            escape_single_quoted(header_name),
            escape_single_quoted(header_value)
        );

        Ok(insert_after_line(code, anchor, &entry))
    }
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Insert `text` at the start of the line following the one containing `offset`
fn insert_after_line(code: &str, offset: usize, text: &str) -> String {
    let mut out = String::with_capacity(code.len() + text.len() + 1);
    match code[offset..].find('\n') {
        Some(newline) => {
            let split = offset + newline + 1;
            out.push_str(&code[..split]);
            out.push_str(text);
            out.push_str(&code[split..]);
        }
        None => {
            out.push_str(code);
            out.push('\n');
            out.push_str(text);
        }
    }
    out
}

/// Where a manifest plugin places its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// On the line after the anchor
    #[default]
    After,
    /// On the line before the anchor
    Before,
    /// At the very beginning
    Start,
    /// At the very end
    End,
}

/// A plugin declared in a YAML manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: InsertPosition,
    #[serde(default)]
    pub anchor: Option<String>,
    pub text: String,
}

/// Anchor-based insertion plugin loaded from a manifest
pub struct InsertionPlugin {
    manifest: PluginManifest,
}

impl InsertionPlugin {
    pub fn new(manifest: PluginManifest) -> Self {
        Self { manifest }
    }

    /// Substitute `{n}` placeholders with arguments
    fn render(&self, args: &[String]) -> Result<String> {
        let mut text = self.manifest.text.clone();
        let mut index = 0;
        while let Some(start) = text[index..].find('{') {
            let start = index + start;
            let Some(len) = text[start + 1..].find('}') else {
                break;
            };
            let end = start + 1 + len;
            match text[start + 1..end].parse::<usize>() {
                Ok(n) => {
                    let arg = args.get(n).ok_or_else(|| {
                        GeneratorError::configuration(
                            PLUGIN_EMITTER,
                            format!("{} expects at least {} argument(s)", self.manifest.name, n + 1),
                        )
                    })?;
                    text.replace_range(start..=end, arg);
                    index = start + arg.len();
                }
                Err(_) => index = end + 1,
            }
        }
        Ok(text)
    }
}

impl Plugin for InsertionPlugin {
    fn name(&self) -> String {
        self.manifest.name.clone()
    }

    fn description(&self) -> String {
        self.manifest.description.clone()
    }

    fn apply(&self, code: &str, args: &[String]) -> Result<String> {
        let mut text = self.render(args)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }

        let locate = || -> Result<usize> {
            let anchor = self.manifest.anchor.as_deref().ok_or_else(|| {
                GeneratorError::configuration(
                    PLUGIN_EMITTER,
                    format!("{} needs an anchor for this position", self.manifest.name),
                )
            })?;
            code.find(anchor).ok_or_else(|| {
                GeneratorError::configuration(
                    PLUGIN_EMITTER,
                    format!("anchor '{}' not found in generated code", anchor),
                )
            })
        };

        Ok(match self.manifest.position {
            InsertPosition::Start => format!("{}{}", text, code),
            InsertPosition::End => {
                let separator = if code.is_empty() || code.ends_with('\n') { "" } else { "\n" };
                format!("{}{}{}", code, separator, text)
            }
            InsertPosition::After => insert_after_line(code, locate()?, &text),
            InsertPosition::Before => {
                let offset = locate()?;
                let line_start = code[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
                format!("{}{}{}", &code[..line_start], text, &code[line_start..])
            }
        })
    }
}

/// Registry of plugins by name
pub struct PluginManager {
    plugins: IndexMap<String, Box<dyn Plugin>>,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    /// Registry holding the built-in plugins
    pub fn new() -> Self {
        let mut manager = Self::empty();
        manager.register(Box::new(CustomHeaderPlugin));
        manager
    }

    /// Registry without any plugin
    pub fn empty() -> Self {
        Self {
            plugins: IndexMap::new(),
        }
    }

    /// Add a plugin, replacing any plugin with the same name
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name();
        if self.plugins.contains_key(&name) {
            tracing::debug!(plugin = %name, "replacing previously registered plugin");
        }
        self.plugins.insert(name, plugin);
    }

    /// Load every `.yaml`/`.yml` manifest in `dir`, in file name order
    ///
    /// Returns the number of plugins loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut manifests: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
            })
            .collect();
        manifests.sort();

        for path in &manifests {
            let content = fs::read_to_string(path)?;
            let manifest: PluginManifest = serde_yaml::from_str(&content).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Invalid plugin manifest {}: {}",
                    path.display(),
                    e
                ))
            })?;
            tracing::debug!(plugin = %manifest.name, path = %path.display(), "loaded plugin manifest");
            self.register(Box::new(InsertionPlugin::new(manifest)));
        }

        Ok(manifests.len())
    }

    /// Names of registered plugins, in registration order
    pub fn list(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    /// Run a plugin by name
    pub fn execute(&self, name: &str, code: &str, args: &[String]) -> Result<String> {
        let plugin = self.get(name).ok_or_else(|| {
            GeneratorError::configuration(PLUGIN_EMITTER, format!("Plugin '{}' not found", name))
        })?;
        plugin.apply(code, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLIENT: &str = "class Client:\n    def __init__(self):\n        self.headers = {\n            'Accept': 'application/json',\n        }\n";

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_custom_header_inserted_after_anchor() {
        let out = CustomHeaderPlugin
            .apply(CLIENT, &args(&["X-Api-Key", "secret"]))
            .unwrap();
        assert_eq!(
            out,
            "class Client:\n    def __init__(self):\n        self.headers = {\n            'X-Api-Key': 'secret',\n            'Accept': 'application/json',\n        }\n"
        );
    }

    #[test]
    fn test_custom_header_requires_anchor_and_args() {
        let err = CustomHeaderPlugin
            .apply("print('hi')\n", &args(&["A", "B"]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration { .. }));

        let err = CustomHeaderPlugin.apply(CLIENT, &args(&["A"])).unwrap_err();
        assert!(err.to_string().contains("custom_header expects"));
    }

    #[test]
    fn test_insertion_plugin_positions() {
        let manifest = |position, anchor: Option<&str>| PluginManifest {
            name: "banner".to_string(),
            description: String::new(),
            position,
            anchor: anchor.map(str::to_string),
            text: "# {0}".to_string(),
        };
        let code = "import a\nimport b\n";
        let license = args(&["MIT"]);

        let start = InsertionPlugin::new(manifest(InsertPosition::Start, None));
        assert_eq!(start.apply(code, &license).unwrap(), "# MIT\nimport a\nimport b\n");

        let end = InsertionPlugin::new(manifest(InsertPosition::End, None));
        assert_eq!(end.apply(code, &license).unwrap(), "import a\nimport b\n# MIT\n");

        let after = InsertionPlugin::new(manifest(InsertPosition::After, Some("import a")));
        assert_eq!(after.apply(code, &license).unwrap(), "import a\n# MIT\nimport b\n");

        let before = InsertionPlugin::new(manifest(InsertPosition::Before, Some("import b")));
        assert_eq!(before.apply(code, &license).unwrap(), "import a\n# MIT\nimport b\n");

        let missing = InsertionPlugin::new(manifest(InsertPosition::After, None));
        assert!(missing.apply(code, &license).is_err());
    }

    #[test]
    fn test_insertion_plugin_missing_argument() {
        let plugin = InsertionPlugin::new(PluginManifest {
            name: "pair".to_string(),
            description: String::new(),
            position: InsertPosition::End,
            anchor: None,
            text: "{0}={1} {not_a_placeholder}".to_string(),
        });
        assert_eq!(
            plugin.apply("", &args(&["a", "b"])).unwrap(),
            "a=b {not_a_placeholder}\n"
        );
        assert!(plugin.apply("", &args(&["a"])).is_err());
    }

    #[test]
    fn test_manager_lists_and_executes() {
        let mut manager = PluginManager::new();
        assert_eq!(manager.list(), vec!["custom_header"]);

        let mut mock = MockPlugin::new();
        mock.expect_name().return_const("upper".to_string());
        mock.expect_apply()
            .withf(|code, args| code.to_string() == "abc" && args.is_empty())
            .times(1)
            .returning(|code, _| Ok(code.to_uppercase()));
        manager.register(Box::new(mock));

        assert_eq!(manager.list(), vec!["custom_header", "upper"]);
        assert_eq!(manager.execute("upper", "abc", &[]).unwrap(), "ABC");
    }

    #[test]
    fn test_unknown_plugin_is_configuration_error() {
        let err = PluginManager::new()
            .execute("missing", "code", &[])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate plugin output: Plugin 'missing' not found"
        );
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("banner.yaml"),
            "name: banner\nposition: start\ntext: \"# generated\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut manager = PluginManager::new();
        assert_eq!(manager.load_dir(dir.path()).unwrap(), 1);
        assert_eq!(manager.list(), vec!["custom_header", "banner"]);
        assert_eq!(
            manager.execute("banner", "x = 1\n", &[]).unwrap(),
            "# generated\nx = 1\n"
        );
    }

    #[test]
    fn test_load_dir_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.yml"), "position: start\n").unwrap();

        let err = PluginManager::new().load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid plugin manifest"));
    }
}
