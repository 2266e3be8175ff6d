//! specforge CLI
//!
//! Command-line interface for turning OpenAPI and RAML specifications into
//! API clients, documentation and mock servers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::Value;
use specforge_common::SpecificationModel;
use specforge_generator::{ApiGenerator, EmitOptions, GeneratorConfig, PluginManager};
use specforge_parser::{create_parser, SpecFormat};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specforge")]
#[command(version, about = "Generate API clients, docs and mock servers from OpenAPI and RAML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a specification and display the extracted model
    #[command(after_help = "EXAMPLES:\n  \
        # Summarize an OpenAPI document\n  \
        specforge parse --input petstore.yaml\n\n  \
        # Dump the model as JSON, keeping only version 2 endpoints\n  \
        specforge parse --input petstore.yaml --api-version 2 --json")]
    Parse {
        /// Path to the specification file
        #[arg(short, long)]
        input: PathBuf,

        /// Specification format
        #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Openapi)]
        spec_format: FormatArg,

        /// Keep only endpoints tagged with this `x-api-version`
        #[arg(long)]
        api_version: Option<String>,

        /// Print the whole model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a client (and optional artifacts) from a specification
    #[command(after_help = "EXAMPLES:\n  \
        # Async Python client only\n  \
        specforge generate --input petstore.yaml --output out/petstore.py\n\n  \
        # Everything: sync + JS clients, docs and a mock server\n  \
        specforge generate \\\n    \
        --input petstore.yaml \\\n    \
        --output out/petstore.py \\\n    \
        --sync --js --docs --mock-server\n\n  \
        # One client per document under a directory\n  \
        specforge generate --input specs/ --output out/ --recursive\n\n  \
        # Add a header to the generated client\n  \
        specforge generate -i petstore.yaml -o client.py \\\n    \
        --execute-plugin custom_header --plugin-arg X-Api-Key --plugin-arg secret")]
    Generate {
        /// Specification file, or a directory with --recursive
        #[arg(short, long)]
        input: PathBuf,

        /// Client file, or a directory with --recursive
        #[arg(short, long, default_value = "client.py")]
        output: PathBuf,

        /// Process every .json/.yaml/.yml file under the input directory
        #[arg(short, long)]
        recursive: bool,

        /// Custom template for the async client
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Also generate a mock server
        #[arg(long)]
        mock_server: bool,

        /// Also generate Markdown and HTML documentation
        #[arg(long)]
        docs: bool,

        /// Also generate a synchronous client
        #[arg(long)]
        sync: bool,

        /// Also generate a JavaScript client
        #[arg(long)]
        js: bool,

        /// Keep only endpoints tagged with this `x-api-version`
        #[arg(long)]
        api_version: Option<String>,

        /// Specification format
        #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Openapi)]
        spec_format: FormatArg,

        /// Directory of plugin manifests (*.yaml)
        #[arg(long)]
        plugins_dir: Option<PathBuf>,

        /// Run a plugin over the generated client
        #[arg(long)]
        execute_plugin: Option<String>,

        /// Argument passed to --execute-plugin (repeatable)
        #[arg(long = "plugin-arg", requires = "execute_plugin")]
        plugin_args: Vec<String>,

        /// Generator configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List available plugins
    Plugins {
        /// Directory of plugin manifests (*.yaml)
        #[arg(long)]
        plugins_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// OpenAPI 3 (JSON or YAML)
    Openapi,
    /// RAML 1.0
    Raml,
}

impl From<FormatArg> for SpecFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Openapi => SpecFormat::OpenApi,
            FormatArg::Raml => SpecFormat::Raml,
        }
    }
}

/// Everything `generate` needs besides the input and output paths
struct GenerateOptions {
    format: SpecFormat,
    api_version: Option<String>,
    template: Option<PathBuf>,
    plugins_dir: Option<PathBuf>,
    plugin: Option<(String, Vec<String>)>,
    emit: EmitOptions,
    config: GeneratorConfig,
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            input,
            spec_format,
            api_version,
            json,
        } => {
            parse_command(&input, spec_format.into(), api_version.as_deref(), json, cli.verbose)?;
        }

        Commands::Generate {
            input,
            output,
            recursive,
            template,
            mock_server,
            docs,
            sync,
            js,
            api_version,
            spec_format,
            plugins_dir,
            execute_plugin,
            plugin_args,
            config,
        } => {
            let config = match config {
                Some(path) => GeneratorConfig::load(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => GeneratorConfig::default(),
            };

            let options = GenerateOptions {
                format: spec_format.into(),
                api_version,
                template,
                plugins_dir,
                plugin: execute_plugin.map(|name| (name, plugin_args)),
                emit: EmitOptions {
                    sync_client: sync,
                    js_client: js,
                    documentation: docs,
                    mock_server,
                },
                config,
                verbose: cli.verbose,
            };

            if recursive {
                generate_recursive_command(&input, &output, &options)?;
            } else {
                generate_command(&input, &output, &options)?;
            }
        }

        Commands::Plugins { plugins_dir } => {
            plugins_command(plugins_dir.as_deref())?;
        }
    }

    Ok(())
}

/// Route `tracing` output to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// Parse `input` into the model plus its decoded, version-filtered document
fn load_spec(
    input: &Path,
    format: SpecFormat,
    api_version: Option<&str>,
) -> Result<(SpecificationModel, Value)> {
    tracing::debug!(path = %input.display(), %format, "loading specification");
    let parser = create_parser(input, format, api_version)
        .with_context(|| format!("Failed to load {} spec: {}", format, input.display()))?;
    let model = parser
        .parse()
        .with_context(|| format!("Failed to parse {} spec: {}", format, input.display()))?;
    Ok((model, parser.document().clone()))
}

fn parse_command(
    input: &Path,
    format: SpecFormat,
    api_version: Option<&str>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let (model, _) = load_spec(input, format, api_version)?;

    if json {
        let text = serde_json::to_string_pretty(&model).context("Failed to serialize model")?;
        println!("{}", text);
        return Ok(());
    }

    println!("{} Parsing spec file: {}", "→".cyan(), input.display());
    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "Specification Model:".bold());
    println!("  Title: {}", model.info.title.yellow());
    println!("  Version: {}", model.info.version.yellow());
    println!("  Servers: {}", model.servers.len());
    println!("  Endpoints: {}", model.endpoints.len());
    println!("  Schemas: {}", model.schemas.len());

    if verbose {
        println!("\n{}", "Endpoints:".bold());
        for (key, endpoint) in &model.endpoints {
            let label = if endpoint.operation_id.is_empty() {
                endpoint.summary.as_str()
            } else {
                endpoint.operation_id.as_str()
            };
            println!("  • {} {}", key.cyan(), label);
        }
        if !model.schemas.is_empty() {
            println!("\n{}", "Schemas:".bold());
            for (name, schema) in &model.schemas {
                println!("  • {}: {}", name.cyan(), schema);
            }
        }
    }

    Ok(())
}

fn build_generator(
    model: SpecificationModel,
    document: Value,
    options: &GenerateOptions,
) -> Result<ApiGenerator> {
    let mut generator = ApiGenerator::new(model)
        .context("Failed to create generator")?
        .with_document(document)
        .with_config(options.config.clone());

    if let Some(template) = &options.template {
        generator = generator
            .with_client_template(template)
            .with_context(|| format!("Failed to load template: {}", template.display()))?;
    }
    if let Some(dir) = &options.plugins_dir {
        generator = generator
            .with_plugins_dir(dir)
            .with_context(|| format!("Failed to load plugins from {}", dir.display()))?;
    }

    Ok(generator)
}

fn generate_command(input: &Path, output: &Path, options: &GenerateOptions) -> Result<()> {
    println!(
        "{} Generating API client from: {}",
        "→".cyan(),
        input.display()
    );

    if options.verbose {
        println!("  Format: {}", options.format);
        if let Some(version) = &options.api_version {
            println!("  API version: {}", version);
        }
        println!("  Output: {}", output.display());
    }

    println!("{} Parsing spec...", "→".cyan());
    let (model, document) = load_spec(input, options.format, options.api_version.as_deref())?;
    println!(
        "{} Parsed {} endpoints, {} schemas",
        "✓".green(),
        model.endpoints.len(),
        model.schemas.len()
    );

    println!("{} Generating files...", "→".cyan());
    let generator = build_generator(model, document, options)?;
    let written = generator
        .generate_all(output, &options.emit)
        .context("Failed to generate API artifacts")?;

    if let Some((name, args)) = &options.plugin {
        generator
            .apply_plugin_to_file(name, output, args)
            .with_context(|| format!("Failed to execute plugin '{}'", name))?;
        println!("{} Applied plugin {}", "✓".green(), name.yellow());
    }

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    for path in &written {
        println!("  📄 {}", path.display());
    }

    Ok(())
}

/// Generate a client for every document under `input_dir`
///
/// `input_dir/a/api.yaml` lands at `output_dir/a/api.py`. A document that
/// fails to parse or render is reported and skipped, as is one whose output
/// an earlier document already produced (`api.json` next to `api.yaml`).
fn generate_recursive_command(
    input_dir: &Path,
    output_dir: &Path,
    options: &GenerateOptions,
) -> Result<()> {
    println!(
        "{} Scanning directory for specs: {}",
        "→".cyan(),
        input_dir.display()
    );
    let specs = discover_specs(input_dir, options.format, options.verbose)?;
    if specs.is_empty() {
        anyhow::bail!("No spec files found in {}", input_dir.display());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut generated = 0;
    let mut skipped = 0;
    let mut written: HashSet<PathBuf> = HashSet::new();
    for (i, spec_path) in specs.iter().enumerate() {
        println!(
            "{} Processing spec {}/{}: {}",
            "→".cyan(),
            i + 1,
            specs.len(),
            spec_path.display()
        );

        let relative = spec_path
            .strip_prefix(input_dir)
            .ok()
            .or_else(|| spec_path.file_name().map(Path::new))
            .unwrap_or_else(|| Path::new("client"));
        let output = output_dir.join(relative).with_extension("py");
        if written.contains(&output) {
            eprintln!(
                "{} Skipping {}: {} was already generated",
                "⚠".yellow(),
                spec_path.display(),
                output.display()
            );
            skipped += 1;
            continue;
        }

        let result: Result<()> = (|| {
            let (model, document) =
                load_spec(spec_path, options.format, options.api_version.as_deref())?;
            let generator = build_generator(model, document, options)?;
            generator
                .generate(&output)
                .with_context(|| format!("Failed to generate client for {}", spec_path.display()))?;
            if let Some((name, args)) = &options.plugin {
                generator
                    .apply_plugin_to_file(name, &output, args)
                    .with_context(|| format!("Failed to execute plugin '{}'", name))?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                println!("{} Generated {}", "✓".green(), output.display());
                written.insert(output);
                generated += 1;
            }
            Err(e) => {
                eprintln!("{} Skipping {}: {:#}", "⚠".yellow(), spec_path.display(), e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        println!(
            "\n{} Skipped {} spec(s) due to errors",
            "⚠".yellow(),
            skipped
        );
    }
    println!(
        "\n{} Generated {} client(s) in {}",
        "✓".green().bold(),
        generated,
        output_dir.display()
    );

    Ok(())
}

/// Extensions picked up by recursive mode
fn is_spec_file(path: &Path, format: SpecFormat) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json" | "yaml" | "yml") => true,
        Some("raml") => format == SpecFormat::Raml,
        _ => false,
    }
}

/// Collect spec files under `dir`, sorted
fn discover_specs(dir: &Path, format: SpecFormat, verbose: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    fn walk_dir(dir: &Path, specs: &mut Vec<PathBuf>, format: SpecFormat, verbose: bool) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk_dir(&path, specs, format, verbose)?;
            } else if path.is_file() && is_spec_file(&path, format) {
                if verbose {
                    println!("  Found: {}", path.display());
                }
                specs.push(path);
            }
        }
        Ok(())
    }

    let mut specs = Vec::new();
    walk_dir(dir, &mut specs, format, verbose)?;
    specs.sort();

    println!("{} Discovered {} spec files", "✓".green(), specs.len());
    Ok(specs)
}

fn plugins_command(plugins_dir: Option<&Path>) -> Result<()> {
    let mut manager = PluginManager::new();
    if let Some(dir) = plugins_dir {
        manager
            .load_dir(dir)
            .with_context(|| format!("Failed to load plugins from {}", dir.display()))?;
    }

    println!("{}", "Available plugins:".bold());
    for name in manager.list() {
        let description = manager
            .get(&name)
            .map(|plugin| plugin.description())
            .unwrap_or_default();
        println!("  • {} - {}", name.cyan(), description);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_spec_file() {
        assert!(is_spec_file(Path::new("a/petstore.yaml"), SpecFormat::OpenApi));
        assert!(is_spec_file(Path::new("a/petstore.yml"), SpecFormat::OpenApi));
        assert!(is_spec_file(Path::new("petstore.json"), SpecFormat::OpenApi));
        assert!(!is_spec_file(Path::new("notes.txt"), SpecFormat::OpenApi));
        assert!(!is_spec_file(Path::new("library.raml"), SpecFormat::OpenApi));
        assert!(is_spec_file(Path::new("library.raml"), SpecFormat::Raml));
        assert!(!is_spec_file(Path::new("Makefile"), SpecFormat::OpenApi));
    }

    #[test]
    fn test_format_arg_maps_to_spec_format() {
        assert_eq!(SpecFormat::from(FormatArg::Openapi), SpecFormat::OpenApi);
        assert_eq!(SpecFormat::from(FormatArg::Raml), SpecFormat::Raml);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
