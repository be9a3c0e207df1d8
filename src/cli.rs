use crate::deferred::RequestContext;
use crate::documentation::Documentation;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::source::manifest::Manifest;
use crate::source::RouteSource;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Swagger from Routes - Generate Swagger 1.2 documentation from a route manifest
#[derive(Parser, Debug)]
#[command(name = "swagger-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a manifest file or a directory of manifest files
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (directory with --all; stdout if not specified)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Render the document of one resource instead of the listing
    #[arg(short = 'r', long = "resource", value_name = "RESOURCE", conflicts_with = "all")]
    pub resource: Option<String>,

    /// Base URL the documentation is served from, used for `basePath`
    #[arg(long = "base-url", value_name = "URL", default_value = "")]
    pub base_url: String,

    /// Write the listing and every listed resource into the output directory
    #[arg(long = "all", requires = "output_path")]
    pub all: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    fn render<T: Serialize>(self, doc: &T) -> Result<String> {
        match self {
            OutputFormat::Json => serialize_json(doc),
            OutputFormat::Yaml => serialize_yaml(doc),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest path does not exist: {}",
            args.manifest_path.display()
        );
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    match (&args.output_path, args.all) {
        (Some(output), true) => info!("Output directory: {}", output.display()),
        (Some(output), false) => info!("Output file: {}", output.display()),
        (None, _) => info!("Output: stdout"),
    }
    if let Some(resource) = &args.resource {
        info!("Resource: {}", resource);
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting documentation generation...");

    // Step 1: Load and normalize the manifest
    info!("Loading manifest...");
    let manifest = Manifest::load(&args.manifest_path)?;
    let root_name = manifest.catalog.root().name.clone();
    let model_count = manifest.catalog.models().len();
    info!("Documenting app `{}` with {} models", root_name, model_count);

    // Step 2: Mount the documentation service
    info!("Aggregating routes...");
    let docs = Documentation::mount(&manifest.catalog, manifest.config)
        .context("Failed to mount documentation")?;
    let resources = docs.resource_names();
    info!("Found {} listed resources", resources.len());

    let request = RequestContext::new(args.base_url.clone());

    // Step 3: Render and output the requested documents
    if args.all {
        let output_dir = args
            .output_path
            .as_deref()
            .context("--all requires an output directory")?;
        write_all(&docs, &resources, &request, args.output_format, output_dir)?;
    } else {
        let content = match &args.resource {
            Some(name) => {
                info!("Building resource document for `{}`...", name);
                let document = docs
                    .resource(name, &request)
                    .with_context(|| format!("Failed to build resource `{}`", name))?;
                args.output_format.render(&document)?
            }
            None => {
                info!("Building resource listing...");
                args.output_format.render(&docs.listing())?
            }
        };

        if let Some(output_path) = &args.output_path {
            info!("Writing output to: {}", output_path.display());
            write_to_file(&content, output_path)?;
        } else {
            println!("{}", content);
        }
    }

    // Step 4: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Root app: {}", root_name);
    info!("  - Routes aggregated: {}", docs.aggregation().resources.values().map(Vec::len).sum::<usize>());
    info!("  - Resources listed: {}", resources.len());
    info!("  - Models registered: {}", model_count);

    Ok(())
}

/// Mirrors the two documentation endpoints on disk: the listing as
/// `<dir>/<mount>.<ext>` and every resource as `<dir>/<mount>/<name>.<ext>`
fn write_all(
    docs: &Documentation,
    resources: &[String],
    request: &RequestContext,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<()> {
    let mount = match docs.config().mount_path.trim_matches('/') {
        "" => "index",
        mount => mount,
    };
    let extension = format.extension();

    let listing_path = output_dir.join(format!("{}.{}", mount, extension));
    info!("Writing resource listing to {}", listing_path.display());
    write_to_file(&format.render(&docs.listing())?, &listing_path)?;

    for name in resources {
        let document = docs
            .resource(name, request)
            .with_context(|| format!("Failed to build resource `{}`", name))?;
        let path = output_dir.join(mount).join(format!("{}.{}", name, extension));
        debug!("Writing resource `{}` to {}", name, path.display());
        write_to_file(&format.render(&document)?, &path)?;
    }

    info!("Wrote {} resource documents", resources.len());
    Ok(())
}
