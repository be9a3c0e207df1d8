//! Swagger from Routes - Command-line tool for generating Swagger 1.2 documentation.
//!
//! Reads a manifest describing registered applications, routes and models,
//! mounts the documentation service over it and writes the resource listing
//! or resource documents.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Print the resource listing:
//! ```bash
//! swagger-from-routes ./api.yaml
//! ```
//!
//! Write one resource document as YAML:
//! ```bash
//! swagger-from-routes ./api.yaml -r widgets -f yaml -o widgets.yaml
//! ```
//!
//! Write the listing and every resource into a directory:
//! ```bash
//! swagger-from-routes ./manifests --all -o ./docs --base-url https://api.example.org
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_from_routes::cli;

fn main() -> Result<()> {
    // Parse once for the verbose flag, initialize logging, then validate
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swagger from Routes starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
