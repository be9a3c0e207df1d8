use crate::source::manifest::RawManifest;
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Reader for route manifest files.
///
/// The `ManifestParser` reads a manifest file and deserializes it into the
/// loosely typed [`RawManifest`] shape. YAML (`.yaml`, `.yml`) and JSON
/// (`.json`) are supported; the format is chosen by file extension.
///
/// # Example
///
/// ```no_run
/// use swagger_from_routes::parser::ManifestParser;
/// use std::path::Path;
///
/// let parsed = ManifestParser::parse_file(Path::new("api.yaml")).unwrap();
/// println!("Parsed {} apps", parsed.manifest.apps.len());
/// ```
pub struct ManifestParser;

/// A successfully parsed manifest file.
#[derive(Debug)]
pub struct ParsedManifest {
    /// Path to the manifest file
    pub path: PathBuf,
    pub manifest: RawManifest,
}

/// Serialization format of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Detects the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
            Some("json") => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

impl ManifestParser {
    /// Parses a single manifest file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the manifest file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file extension is not a manifest extension
    /// - The file cannot be read
    /// - The content does not match the manifest shape
    pub fn parse_file(path: &Path) -> Result<ParsedManifest> {
        debug!("Parsing manifest: {}", path.display());

        let format = match ManifestFormat::from_path(path) {
            Some(format) => format,
            None => bail!("Unsupported manifest extension: {}", path.display()),
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let manifest = Self::parse_str(&content, format)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        debug!(
            "Successfully parsed manifest: {} ({} apps, {} models)",
            path.display(),
            manifest.apps.len(),
            manifest.models.len()
        );

        Ok(ParsedManifest {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Deserializes manifest content. Blank content is an empty manifest.
    pub fn parse_str(content: &str, format: ManifestFormat) -> crate::error::Result<RawManifest> {
        if content.trim().is_empty() {
            return Ok(RawManifest::default());
        }

        let manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
        };
        Ok(manifest)
    }

    /// Parses multiple manifest files, continuing even if some fail.
    ///
    /// Failures are logged as warnings; the caller decides whether a partial
    /// set of manifests is acceptable.
    ///
    /// # Returns
    ///
    /// One `Result<ParsedManifest>` per input path, in input order.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedManifest>> {
        debug!("Parsing {} manifest files", paths.len());

        let results: Vec<Result<ParsedManifest>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
