use log::{debug, error, info, warn};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;

use crate::error::ManifestError;
use crate::manifest::Manifest;

/// Manifest parser for JSON and YAML formats
pub struct ManifestParser;

impl ManifestParser {
    /// Parse a manifest from a JSON string
    pub fn from_json(json_str: &str) -> Result<Manifest, ManifestError> {
        Self::from_json_with_context(json_str, None)
    }

    /// Parse a manifest from a JSON string, naming the source file in errors
    pub fn from_json_with_context(json_str: &str, file_path: Option<&str>) -> Result<Manifest, ManifestError> {
        let context = Self::context(file_path);
        debug!("Parsing manifest from JSON{} ({} bytes)", context, json_str.len());

        if json_str.trim().is_empty() {
            error!("Manifest JSON string is empty{}", context);
            return Err(ManifestError::Empty(context));
        }

        let manifest = serde_json::from_str::<Manifest>(json_str).map_err(|e| {
            error!("Failed to parse manifest from JSON{}: {}", context, e);

            let detail = match e.classify() {
                serde_json::error::Category::Io => format!("I/O issue: {}", e),
                serde_json::error::Category::Syntax => {
                    format!("syntax error at line {}, column {}: {}", e.line(), e.column(), e)
                }
                serde_json::error::Category::Data => format!("invalid manifest structure: {}", e),
                serde_json::error::Category::Eof => format!("unexpected end of input: {}", e),
            };
            ManifestError::Parse {
                context: context.clone(),
                detail,
            }
        })?;

        Self::validate(&manifest)?;
        info!(
            "Parsed manifest{}: version {}, {} models",
            context,
            manifest.version,
            manifest.models.len()
        );
        Ok(manifest)
    }

    /// Parse a manifest from a YAML string
    #[cfg(feature = "yaml-support")]
    pub fn from_yaml(yaml_str: &str) -> Result<Manifest, ManifestError> {
        Self::from_yaml_with_context(yaml_str, None)
    }

    /// Parse a manifest from a YAML string, naming the source file in errors
    #[cfg(feature = "yaml-support")]
    pub fn from_yaml_with_context(yaml_str: &str, file_path: Option<&str>) -> Result<Manifest, ManifestError> {
        let context = Self::context(file_path);
        debug!("Parsing manifest from YAML{} ({} bytes)", context, yaml_str.len());

        if yaml_str.trim().is_empty() {
            error!("Manifest YAML string is empty{}", context);
            return Err(ManifestError::Empty(context));
        }

        let manifest = serde_yaml::from_str::<Manifest>(yaml_str).map_err(|e| {
            error!("Failed to parse manifest from YAML{}: {}", context, e);

            let detail = match e.location() {
                Some(location) => format!(
                    "syntax error at line {}, column {}: {}",
                    location.line(),
                    location.column(),
                    e
                ),
                None => e.to_string(),
            };
            ManifestError::Parse {
                context: context.clone(),
                detail,
            }
        })?;

        Self::validate(&manifest)?;
        info!(
            "Parsed manifest{}: version {}, {} models",
            context,
            manifest.version,
            manifest.models.len()
        );
        Ok(manifest)
    }

    /// Load a manifest file; `.yaml`/`.yml` files are parsed as YAML, anything else as JSON
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        info!("Loading manifest from file: {}", display);

        let content = fs::read_to_string(path).await.map_err(|source| {
            error!("Failed to read manifest file '{}': {}", display, source);
            ManifestError::Io {
                path: display.clone(),
                source,
            }
        })?;

        if content.len() > 10_000_000 {
            warn!("Manifest file is very large ({} bytes): {}", content.len(), display);
        }

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        match extension {
            "yaml" | "yml" => {
                #[cfg(feature = "yaml-support")]
                {
                    Self::from_yaml_with_context(&content, Some(display.as_str()))
                }
                #[cfg(not(feature = "yaml-support"))]
                {
                    error!("YAML support not enabled for file: {}", display);
                    Err(ManifestError::Parse {
                        context: Self::context(Some(display.as_str())),
                        detail: "YAML support not enabled; enable the 'yaml-support' feature".to_string(),
                    })
                }
            }
            "json" => Self::from_json_with_context(&content, Some(display.as_str())),
            _ => {
                debug!("Unknown extension for {}, parsing as JSON", display);
                Self::from_json_with_context(&content, Some(display.as_str()))
            }
        }
    }

    /// Serialize a manifest to pretty-printed JSON
    pub fn to_json(manifest: &Manifest) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(manifest).map_err(|e| ManifestError::Parse {
            context: String::new(),
            detail: format!("serialization failed: {}", e),
        })
    }

    /// Check the version format and that every model definition builds
    pub fn validate(manifest: &Manifest) -> Result<(), ManifestError> {
        if !Self::is_valid_version(&manifest.version) {
            return Err(ManifestError::InvalidVersion(manifest.version.clone()));
        }

        manifest.definitions()?;
        debug!("Manifest version {} is valid", manifest.version);
        Ok(())
    }

    /// `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`
    pub fn is_valid_version(version: &str) -> bool {
        static VERSION: OnceLock<Option<Regex>> = OnceLock::new();
        VERSION
            .get_or_init(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").ok())
            .as_ref()
            .map_or(false, |regex| regex.is_match(version))
    }

    fn context(file_path: Option<&str>) -> String {
        file_path
            .map(|p| format!(" (file: {})", p))
            .unwrap_or_default()
    }
}
