use crate::error::Error;
use crate::merge::TimestampSource;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A named root directory taking part in comparison or merge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub name: String,
    pub path: PathBuf,
}

impl Location {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub compare_with: TimestampSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecoverConfig {
    /// Snapshot cache directories, most recent first.
    pub cache_dirs: Vec<PathBuf>,
    /// File names `recover latest` looks for when none are given. The menu
    /// compares them between locations.
    pub critical_files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub locations: Vec<Location>,
    /// Extension (without the dot) of files to inventory. Empty means all files.
    pub extension: String,
    pub ignore_patterns: Vec<String>,
    /// Directory CSV reports are written to.
    pub out_dir: PathBuf,
    /// External diff command; the two file paths are appended.
    pub diff_tool: Vec<String>,
    /// External editor command; the file path is appended.
    pub editor: Vec<String>,
    pub merge: MergeConfig,
    pub recover: RecoverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            extension: "swift".to_string(),
            ignore_patterns: Vec::new(),
            out_dir: PathBuf::from("."),
            diff_tool: vec!["diff".to_string(), "-u".to_string()],
            editor: vec!["code".to_string()],
            merge: MergeConfig::default(),
            recover: RecoverConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn extension_filter(&self) -> Option<&str> {
        let ext = self.extension.trim_start_matches('.');
        if ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }

    pub fn location(&self, name: &str) -> Result<&Location, Error> {
        self.locations
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| Error::UnknownLocation(name.to_string()))
    }

    /// Reject unnamed or duplicate locations; warn about nested roots, whose
    /// files would be inventoried twice.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for location in &self.locations {
            if location.name.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "location with path {} has no name",
                    location.path.display()
                )));
            }
            if !seen.insert(location.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate location name '{}'",
                    location.name
                )));
            }
        }

        for (outer, inner) in nested_locations(&self.locations) {
            warn!("Location '{}' is nested inside location '{}'", inner, outer);
        }
        Ok(())
    }
}

/// Load `Config.toml` from the working directory (optional) or `path`
/// (required), then apply `SALVAGE_*` environment overrides.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, Error> {
    let file_source = match path {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name("Config").required(false),
    };
    let builder = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix("SALVAGE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    Ok(config)
}

/// Pairs of (outer, inner) location names where the inner root lives under
/// the outer one.
pub fn nested_locations(locations: &[Location]) -> Vec<(String, String)> {
    let mut result = Vec::new();

    for outer in locations {
        for inner in locations {
            if outer.name == inner.name || outer.path == inner.path {
                continue;
            }
            if inner.path.starts_with(&outer.path) {
                result.push((outer.name.clone(), inner.name.clone()));
            }
        }
    }

    result
}
