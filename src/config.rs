//! Harvest configuration.
//!
//! Compiled-in defaults reproduce the UN OCHA oPt harvest. A TOML file and
//! command-line overrides are layered on top, in that order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Config filename picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILENAME: &str = "geoacquire.toml";

pub const DEFAULT_BASE_URL: &str = "https://gis.unocha.org/server/rest/services";
pub const DEFAULT_FOLDER: &str = "Hosted";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads_qgis_ready";
/// WGS84 lat/lon, which desktop GIS tools open without reprojection.
pub const DEFAULT_SPATIAL_REFERENCE: u32 = 4326;
pub const DEFAULT_LARGE_LAYER_THRESHOLD: usize = 100_000;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_INTER_CHUNK_DELAY_MS: u64 = 100;
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Obstacle",
    "Barrier",
    "Checkpoint",
    "Road",
    "Palestine",
    "Gaza",
    "West Bank",
    "Crossing",
    "Fence",
    "Gate",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Settings passed explicitly into the scan and download routines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestConfig {
    /// REST services root of the feature server.
    pub base_url: String,
    /// Catalog folder to scan (`Hosted`); `None` scans the root catalog.
    #[serde(serialize_with = "serialize_folder")]
    pub folder: Option<String>,
    /// Directory the GeoJSON files are written to.
    pub output_dir: PathBuf,
    /// `outSR` code requested for returned geometry.
    pub spatial_reference: u32,
    /// Layers with more features than this need approval.
    pub large_layer_threshold: usize,
    /// Case-insensitive service name filters.
    pub keywords: Vec<String>,
    /// Object IDs per chunk request.
    pub chunk_size: usize,
    /// Pause between chunk requests, in milliseconds.
    pub inter_chunk_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Per-request timeout; `None` keeps the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// Write a cleared folder as `""`, which [`ConfigLayer`] reads back as `None`.
fn serialize_folder<S: Serializer>(
    folder: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(folder.as_deref().unwrap_or(""))
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            folder: Some(DEFAULT_FOLDER.to_string()),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            spatial_reference: DEFAULT_SPATIAL_REFERENCE,
            large_layer_threshold: DEFAULT_LARGE_LAYER_THRESHOLD,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            inter_chunk_delay_ms: DEFAULT_INTER_CHUNK_DELAY_MS,
            user_agent: None,
            request_timeout_secs: None,
        }
    }
}

impl HarvestConfig {
    pub fn inter_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.inter_chunk_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Check values that would make a harvest meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one keyword is required".to_string(),
            ));
        }
        // A blank keyword is a substring of every name.
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "keywords must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply every value set in `layer`, leaving the rest untouched.
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.base_url {
            self.base_url = v;
        }
        if let Some(v) = layer.folder {
            self.folder = Some(v).filter(|f| !f.is_empty());
        }
        if let Some(v) = layer.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = layer.spatial_reference {
            self.spatial_reference = v;
        }
        if let Some(v) = layer.large_layer_threshold {
            self.large_layer_threshold = v;
        }
        if let Some(v) = layer.keywords {
            self.keywords = v;
        }
        if let Some(v) = layer.chunk_size {
            self.chunk_size = v;
        }
        if let Some(v) = layer.inter_chunk_delay_ms {
            self.inter_chunk_delay_ms = v;
        }
        if let Some(v) = layer.user_agent {
            self.user_agent = Some(v);
        }
        if let Some(v) = layer.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
    }
}

/// A partial configuration: one TOML file or the command-line flags.
///
/// An empty `folder` string clears the folder and scans the root catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub base_url: Option<String>,
    pub folder: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub spatial_reference: Option<u32>,
    pub large_layer_threshold: Option<usize>,
    pub keywords: Option<Vec<String>>,
    pub chunk_size: Option<usize>,
    pub inter_chunk_delay_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl ConfigLayer {
    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve which config file to read, if any.
///
/// An explicit path must exist; otherwise `geoacquire.toml` in `cwd` is used
/// when present.
pub fn discover_config_file(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILENAME);
            candidate.is_file().then_some(candidate)
        }
    }
}

/// Build the effective configuration: defaults, then file, then overrides.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: ConfigLayer,
) -> Result<HarvestConfig, ConfigError> {
    let mut config = HarvestConfig::default();

    if let Some(path) = config_file {
        tracing::debug!("Loading config from {}", path.display());
        config.merge(ConfigLayer::from_file(path)?);
    }
    config.merge(overrides);
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HarvestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.inter_chunk_delay(), Duration::from_millis(100));
        assert_eq!(config.large_layer_threshold, 100_000);
        assert_eq!(config.keywords.len(), 10);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoacquire.toml");
        fs::write(
            &path,
            r#"
base_url = "http://localhost:9000/rest/services"
keywords = ["Water"]
chunk_size = 250
spatial_reference = 3857
"#,
        )
        .unwrap();

        let overrides = ConfigLayer {
            chunk_size: Some(10),
            folder: Some(String::new()),
            ..Default::default()
        };
        let config = load_config(Some(&path), overrides).unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/rest/services");
        assert_eq!(config.keywords, vec!["Water".to_string()]);
        assert_eq!(config.spatial_reference, 3857);
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.folder, None);
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "chunk = 5\n").unwrap();

        let err = load_config(Some(&path), ConfigLayer::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let overrides = ConfigLayer {
            chunk_size: Some(0),
            ..Default::default()
        };
        let err = load_config(None, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let overrides = ConfigLayer {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let err = load_config(None, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::BaseUrl { .. }));
    }

    #[test]
    fn test_discover_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover_config_file(None, dir.path()), None);

        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "").unwrap();
        assert_eq!(discover_config_file(None, dir.path()), Some(path));

        let explicit = PathBuf::from("/etc/geoacquire/custom.toml");
        assert_eq!(
            discover_config_file(Some(&explicit), dir.path()),
            Some(explicit)
        );
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let overrides = ConfigLayer {
            keywords: Some(vec![String::new(), "Gaza".to_string()]),
            ..Default::default()
        };
        let err = load_config(None, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let overrides = ConfigLayer {
            keywords: Some(vec![]),
            ..Default::default()
        };
        assert!(load_config(None, overrides).is_err());
    }

    #[test]
    fn test_to_toml_round_trips_through_layer() {
        let config = HarvestConfig::default();
        let rendered = config.to_toml().unwrap();
        let layer: ConfigLayer = toml::from_str(&rendered).unwrap();

        let mut rebuilt = HarvestConfig::default();
        rebuilt.merge(layer);
        assert_eq!(rebuilt, config);
    }

    #[test]
    fn test_cleared_folder_survives_reload() {
        let config = load_config(
            None,
            ConfigLayer {
                folder: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.folder, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        let reloaded = load_config(Some(&path), ConfigLayer::default()).unwrap();
        assert_eq!(reloaded.folder, None);
        assert_eq!(reloaded, config);
    }
}
