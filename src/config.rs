use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::aggregate::MAX_HISTOGRAM_BINS;
use crate::data::catalog::CatalogOptions;
use crate::data::filter::AgeRange;
use crate::error::ConfigError;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "shopping-trends.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub filters: FilterDefaults,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Dataset loaded when `--data` is not given.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    /// Initial age range; `None` uses the observed bounds of the dataset.
    pub age_range: Option<AgeRange>,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            age_range: Some(AgeRange(18, 70)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
    pub preview_rows: usize,
    pub histogram_bins: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            preview_rows: 5,
            histogram_bins: CatalogOptions::default().histogram_bins,
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit path, or from [`DEFAULT_CONFIG_FILE`] if present.
    ///
    /// An explicit path must exist and parse. The default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig = toml::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        config.validate().map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let bins = self.output.histogram_bins;
        if !(1..=MAX_HISTOGRAM_BINS).contains(&bins) {
            return Err(format!(
                "output.histogram_bins must be between 1 and {MAX_HISTOGRAM_BINS}, got {bins}"
            ));
        }
        if let Some(range) = self.filters.age_range {
            if range.min() > range.max() {
                return Err(format!(
                    "filters.age_range is inverted: [{}, {}]",
                    range.min(),
                    range.max()
                ));
            }
        }
        Ok(())
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            histogram_bins: self.output.histogram_bins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{name}", std::process::id()))
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [output]
            histogram_bins = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.output.histogram_bins, 10);
        assert!(config.output.pretty);
        assert_eq!(config.filters.age_range, Some(AgeRange(18, 70)));
        assert_eq!(config.data.path, None);
    }

    #[test]
    fn reads_age_range_and_path() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [data]
            path = "shopping_trends.csv"

            [filters]
            age_range = [25, 40]
            "#,
        )
        .unwrap();
        assert_eq!(config.filters.age_range, Some(AgeRange(25, 40)));
        assert_eq!(config.data.path, Some(PathBuf::from("shopping_trends.csv")));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = temp_path("shopping-trends-no-such-config.toml");
        let err = DashboardConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let path = temp_path("shopping-trends-bad-config.toml");
        fs::write(&path, "[output]\npretty = \"yes\"\n").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("shopping-trends-bad-config.toml"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let path = temp_path("shopping-trends-huge-bins.toml");
        fs::write(&path, "[output]\nhistogram_bins = 1000000000000\n").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
        assert!(err.to_string().contains("histogram_bins"), "{err}");

        fs::write(&path, "[filters]\nage_range = [70, 18]\n").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("age_range"), "{err}");

        fs::write(&path, "[output]\nhistogram_bins = 50\n").unwrap();
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.catalog_options().histogram_bins, 50);
        let _ = fs::remove_file(&path);
    }
}
