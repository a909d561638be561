// ⚙️ Dashboard configuration - JSON file + env overrides

use crate::error::DashboardError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DATA_DIR: &str = "TRADE_DATA_DIR";
pub const ENV_BIND_ADDR: &str = "TRADE_BIND_ADDR";

/// One per-country product detail file, optionally tagged with its year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailSource {
    pub file: String,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory all table file names are relative to
    pub data_dir: PathBuf,

    pub exports_file: String,
    pub imports_file: String,
    pub country_years_file: String,
    pub product_details: Vec<DetailSource>,
    pub images_file: String,

    /// HTTP listen address (server mode)
    pub bind_addr: String,

    /// Rows shown in ranked tables
    pub top_n: usize,

    /// Max characters per wrapped tile label
    pub wrap_width: usize,

    /// Extra static assets served under /static
    pub static_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("data"),
            exports_file: "exports_grouped.csv".to_string(),
            imports_file: "imports_grouped.csv".to_string(),
            country_years_file: "tab3data1.csv".to_string(),
            product_details: vec![DetailSource {
                file: "tab3data2.csv".to_string(),
                year: None,
            }],
            images_file: "image_link.csv".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            top_n: 10,
            wrap_width: 20,
            static_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Load config from a JSON file; missing keys take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: DashboardConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// File (if given) → env overrides → validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => DashboardConfig::from_file(p)?,
            None => DashboardConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|v| !v.is_empty()) {
            self.bind_addr = addr;
        }
    }

    pub fn validate(&self) -> std::result::Result<(), DashboardError> {
        if self.top_n == 0 {
            return Err(DashboardError::InvalidConfig("top_n must be at least 1".to_string()));
        }
        if self.wrap_width == 0 {
            return Err(DashboardError::InvalidConfig("wrap_width must be at least 1".to_string()));
        }
        if self.exports_file.trim().is_empty() || self.imports_file.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(
                "exports_file and imports_file are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.wrap_width, 20);
        assert_eq!(config.path_of("x.csv"), PathBuf::from("data/x.csv"));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"data_dir": "/srv/trade", "top_n": 5,
                "product_details": [{{"file": "2021.csv", "year": 2021}}, {{"file": "2022.csv", "year": 2022}}]}}"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/trade"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.exports_file, "exports_grouped.csv");
        assert_eq!(config.product_details.len(), 2);
        assert_eq!(config.product_details[1].year, Some(2022));
    }

    #[test]
    fn test_bad_json_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_DATA_DIR, "/tmp/trade"), (ENV_BIND_ADDR, "")].into_iter().collect();
        let mut config = DashboardConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/trade"));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let config = DashboardConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DashboardError::InvalidConfig(_))));
    }
}
