use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::plot_spec::ChartKind;
use crate::data::registry::DatasetKind;

/// Config file picked up from the working directory when no argument is given.
pub const DEFAULT_CONFIG_FILE: &str = "region-stats.json";

/// Where the four input tables live and how the dashboard starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub total_file: String,
    pub wage_file: String,
    pub male_file: String,
    pub female_file: String,
    pub default_chart: ChartKind,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            total_file: "Всего.csv".to_string(),
            wage_file: "ЗП.csv".to_string(),
            male_file: "Мужчины.csv".to_string(),
            female_file: "Женщины.csv".to_string(),
            default_chart: ChartKind::Line,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file. A relative `data_dir` is taken relative to the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        Ok(config)
    }

    /// Resolve the command-line argument: a directory of data files, a JSON
    /// config file, or nothing (then `region-stats.json` if present, else defaults).
    pub fn resolve(arg: Option<&Path>) -> Result<Self> {
        match arg {
            Some(path) if path.is_dir() => Ok(Self::with_data_dir(path)),
            Some(path) => Self::load(path),
            None => {
                let default_file = Path::new(DEFAULT_CONFIG_FILE);
                if default_file.is_file() {
                    Self::load(default_file)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn file_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Total => &self.total_file,
            DatasetKind::Male => &self.male_file,
            DatasetKind::Female => &self.female_file,
            DatasetKind::Wage => &self.wage_file,
        }
    }

    /// Full path for every dataset, as consumed by the registry.
    pub fn sources(&self) -> BTreeMap<DatasetKind, PathBuf> {
        DatasetKind::ALL
            .into_iter()
            .map(|kind| (kind, self.data_dir.join(self.file_name(kind))))
            .collect()
    }
}
