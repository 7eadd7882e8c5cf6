use crate::constants::{
    default_metric_sources, CANDIDATE_SUFFIXES, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_CONFIG_PATH,
    DEFAULT_DATASET_PATH, DEFAULT_SEASONS, DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
    TABLE_FAMILIES,
};
use crate::error::{Result, ScraperError};
use crate::stats::{AggregationConfig, MetricSource};
use crate::stats::derived::is_derived;
use crate::tables::locator::TableCandidates;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seasons kept by the season filter, e.g. "2023-2024"
    pub seasons: Vec<String>,
    pub http: HttpConfig,
    pub output: OutputConfig,
    /// Logical table name -> candidate identifiers, highest priority first
    pub tables: BTreeMap<String, Vec<String>>,
    pub metrics: Vec<MetricSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dataset_path: String,
}

impl Default for Config {
    fn default() -> Self {
        let tables = TABLE_FAMILIES
            .iter()
            .map(|(name, id)| {
                let candidates = CANDIDATE_SUFFIXES
                    .iter()
                    .map(|suffix| format!("{id}{suffix}"))
                    .collect();
                (name.to_string(), candidates)
            })
            .collect();

        let metrics = default_metric_sources()
            .into_iter()
            .map(|(metric, table, aliases)| MetricSource {
                metric,
                table: table.to_string(),
                aliases: aliases.into_iter().map(String::from).collect(),
            })
            .collect();

        Self {
            seasons: DEFAULT_SEASONS.iter().map(|s| s.to_string()).collect(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            tables,
            metrics,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `player_compare.toml` in the
    /// working directory is used when present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.seasons.is_empty() {
            return Err(ScraperError::Config("at least one season is required".into()));
        }
        for (name, candidates) in &self.tables {
            if candidates.is_empty() {
                return Err(ScraperError::Config(format!(
                    "table '{name}' has no candidate identifiers"
                )));
            }
        }

        let mut seen = HashSet::new();
        for source in &self.metrics {
            if is_derived(source.metric) {
                return Err(ScraperError::Config(format!(
                    "metric '{}' is derived and cannot be read from a table",
                    source.metric
                )));
            }
            if !seen.insert(source.metric) {
                return Err(ScraperError::Config(format!(
                    "metric '{}' is configured more than once",
                    source.metric
                )));
            }
            if source.aliases.is_empty() {
                return Err(ScraperError::Config(format!(
                    "metric '{}' has no column aliases",
                    source.metric
                )));
            }
            if !self.tables.contains_key(&source.table) {
                return Err(ScraperError::Config(format!(
                    "metric '{}' points at unknown table '{}'",
                    source.metric, source.table
                )));
            }
        }
        Ok(())
    }

    pub fn table_candidates(&self) -> TableCandidates {
        TableCandidates::new(self.tables.clone())
    }

    pub fn aggregation(&self) -> AggregationConfig {
        AggregationConfig::new(self.metrics.clone())
    }
}
