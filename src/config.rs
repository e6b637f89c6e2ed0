use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BenchError, Result};
use crate::milvus::registry;
use crate::types::IndexType;

pub const CONFIG_PATH_ENV: &str = "VDBBENCH_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub milvus: MilvusSection,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Connection fields read from the `[milvus]` table or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilvusSection {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub db_label: Option<String>,
}

impl MilvusSection {
    /// Named fields for `MilvusConfig::from_fields`; unset entries are `null`.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        for (name, value) in [
            ("uri", &self.uri),
            ("user", &self.user),
            ("password", &self.password),
            ("db_label", &self.db_label),
        ] {
            fields.insert(name.into(), value.clone().map_or(Value::Null, Value::from));
        }
        fields
    }
}

/// Parameter defaults layered under user flags.
///
/// ```toml
/// [defaults.common]
/// metric_type = "COSINE"
///
/// [defaults.GPU_IVF_FLAT]
/// nlist = 2048
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub common: Map<String, Value>,
    #[serde(flatten)]
    pub families: BTreeMap<String, Map<String, Value>>,
}

impl DefaultsConfig {
    pub fn for_index(&self, index: IndexType) -> Option<&Map<String, Value>> {
        self.families
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(index.name()))
            .map(|(_, table)| table)
    }
}

impl Config {
    /// Load config from a TOML file (if given or named by `VDBBENCH_CONFIG`),
    /// then apply environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok());

        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `VDBBENCH_LOG_*` and `MILVUS_*` overrides from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VDBBENCH_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("VDBBENCH_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Some(v) = lookup("MILVUS_URI") {
            self.milvus.uri = Some(v);
        }
        if let Some(v) = lookup("MILVUS_USER") {
            self.milvus.user = Some(v);
        }
        if let Some(v) = lookup("MILVUS_PASSWORD") {
            self.milvus.password = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(BenchError::Config(format!(
                    "logging.format must be 'text' or 'json', got '{other}'"
                )))
            }
        }

        for name in self.defaults.families.keys() {
            let index: IndexType = name.parse().map_err(|_| {
                BenchError::Config(format!("unknown index type in [defaults.{name}]"))
            })?;
            if !registry::is_registered(index) {
                return Err(BenchError::Config(format!(
                    "[defaults.{name}]: index type not supported by milvus"
                )));
            }
        }
        Ok(())
    }
}
