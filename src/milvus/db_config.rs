//! Connection settings for a Milvus instance.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::secret::SecretStr;

pub const DEFAULT_URI: &str = "http://localhost:19530";

/// Fields every backend config carries. Empty values are allowed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbConfigCommon {
    pub db_label: String,
    pub version: String,
    pub note: String,
}

impl DbConfigCommon {
    pub const SHORT_FIELDS: [&'static str; 2] = ["version", "db_label"];
    pub const LONG_FIELDS: [&'static str; 1] = ["note"];

    pub fn is_common_field(name: &str) -> bool {
        Self::SHORT_FIELDS.contains(&name) || Self::LONG_FIELDS.contains(&name)
    }
}

/// Deserializes through [`MilvusConfig::from_fields`], so every construction
/// path applies the same normalization and validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct MilvusConfig {
    pub common: DbConfigCommon,
    pub uri: SecretStr,
    pub user: Option<String>,
    pub password: Option<SecretStr>,
}

fn default_uri() -> SecretStr {
    SecretStr::from(DEFAULT_URI)
}

impl Default for MilvusConfig {
    fn default() -> Self {
        Self {
            common: DbConfigCommon::default(),
            uri: default_uri(),
            user: None,
            password: None,
        }
    }
}

impl TryFrom<Map<String, Value>> for MilvusConfig {
    type Error = BenchError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        Self::from_fields(&fields)
    }
}

impl MilvusConfig {
    /// Credential fields are exempt from the non-empty rule.
    pub const CREDENTIAL_FIELDS: [&'static str; 2] = ["user", "password"];

    pub fn new(uri: impl Into<SecretStr>) -> Result<Self> {
        let config = Self {
            uri: uri.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_label(mut self, db_label: impl Into<String>) -> Self {
        self.common.db_label = db_label.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        let user: String = user.into();
        self.user = Some(user).filter(|u| !u.is_empty());
        self
    }

    pub fn with_password(mut self, password: impl Into<SecretStr>) -> Self {
        let password: SecretStr = password.into();
        self.password = Some(password).filter(|p| !p.is_empty());
        self
    }

    /// Build a config from named fields, as produced by the parameter resolver.
    ///
    /// `null` means "not provided". Unknown names are rejected.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        let mut config = Self::default();

        for (name, value) in fields {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                other => {
                    return Err(BenchError::invalid(
                        name,
                        format!("expected a string, got {other}"),
                    ))
                }
            };

            match name.as_str() {
                "db_label" => config.common.db_label = text,
                "version" => config.common.version = text,
                "note" => config.common.note = text,
                "uri" => config.uri = SecretStr::from(text),
                "user" => config = config.with_user(text),
                "password" => config = config.with_password(text),
                _ => {
                    return Err(BenchError::Validation(format!(
                        "unknown milvus config field: {name}"
                    )))
                }
            }
        }

        config.validate()?;
        debug!(db_label = %config.common.db_label, "milvus config built");
        Ok(config)
    }

    /// Reject empty strings outside the common and credential field sets.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.string_fields() {
            if DbConfigCommon::is_common_field(name) || Self::CREDENTIAL_FIELDS.contains(&name) {
                continue;
            }
            if value.is_some_and(str::is_empty) {
                return Err(BenchError::Validation(format!("{name}: empty string")));
            }
        }
        Ok(())
    }

    fn string_fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("db_label", Some(self.common.db_label.as_str())),
            ("version", Some(self.common.version.as_str())),
            ("note", Some(self.common.note.as_str())),
            ("uri", Some(self.uri.expose())),
            ("user", self.user.as_deref()),
            ("password", self.password.as_ref().map(SecretStr::expose)),
        ]
    }

    /// Connection arguments for the Milvus client, secrets unwrapped.
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("uri".into(), Value::from(self.uri.expose()));
        dict.insert(
            "user".into(),
            self.user
                .as_deref()
                .filter(|u| !u.is_empty())
                .map_or(Value::Null, Value::from),
        );
        dict.insert(
            "password".into(),
            self.password
                .as_ref()
                .filter(|p| !p.is_empty())
                .map_or(Value::Null, |p| Value::from(p.expose())),
        );
        dict
    }

    /// [`MilvusConfig::to_dict`] with the password masked, plus the label.
    pub fn redacted(&self) -> Value {
        let mut dict = self.to_dict();
        if let Some(password) = &self.password {
            dict.insert("password".into(), Value::from(password.masked()));
        }
        dict.insert("db_label".into(), Value::from(self.common.db_label.clone()));
        Value::Object(dict)
    }
}
