//! Resolved benchmark parameters.
//!
//! User flags are layered over defaults from the config file before an index
//! config is constructed. A `null` value means "not provided" everywhere.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DefaultsConfig;
use crate::error::{BenchError, Result};
use crate::types::{IndexType, MetricType};

/// Field name → value map, as produced from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseParams(Map<String, Value>);

impl CaseParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Set `field` only when a value was given; `None` leaves it untouched.
    pub fn set_opt<T: Into<Value>>(&mut self, field: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.0.insert(field.to_string(), v.into());
        }
        self
    }

    /// Fill in every key of `defaults` that is absent or `null` here.
    pub fn merge_missing(&mut self, defaults: &Map<String, Value>) {
        for (key, value) in defaults {
            if self.get(key).is_none() {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Value for `field`, treating `null` as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn optional_u32(&self, field: &str) -> Result<Option<u32>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let n = value.as_u64().ok_or_else(|| {
            BenchError::invalid(field, format!("expected a non-negative integer, got {value}"))
        })?;
        u32::try_from(n)
            .map(Some)
            .map_err(|_| BenchError::invalid(field, format!("{n} is out of range")))
    }

    pub fn required_u32(&self, index: IndexType, field: &str) -> Result<u32> {
        self.optional_u32(field)?.ok_or_else(|| missing(index, field))
    }

    pub fn u32_or(&self, field: &str, default: u32) -> Result<u32> {
        Ok(self.optional_u32(field)?.unwrap_or(default))
    }

    /// Non-negative number. JSON numbers are always finite.
    pub fn optional_f64(&self, field: &str) -> Result<Option<f64>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let n = value
            .as_f64()
            .ok_or_else(|| BenchError::invalid(field, format!("expected a number, got {value}")))?;
        if n < 0.0 {
            return Err(BenchError::invalid(
                field,
                format!("expected a non-negative number, got {n}"),
            ));
        }
        Ok(Some(n))
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<&str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(BenchError::invalid(
                field,
                format!("expected a string, got {other}"),
            )),
        }
    }

    pub fn required_str(&self, index: IndexType, field: &str) -> Result<String> {
        self.optional_str(field)?
            .map(str::to_string)
            .ok_or_else(|| missing(index, field))
    }

    /// Parse an optional string field into an enum such as `BuildAlgo`.
    pub fn parse_or<T>(&self, field: &str, default: T) -> Result<T>
    where
        T: FromStr<Err = BenchError>,
    {
        match self.optional_str(field)? {
            Some(s) => s.parse(),
            None => Ok(default),
        }
    }

    pub fn metric_type(&self) -> Result<Option<MetricType>> {
        self.optional_str("metric_type")?
            .map(MetricType::from_str)
            .transpose()
    }
}

impl From<Map<String, Value>> for CaseParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn missing(index: IndexType, field: &str) -> BenchError {
    BenchError::MissingRequiredField {
        index,
        field: field.to_string(),
    }
}

/// Layer user values over configured defaults for one index family.
///
/// Precedence, highest first: non-null user values, `[defaults.<NAME>]`,
/// `[defaults.common]`.
pub fn resolve_parameters(
    index: IndexType,
    user: &CaseParams,
    defaults: &DefaultsConfig,
) -> CaseParams {
    let mut resolved = CaseParams::new();
    for (key, value) in user.as_map() {
        if !value.is_null() {
            resolved.set(key, value.clone());
        }
    }

    if let Some(family) = defaults.for_index(index) {
        resolved.merge_missing(family);
    }
    resolved.merge_missing(&defaults.common);

    debug!(
        index = %index,
        user_fields = user.as_map().len(),
        resolved_fields = resolved.as_map().len(),
        "parameters resolved"
    );
    resolved
}
