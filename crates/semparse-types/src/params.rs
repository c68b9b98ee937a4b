//! Clustering hyperparameters and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Smallest accepted value for either hyperparameter.
pub const PARAM_MIN: i64 = 1;
/// Largest accepted value for either hyperparameter.
pub const PARAM_MAX: i64 = 100;

pub const DEFAULT_MIN_CLUSTER_SIZE: u32 = 5;
pub const DEFAULT_MIN_SAMPLES: u32 = 3;

/// Which hyperparameter a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    MinClusterSize,
    MinSamples,
}

impl ParamField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinClusterSize => "min_cluster_size",
            Self::MinSamples => "min_samples",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hyperparameter validation failure. Never reaches the clustering engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(ParamField),

    #[error("{field} must be a whole number, got {value}")]
    NotAnInteger { field: ParamField, value: String },

    #[error("{field} must be between 1 and 100, got {value}")]
    OutOfRange { field: ParamField, value: i64 },
}

/// Validated clustering hyperparameters, both within `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterParams {
    min_cluster_size: u32,
    min_samples: u32,
}

impl ClusterParams {
    /// Validate a pair of integers.
    pub fn new(min_cluster_size: i64, min_samples: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            min_cluster_size: check_range(ParamField::MinClusterSize, min_cluster_size)?,
            min_samples: check_range(ParamField::MinSamples, min_samples)?,
        })
    }

    pub fn min_cluster_size(&self) -> u32 {
        self.min_cluster_size
    }

    pub fn min_samples(&self) -> u32 {
        self.min_samples
    }
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Unvalidated hyperparameters as they arrive from a form.
///
/// Fields are raw JSON so that missing and non-integer input can be
/// reported precisely instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterParamsInput {
    #[serde(default)]
    pub min_cluster_size: Option<Value>,
    #[serde(default)]
    pub min_samples: Option<Value>,
}

impl ClusterParamsInput {
    pub fn new(min_cluster_size: i64, min_samples: i64) -> Self {
        Self {
            min_cluster_size: Some(Value::from(min_cluster_size)),
            min_samples: Some(Value::from(min_samples)),
        }
    }

    /// Validate both fields, reporting the first failure.
    pub fn validate(&self) -> Result<ClusterParams, ValidationError> {
        let size = parse_integer(ParamField::MinClusterSize, self.min_cluster_size.as_ref())?;
        let samples = parse_integer(ParamField::MinSamples, self.min_samples.as_ref())?;
        ClusterParams::new(size, samples)
    }
}

impl From<ClusterParams> for ClusterParamsInput {
    fn from(params: ClusterParams) -> Self {
        Self::new(params.min_cluster_size as i64, params.min_samples as i64)
    }
}

fn parse_integer(field: ParamField, value: Option<&Value>) -> Result<i64, ValidationError> {
    let value = match value {
        None | Some(Value::Null) => return Err(ValidationError::Missing(field)),
        Some(v) => v,
    };

    let not_integer = || ValidationError::NotAnInteger {
        field,
        value: value.to_string(),
    };

    let Value::Number(n) = value else {
        return Err(not_integer());
    };

    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.as_u64().is_some() {
        // Larger than i64::MAX, certainly out of range
        return Err(ValidationError::OutOfRange {
            field,
            value: i64::MAX,
        });
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            if f < i64::MIN as f64 || f > i64::MAX as f64 {
                Err(ValidationError::OutOfRange {
                    field,
                    value: if f < 0.0 { i64::MIN } else { i64::MAX },
                })
            } else {
                Ok(f as i64)
            }
        }
        _ => Err(not_integer()),
    }
}

fn check_range(field: ParamField, value: i64) -> Result<u32, ValidationError> {
    if !(PARAM_MIN..=PARAM_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(value as u32)
}
