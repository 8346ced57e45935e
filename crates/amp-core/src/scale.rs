//! Content scale factor state.

use crate::error::{Result, ShellError};
use amp_config::DEFAULT_SCALE;
use serde_json::Value;

/// A uniform content magnification factor. Always finite and above zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Validate a raw value.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ShellError::InvalidScale(value.to_string()))
        }
    }

    /// Interpret a scale-change request payload the way the content side
    /// coerces it: numbers as-is, numeric strings parsed, anything else
    /// rejected.
    pub fn from_request(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ShellError::InvalidScale(n.to_string()))
                .and_then(Self::new),
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<f64>()
                    .map_err(|_| ShellError::InvalidScale(format!("{s:?}")))
                    .and_then(Self::new)
            }
            other => Err(ShellError::InvalidScale(other.to_string())),
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(DEFAULT_SCALE)
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-wide scale holder. Rejected assignments leave the value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ScaleState {
    current: ScaleFactor,
}

impl ScaleState {
    /// Start from a configured value, falling back to the default when the
    /// configured value is not a valid scale.
    pub fn with_initial(value: f64) -> Self {
        let current = ScaleFactor::new(value).unwrap_or_else(|err| {
            log::warn!("{err}; falling back to {DEFAULT_SCALE}");
            ScaleFactor::default()
        });
        Self { current }
    }

    pub fn get(&self) -> ScaleFactor {
        self.current
    }

    /// Returns `false` and leaves the state untouched for invalid values.
    pub fn set(&mut self, value: f64) -> bool {
        match ScaleFactor::new(value) {
            Ok(scale) => {
                self.current = scale;
                true
            }
            Err(err) => {
                log::warn!("rejected scale change: {err}");
                false
            }
        }
    }

    /// Apply a scale-change request payload; the new factor on success.
    pub fn set_from_request(&mut self, value: &Value) -> Option<ScaleFactor> {
        match ScaleFactor::from_request(value) {
            Ok(scale) => {
                self.current = scale;
                Some(scale)
            }
            Err(err) => {
                log::warn!("rejected scale change: {err}");
                None
            }
        }
    }
}
