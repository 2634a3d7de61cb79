use crate::error::LocatorError;
use serde::Deserialize;

/// Nesting accepted by the converters unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do with a UiSelector method the attribute table does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMethodPolicy {
    /// Log a warning and continue without the method. (Default)
    #[default]
    Skip,
    /// Abort the conversion with a `Conversion` error.
    Fail,
}

/// Settings shared by the converters and the facade.
///
/// Deserializes from partial JSON; missing fields keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Deepest hierarchical nesting a conversion will follow.
    pub max_depth: usize,
    /// Whether the facade validates input before converting.
    pub validate_input: bool,
    pub unknown_methods: UnknownMethodPolicy,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            validate_input: true,
            unknown_methods: UnknownMethodPolicy::default(),
        }
    }
}

impl ConverterConfig {
    pub fn from_json(json: &str) -> Result<Self, LocatorError> {
        serde_json::from_str(json).map_err(|e| LocatorError::Config(e.to_string()))
    }

    /// Fails with a `Conversion` error once `depth` passes `max_depth`.
    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), LocatorError> {
        if depth > self.max_depth {
            return Err(LocatorError::Conversion(format!(
                "Nesting depth {} exceeds the limit of {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }
}
