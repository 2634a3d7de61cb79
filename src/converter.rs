//! The `LocatorConverter` facade: validation, conversion and bookkeeping in
//! one place.

use crate::attributes::Attribute;
use crate::config::{ConverterConfig, UnknownMethodPolicy};
use crate::convert;
use crate::error::LocatorError;
use crate::locator::{Locator, LocatorFormat};
use crate::stats::{ConversionStats, StatsSnapshot};
use crate::validator::{self, ValidationReport, ValidationSummary};
use log::{debug, error, warn};
use serde_json::Value;

/// Converts between UiSelector, XPath and dictionary locators.
///
/// Unless validation is disabled, every conversion first runs the matching
/// validator and fails with `LocatorError::InvalidSelector` on bad input.
/// The converter is `Sync`; its statistics use atomic counters.
#[derive(Debug, Default)]
pub struct LocatorConverter {
    config: ConverterConfig,
    stats: ConversionStats,
}

/// A builder for creating a `LocatorConverter`.
#[derive(Debug, Clone, Default)]
pub struct LocatorConverterBuilder {
    config: ConverterConfig,
}

impl LocatorConverterBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces every setting at once, e.g. with a config read from JSON.
    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Disabling validation hands input straight to the converters.
    pub fn with_validation(mut self, validate_input: bool) -> Self {
        self.config.validate_input = validate_input;
        self
    }

    pub fn with_unknown_methods(mut self, policy: UnknownMethodPolicy) -> Self {
        self.config.unknown_methods = policy;
        self
    }

    pub fn build(self) -> Result<LocatorConverter, LocatorError> {
        if self.config.max_depth == 0 {
            return Err(LocatorError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(LocatorConverter::with_config(self.config))
    }
}

/// The outcome of `convert_batch`: one slot per input, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchConversion {
    /// `None` where the conversion failed.
    pub items: Vec<Option<Locator>>,
    /// Failures keyed by input index.
    pub errors: Vec<(usize, LocatorError)>,
}

impl BatchConversion {
    fn collect(results: Vec<Result<Locator, LocatorError>>) -> Self {
        let mut batch = BatchConversion {
            items: Vec::with_capacity(results.len()),
            errors: Vec::new(),
        };
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(locator) => batch.items.push(Some(locator)),
                Err(e) => {
                    warn!("Batch item {} failed: {}", index, e);
                    batch.items.push(None);
                    batch.errors.push((index, e));
                }
            }
        }
        batch
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

impl LocatorConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LocatorConverterBuilder {
        LocatorConverterBuilder::new()
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Self {
            config,
            stats: ConversionStats::new(),
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn ui_selector_to_xpath(&self, source: &str) -> Result<String, LocatorError> {
        self.run("ui_selector_to_xpath", || {
            self.check(LocatorFormat::UiSelector, || validator::validate_ui_selector(source))?;
            convert::ui_selector_to_xpath(source, &self.config)
        })
    }

    pub fn ui_selector_to_dict(&self, source: &str) -> Result<Value, LocatorError> {
        self.run("ui_selector_to_dict", || {
            self.check(LocatorFormat::UiSelector, || validator::validate_ui_selector(source))?;
            convert::ui_selector_to_dict(source, &self.config)
        })
    }

    /// The structural `{"methods": [...]}` form. Unknown method names are
    /// kept, so only syntax is checked.
    pub fn parse_ui_selector(&self, source: &str) -> Result<Value, LocatorError> {
        self.run("parse_ui_selector", || convert::parse_ui_selector(source))
    }

    pub fn dict_to_xpath(&self, locator: &Value) -> Result<String, LocatorError> {
        self.run("dict_to_xpath", || {
            self.check(LocatorFormat::Dict, || validator::validate_dict(locator))?;
            convert::dict_to_xpath(locator, &self.config)
        })
    }

    pub fn dict_to_ui_selector(&self, locator: &Value) -> Result<String, LocatorError> {
        self.run("dict_to_ui_selector", || {
            self.check(LocatorFormat::Dict, || validator::validate_dict(locator))?;
            convert::dict_to_ui_selector(locator, &self.config)
        })
    }

    pub fn xpath_to_dict(&self, xpath: &str) -> Result<Value, LocatorError> {
        self.run("xpath_to_dict", || {
            self.check(LocatorFormat::XPath, || validator::validate_xpath(xpath))?;
            convert::xpath_to_dict(xpath, &self.config)
        })
    }

    pub fn xpath_to_ui_selector(&self, xpath: &str) -> Result<String, LocatorError> {
        self.run("xpath_to_ui_selector", || {
            self.check(LocatorFormat::XPath, || validator::validate_xpath(xpath))?;
            convert::xpath_to_ui_selector(xpath, &self.config)
        })
    }

    /// Validates regardless of the `validate_input` setting.
    pub fn validate(&self, locator: &Locator) -> ValidationReport {
        validator::validate(locator)
    }

    pub fn validate_batch(&self, locators: &[Locator]) -> ValidationSummary {
        validator::validate_batch(locators)
    }

    pub fn suggest_fixes(&self, locator: &Locator) -> Vec<String> {
        validator::suggest_fixes(locator)
    }

    /// Converts `locator` into `target`. Converting to the source format
    /// validates (when enabled) and returns the input unchanged.
    pub fn convert(&self, locator: &Locator, target: LocatorFormat) -> Result<Locator, LocatorError> {
        match (locator, target) {
            (Locator::UiSelector(s), LocatorFormat::XPath) => self.ui_selector_to_xpath(s).map(Locator::XPath),
            (Locator::UiSelector(s), LocatorFormat::Dict) => self.ui_selector_to_dict(s).map(Locator::Dict),
            (Locator::XPath(s), LocatorFormat::Dict) => self.xpath_to_dict(s).map(Locator::Dict),
            (Locator::XPath(s), LocatorFormat::UiSelector) => {
                self.xpath_to_ui_selector(s).map(Locator::UiSelector)
            }
            (Locator::Dict(v), LocatorFormat::XPath) => self.dict_to_xpath(v).map(Locator::XPath),
            (Locator::Dict(v), LocatorFormat::UiSelector) => {
                self.dict_to_ui_selector(v).map(Locator::UiSelector)
            }
            (same, _) => self.run("convert", || {
                self.check(same.format(), || validator::validate(same))?;
                Ok(same.clone())
            }),
        }
    }

    /// Converts every locator, keeping order. A failure never aborts the batch.
    pub fn convert_batch(&self, locators: &[Locator], target: LocatorFormat) -> BatchConversion {
        let results: Vec<_> = locators
            .iter()
            .map(|locator| self.convert(locator, target))
            .collect();
        BatchConversion::collect(results)
    }

    /// `convert_batch` on the rayon thread pool; same output shape and order.
    #[cfg(feature = "parallel")]
    pub fn convert_batch_parallel(&self, locators: &[Locator], target: LocatorFormat) -> BatchConversion {
        use rayon::prelude::*;

        let results: Vec<_> = locators
            .par_iter()
            .map(|locator| self.convert(locator, target))
            .collect();
        BatchConversion::collect(results)
    }

    /// Converts a locator of any detected format into the dictionary form.
    pub fn to_dict(&self, locator: Value) -> Result<Value, LocatorError> {
        self.convert(&Locator::detect(locator), LocatorFormat::Dict)
            .map(Locator::into_json)
    }

    pub fn to_xpath(&self, locator: Value) -> Result<String, LocatorError> {
        self.convert_to_string(locator, LocatorFormat::XPath)
    }

    pub fn to_ui_selector(&self, locator: Value) -> Result<String, LocatorError> {
        self.convert_to_string(locator, LocatorFormat::UiSelector)
    }

    fn convert_to_string(&self, locator: Value, target: LocatorFormat) -> Result<String, LocatorError> {
        match self.convert(&Locator::detect(locator), target)? {
            Locator::UiSelector(s) | Locator::XPath(s) => Ok(s),
            Locator::Dict(_) => Err(LocatorError::conversion(format!(
                "Conversion to {} produced a dictionary",
                target
            ))),
        }
    }

    pub fn supported_formats(&self) -> &'static [LocatorFormat] {
        &LocatorFormat::ALL
    }

    /// UiSelector method names the converter translates.
    pub fn supported_methods(&self) -> Vec<&'static str> {
        Attribute::ALL.iter().map(|a| a.ui_method()).collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    fn check(
        &self,
        format: LocatorFormat,
        validate: impl FnOnce() -> ValidationReport,
    ) -> Result<(), LocatorError> {
        if self.config.validate_input {
            validate().into_result(format)
        } else {
            Ok(())
        }
    }

    fn run<T>(
        &self,
        operation: &str,
        conversion: impl FnOnce() -> Result<T, LocatorError>,
    ) -> Result<T, LocatorError> {
        let result = conversion();
        self.stats.record(&result);
        match &result {
            Ok(_) => debug!("{} succeeded", operation),
            Err(e) => error!("{} failed: {}", operation, e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let converter = LocatorConverter::builder()
            .with_max_depth(8)
            .with_validation(false)
            .with_unknown_methods(UnknownMethodPolicy::Fail)
            .build()
            .unwrap();
        assert_eq!(converter.config().max_depth, 8);
        assert!(!converter.config().validate_input);
        assert_eq!(converter.config().unknown_methods, UnknownMethodPolicy::Fail);

        assert!(matches!(
            LocatorConverter::builder().with_max_depth(0).build(),
            Err(LocatorError::Config(_))
        ));
    }

    #[test]
    fn test_validation_gate() {
        let strict = LocatorConverter::new();
        let err = strict.xpath_to_dict(r#"//*[@text="a" or @text="b"]"#).unwrap_err();
        assert!(matches!(
            err,
            LocatorError::InvalidSelector { format: LocatorFormat::XPath, .. }
        ));

        // Without validation the converter's own error surfaces.
        let lenient = LocatorConverter::builder().with_validation(false).build().unwrap();
        let err = lenient.xpath_to_dict(r#"//*[@text="a" or @text="b"]"#).unwrap_err();
        assert!(matches!(err, LocatorError::Conversion(_)));
    }

    #[test]
    fn test_unknown_methods_rejected_when_validating() {
        let converter = LocatorConverter::new();
        let source = r#"new UiSelector().text("A").bogus("x");"#;
        assert!(converter.ui_selector_to_xpath(source).is_err());
        // The structural parse keeps unknown methods.
        assert!(converter.parse_ui_selector(source).is_ok());
    }

    #[test]
    fn test_stats() {
        let converter = LocatorConverter::new();
        converter.dict_to_xpath(&json!({"text": "a"})).unwrap();
        let _ = converter.dict_to_xpath(&json!({}));
        assert_eq!(
            converter.stats(),
            StatsSnapshot {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
        converter.reset_stats();
        assert_eq!(converter.stats().total, 0);
    }

    #[test]
    fn test_convert_same_format() {
        let converter = LocatorConverter::new();
        let locator = Locator::XPath(r#"//*[@text="a"]"#.into());
        assert_eq!(converter.convert(&locator, LocatorFormat::XPath).unwrap(), locator);
        assert!(
            converter
                .convert(&Locator::Dict(json!({})), LocatorFormat::Dict)
                .is_err()
        );
    }

    #[test]
    fn test_supported() {
        let converter = LocatorConverter::new();
        assert_eq!(converter.supported_formats().len(), 3);
        let methods = converter.supported_methods();
        assert_eq!(methods.len(), 29);
        assert!(methods.contains(&"descriptionStartsWith"));
    }
}
