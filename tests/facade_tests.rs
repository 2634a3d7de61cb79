mod common;

use common::{TestResult, converter};
use droidloc::{
    ConverterConfig, Locator, LocatorConverter, LocatorError, LocatorFormat, StatsSnapshot,
    UnknownMethodPolicy,
};
use serde_json::json;

#[test]
fn test_auto_detected_conversions() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let converter = converter();
    assert_eq!(
        converter.to_dict(json!(r#"new UiSelector().text("OK").clickable(true);"#))?,
        json!({"text": "OK", "clickable": true})
    );
    assert_eq!(
        converter.to_dict(json!(r#"//*[@text="OK"]"#))?,
        json!({"text": "OK"})
    );
    assert_eq!(
        converter.to_xpath(json!({"text": "OK"}))?,
        r#"//*[@text="OK"]"#
    );
    assert_eq!(
        converter.to_ui_selector(json!(r#"//*[@text="OK"]"#))?,
        r#"new UiSelector().text("OK");"#
    );
    // Already in the target format: validated and returned as is.
    assert_eq!(
        converter.to_xpath(json!(r#"//*[@text="OK"]"#))?,
        r#"//*[@text="OK"]"#
    );
    Ok(())
}

#[test]
fn test_convert_between_every_pair() -> TestResult {
    let converter = converter();
    let forms = [
        Locator::UiSelector(r#"new UiSelector().text("A").childSelector(new UiSelector().className("B"));"#.into()),
        Locator::XPath(r#"//*[@text="A"]/*[@class="B"]"#.into()),
        Locator::Dict(json!({"text": "A", "childSelector": {"class": "B"}})),
    ];
    for source in &forms {
        for target in &forms {
            assert_eq!(
                &converter.convert(source, target.format())?,
                target,
                "{} -> {}",
                source.format(),
                target.format()
            );
        }
    }
    Ok(())
}

#[test]
fn test_convert_batch_preserves_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let converter = converter();
    let batch = converter.convert_batch(
        &[
            Locator::UiSelector(r#"new UiSelector().text("OK");"#.into()),
            Locator::XPath("invalid xpath".into()),
            Locator::Dict(json!({"text": "a"})),
        ],
        LocatorFormat::Dict,
    );
    assert_eq!(
        batch.items,
        vec![
            Some(Locator::Dict(json!({"text": "OK"}))),
            None,
            Some(Locator::Dict(json!({"text": "a"}))),
        ]
    );
    assert_eq!(batch.succeeded(), 2);
    assert_eq!(batch.failed(), 1);
    assert_eq!(batch.errors[0].0, 1);
    assert!(matches!(
        batch.errors[0].1,
        LocatorError::InvalidSelector {
            format: LocatorFormat::XPath,
            ..
        }
    ));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_batch_matches_sequential() {
    let converter = converter();
    let locators: Vec<Locator> = (0..64)
        .map(|i| {
            if i % 5 == 0 {
                Locator::Dict(json!({}))
            } else {
                Locator::Dict(json!({"text": format!("item {}", i), "instance": i}))
            }
        })
        .collect();
    let sequential = converter.convert_batch(&locators, LocatorFormat::XPath);
    let parallel = converter.convert_batch_parallel(&locators, LocatorFormat::XPath);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_stats_follow_conversions() -> TestResult {
    let converter = converter();
    converter.ui_selector_to_xpath(r#"new UiSelector().text("a");"#)?;
    converter.xpath_to_dict(r#"//*[@text="a"]"#)?;
    assert!(converter.dict_to_xpath(&json!({})).is_err());

    let stats = converter.stats();
    assert_eq!(
        stats,
        StatsSnapshot {
            total: 3,
            succeeded: 2,
            failed: 1
        }
    );
    assert_eq!(
        serde_json::to_value(stats)?,
        json!({"total": 3, "succeeded": 2, "failed": 1})
    );

    converter.reset_stats();
    assert_eq!(converter.stats(), StatsSnapshot::default());
    Ok(())
}

#[test]
fn test_config_from_json() -> TestResult {
    let config = ConverterConfig::from_json(
        r#"{"max_depth": 3, "validate_input": false, "unknown_methods": "fail"}"#,
    )?;
    let converter = LocatorConverter::builder().with_config(config).build()?;
    assert_eq!(converter.config().unknown_methods, UnknownMethodPolicy::Fail);
    assert!(matches!(
        converter.ui_selector_to_xpath(r#"new UiSelector().bogus();"#),
        Err(LocatorError::Conversion(_))
    ));

    assert!(matches!(
        ConverterConfig::from_json(r#"{"max_depth": "deep"}"#),
        Err(LocatorError::Config(_))
    ));
    Ok(())
}

#[test]
fn test_format_names() -> TestResult {
    assert_eq!("xpath".parse::<LocatorFormat>()?, LocatorFormat::XPath);
    assert_eq!("UiSelector".parse::<LocatorFormat>()?, LocatorFormat::UiSelector);
    assert!(matches!(
        "yaml".parse::<LocatorFormat>(),
        Err(LocatorError::UnsupportedFormat(_))
    ));
    assert_eq!(
        converter().supported_formats(),
        &[LocatorFormat::UiSelector, LocatorFormat::XPath, LocatorFormat::Dict]
    );
    Ok(())
}

#[test]
fn test_converter_is_shareable_across_threads() {
    let converter = converter();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let converter = &converter;
            scope.spawn(move || {
                let dict = json!({"text": format!("t{}", i)});
                assert!(converter.dict_to_xpath(&dict).is_ok());
            });
        }
    });
    assert_eq!(converter.stats().succeeded, 4);
}
