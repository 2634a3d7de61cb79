use serde_json::{Map, Value, json};

/// Flat UiSelector chains that survive UiSelector -> Dict -> UiSelector unchanged.
pub fn flat_selectors() -> Vec<&'static str> {
    vec![
        r#"new UiSelector().text("OK").clickable(true);"#,
        r#"new UiSelector().className("android.widget.Button").text("Login").instance(0);"#,
        r#"new UiSelector().resourceId("ru.app:id/button").enabled(false);"#,
        r#"new UiSelector().descriptionContains("Card").longClickable(true).index(3);"#,
        r#"new UiSelector().packageNameMatches("ru\\..*").classNameMatches(".*EditText");"#,
        r#"new UiSelector().textStartsWith("Pay").checkable(true).checked(false);"#,
    ]
}

/// Dictionary locators with their XPath rendering. Converting the XPath back
/// gives the dictionary again.
pub fn dict_xpath_pairs() -> Vec<(Value, &'static str)> {
    vec![
        (json!({"text": "OK"}), r#"//*[@text="OK"]"#),
        (
            json!({"class": "android.widget.EditText", "focused": true, "instance": 0}),
            r#"//*[@class="android.widget.EditText"][@focused="true"][1]"#,
        ),
        (
            json!({"content-descContains": "Card", "index": 2}),
            r#"//*[contains(@content-desc, "Card")][position()=3]"#,
        ),
        (
            json!({"scrollable": true, "childSelector": {"text": "History"}}),
            r#"//*[@scrollable="true"]/*[@text="History"]"#,
        ),
        (
            json!({"text": "A", "childSelector": {"text": "B", "childSelector": {"text": "C"}}}),
            r#"//*[@text="A"]/*[@text="B"]/*[@text="C"]"#,
        ),
        (
            json!({"class": "android.widget.RadioButton", "fromParent": {"resource-id": "pkg:id/x"}}),
            r#"//*[@class="android.widget.RadioButton"]/..//*[@resource-id="pkg:id/x"]"#,
        ),
        (
            json!({"text": "A", "fromParent": {"fromParent": {"class": "B"}}}),
            r#"//*[@text="A"]/../..//*[@class="B"]"#,
        ),
        (
            json!({"text": "Name", "sibling": {"class": "android.widget.EditText"}}),
            r#"//*[@text="Name"]/following-sibling::*[@class="android.widget.EditText"]"#,
        ),
        (
            json!({"resource-idMatches": ".*:id/btn_.*", "selected": false}),
            r#"//*[matches(@resource-id, ".*:id/btn_.*")][@selected="false"]"#,
        ),
    ]
}

/// A selector nested `depth` levels through `childSelector`.
pub fn nested_selector(depth: usize) -> String {
    let mut selector = r#"new UiSelector().text("leaf")"#.to_string();
    for _ in 1..depth {
        selector = format!("new UiSelector().childSelector({})", selector);
    }
    format!("{};", selector)
}

/// A dictionary locator nested `depth` levels through `key`.
pub fn nested_dict(depth: usize, key: &str) -> Value {
    let mut value = json!({"text": "leaf"});
    for _ in 1..depth {
        value = Value::Object(Map::from_iter([(key.to_string(), value)]));
    }
    value
}

/// Drops a deep locator one level at a time.
pub fn release_nested_dict(mut value: Value, key: &str) {
    while let Some(inner) = value.get_mut(key).map(Value::take) {
        value = inner;
    }
}
