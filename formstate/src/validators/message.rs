//! Error message helpers shared by the built-in validators

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::validation_error::{MdString, RenderContent};

/// Rewrites applied, in order, when markdown is turned off
static MARKDOWN_STRIP: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // fenced blocks go before the inline markers are removed
        (r"`{3}[\s\S]*?`{3}", ""),
        (r"`([^`]+)`", "$1"),
        (r"!\[(.*?)\]\(.*?\)", "$1"),
        (r"\[(.*?)\]\((.*?)\)", "$1"),
        (r"(?m)^[ \t]*#+[ \t]?", ""),
        (r"(?m)^[ \t]*>[ \t]?", ""),
        (r"(?m)^[ \t]*(?:[-+*]|\d+\.)[ \t]+", ""),
        (r"[*_~]", ""),
        (r"\n{2,}", "\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("markdown strip pattern is valid"),
            replacement,
        )
    })
    .collect()
});

/// Render an error message for the current settings.
///
/// With `use_markdown_in_validators` on the text stays markdown; otherwise
/// the basic markdown syntax is stripped and plain text is returned.
pub fn build_error_message(markdown: &str) -> RenderContent {
    if formstate_config::get_config().use_markdown_in_validators {
        return RenderContent::Markdown(MdString::new(markdown));
    }
    RenderContent::Text(strip_markdown(markdown))
}

pub fn strip_markdown(markdown: &str) -> String {
    MARKDOWN_STRIP
        .iter()
        .fold(markdown.to_string(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        })
}

/// Replace `{name}` tokens in text or markdown content.
///
/// Component content is returned unchanged.
pub fn replace_placeholders(content: &RenderContent, replacements: &[(&str, String)]) -> RenderContent {
    let substitute = |text: &str| {
        replacements
            .iter()
            .fold(text.to_string(), |acc, (name, value)| {
                acc.replace(&format!("{{{name}}}"), value)
            })
    };
    match content {
        RenderContent::Text(text) => RenderContent::Text(substitute(text)),
        RenderContent::Markdown(md) => RenderContent::Markdown(MdString::new(substitute(md.as_str()))),
        RenderContent::Component(_) => content.clone(),
    }
}

/// Text form of a value for messages: strings unquoted, null empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formstate_config::{reset_config, set_config, FormsConfigUpdate};
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn test_strip_markdown() {
        assert_eq!(strip_markdown("Value must be **bold**"), "Value must be bold");
        assert_eq!(strip_markdown("see [the docs](http://x)"), "see the docs");
        assert_eq!(strip_markdown("![logo](a.png) text"), "logo text");
        assert_eq!(strip_markdown("# Title\n\n\n> quoted"), "Title\nquoted");
        assert_eq!(strip_markdown("- one\n- two"), "one\ntwo");
        assert_eq!(strip_markdown("run `cargo`"), "run cargo");
    }

    #[test]
    #[serial]
    fn test_build_error_message_follows_config() {
        reset_config();
        assert_eq!(
            build_error_message("**x**"),
            RenderContent::Markdown(MdString::new("**x**"))
        );

        set_config(FormsConfigUpdate::new().use_markdown_in_validators(false));
        assert_eq!(build_error_message("**x**"), RenderContent::Text("x".into()));
        reset_config();
    }

    #[test]
    fn test_replace_placeholders() {
        let content = RenderContent::Markdown(MdString::new("between **{min}** and **{max}**"));
        let replaced = replace_placeholders(&content, &[("min", "1".into()), ("max", "9".into())]);
        assert_eq!(replaced.as_text(), Some("between **1** and **9**"));

        let component = RenderContent::Component(crate::validation_error::ComponentContent {
            name: "Hint".into(),
            props: json!({"text": "{min}"}),
        });
        assert_eq!(replace_placeholders(&component, &[("min", "1".into())]), component);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("abc")), "abc");
        assert_eq!(display_value(&json!(4.5)), "4.5");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }
}
