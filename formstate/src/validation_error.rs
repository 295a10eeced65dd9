//! Validation errors and their renderable content
//!
//! Errors are plain data on a field's error list. Errors produced by a
//! validator carry a hidden [`ValidatorId`] tag so the validator can replace
//! its own earlier errors without touching anything else on the list. The
//! tag takes no part in equality or serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

/// Identity of one validator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidatorId(Ulid);

impl ValidatorId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ValidatorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Text that should be rendered as markdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MdString(pub String);

impl MdString {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MdString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a named UI component plus its props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentContent {
    pub name: String,
    #[serde(default)]
    pub props: Value,
}

/// Renderable message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum RenderContent {
    Text(String),
    Markdown(MdString),
    Component(ComponentContent),
}

impl RenderContent {
    /// `string`, `md` or `component`
    pub fn text_type(&self) -> &'static str {
        match self {
            RenderContent::Text(_) => "string",
            RenderContent::Markdown(_) => "md",
            RenderContent::Component(_) => "component",
        }
    }

    /// The textual body, if this content is text or markdown
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RenderContent::Text(text) => Some(text),
            RenderContent::Markdown(md) => Some(md.as_str()),
            RenderContent::Component(_) => None,
        }
    }
}

impl From<&str> for RenderContent {
    fn from(text: &str) -> Self {
        RenderContent::Text(text.to_string())
    }
}

impl From<String> for RenderContent {
    fn from(text: String) -> Self {
        RenderContent::Text(text)
    }
}

impl From<MdString> for RenderContent {
    fn from(md: MdString) -> Self {
        RenderContent::Markdown(md)
    }
}

impl From<ComponentContent> for RenderContent {
    fn from(component: ComponentContent) -> Self {
        RenderContent::Component(component)
    }
}

/// One entry on a field's error list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RenderContent", into = "RenderContent")]
pub struct ValidationError {
    content: RenderContent,
    source: Option<ValidatorId>,
}

impl From<RenderContent> for ValidationError {
    fn from(content: RenderContent) -> Self {
        Self::new(content)
    }
}

impl From<ValidationError> for RenderContent {
    fn from(error: ValidationError) -> Self {
        error.content
    }
}

impl ValidationError {
    pub fn new(content: impl Into<RenderContent>) -> Self {
        Self {
            content: content.into(),
            source: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(RenderContent::Text(text.into()))
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self::new(RenderContent::Markdown(MdString::new(text)))
    }

    pub fn component(name: impl Into<String>, props: Value) -> Self {
        Self::new(RenderContent::Component(ComponentContent {
            name: name.into(),
            props,
        }))
    }

    pub fn content(&self) -> &RenderContent {
        &self.content
    }

    /// Validator that produced this error, `None` for errors added directly.
    pub fn source(&self) -> Option<ValidatorId> {
        self.source
    }

    pub(crate) fn tagged(mut self, source: ValidatorId) -> Self {
        self.source = Some(source);
        self
    }

    /// Name of the component a UI should use to render this error
    pub fn component_name(&self) -> &str {
        match &self.content {
            RenderContent::Text(_) => "template",
            RenderContent::Markdown(_) => "vue-markdown",
            RenderContent::Component(component) => &component.name,
        }
    }

    /// Props for the rendering component
    pub fn component_bindings(&self) -> Value {
        match &self.content {
            RenderContent::Text(_) => Value::Object(Default::default()),
            RenderContent::Markdown(md) => serde_json::json!({ "source": md.as_str() }),
            RenderContent::Component(component) => component.props.clone(),
        }
    }

    /// Inline body for plain text errors, empty otherwise
    pub fn component_body(&self) -> &str {
        match &self.content {
            RenderContent::Text(text) => text,
            _ => "",
        }
    }
}

impl PartialEq for ValidationError {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.content {
            RenderContent::Text(text) => f.write_str(text),
            RenderContent::Markdown(md) => f.write_str(md.as_str()),
            RenderContent::Component(component) => write!(f, "<{}>", component.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equality_ignores_source_tag() {
        let plain = ValidationError::text("Required");
        let tagged = ValidationError::text("Required").tagged(ValidatorId::new());
        assert_eq!(plain, tagged);
        assert!(plain.source().is_none());
        assert!(tagged.source().is_some());
    }

    #[test]
    fn test_validator_ids_are_unique() {
        assert_ne!(ValidatorId::new(), ValidatorId::new());
    }

    #[test]
    fn test_component_descriptors() {
        let text = ValidationError::text("plain");
        assert_eq!(text.component_name(), "template");
        assert_eq!(text.component_body(), "plain");

        let md = ValidationError::markdown("**bold**");
        assert_eq!(md.component_name(), "vue-markdown");
        assert_eq!(md.component_bindings(), json!({"source": "**bold**"}));
        assert_eq!(md.component_body(), "");

        let component = ValidationError::component("ErrorLink", json!({"href": "/help"}));
        assert_eq!(component.component_name(), "ErrorLink");
        assert_eq!(component.component_bindings(), json!({"href": "/help"}));
    }

    #[test]
    fn test_serialization_omits_source() {
        let err = ValidationError::markdown("x").tagged(ValidatorId::new());
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, json!({"type": "markdown", "content": "x"}));

        let back: ValidationError = serde_json::from_value(value).unwrap();
        assert_eq!(back, err);
        assert!(back.source().is_none());
    }

    #[test]
    fn test_text_type() {
        assert_eq!(RenderContent::from("a").text_type(), "string");
        assert_eq!(RenderContent::from(MdString::new("a")).text_type(), "md");
    }
}
