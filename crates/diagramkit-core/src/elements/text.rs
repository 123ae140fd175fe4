//! Free-standing text boxes.

use super::{SerializableColor, TextStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub text_style: TextStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<SerializableColor>,
}

impl TextElement {
    pub fn new(width: f64, height: f64, content: impl Into<String>) -> Self {
        Self {
            width,
            height,
            content: content.into(),
            text_style: TextStyle::default(),
            background: None,
        }
    }

    /// Lines of the content, split on newlines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}
