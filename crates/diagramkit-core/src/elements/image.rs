//! Embedded raster images.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

fn default_opacity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub width: f64,
    pub height: f64,
    /// Data URL (`data:image/png;base64,...`) or bare base64.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<f64>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl ImageElement {
    pub fn new(width: f64, height: f64, src: impl Into<String>) -> Self {
        Self {
            width,
            height,
            src: src.into(),
            natural_width: None,
            natural_height: None,
            opacity: 1.0,
        }
    }

    /// Build a PNG/JPEG data URL from raw bytes.
    pub fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    /// Raw encoded image bytes, or None when `src` is not valid base64.
    pub fn decode_bytes(&self) -> Option<Vec<u8>> {
        let payload = match self.src.split_once(";base64,") {
            Some((_, data)) => data,
            None => self.src.as_str(),
        };
        STANDARD.decode(payload.trim()).ok()
    }
}
