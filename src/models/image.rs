//! Parameter types for the remote image operations.
//!
//! The server owns all pixel work; these types only describe the requested
//! operation. `TransformParams` is JSON-encoded into the `transformations`
//! multipart field of `POST /transform`.

use serde::{Deserialize, Serialize};

/// Output formats offered by the convert and transform endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpg,
    Png,
    Webp,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "JPG",
            OutputFormat::Png => "PNG",
            OutputFormat::Webp => "WebP",
            OutputFormat::Gif => "GIF",
        }
    }

    /// Cycle to the next format (for the format selector in the UI).
    pub fn next(self) -> Self {
        match self {
            OutputFormat::Jpg => OutputFormat::Png,
            OutputFormat::Png => OutputFormat::Webp,
            OutputFormat::Webp => OutputFormat::Gif,
            OutputFormat::Gif => OutputFormat::Jpg,
        }
    }
}

/// Target dimensions for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

/// Crop box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Requested transform operations. Unset fields are omitted from the wire
/// payload so the server applies only what was asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<Resize>,
    /// Rotation in degrees, clockwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropBox>,
    /// Named server-side filters (e.g. "grayscale", "sepia").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl TransformParams {
    /// True when no operation has been requested.
    pub fn is_empty(&self) -> bool {
        self.resize.is_none()
            && self.rotate.is_none()
            && self.crop.is_none()
            && self.filters.is_empty()
            && self.format.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_serialize_to_empty_object() {
        let params = TransformParams::default();
        assert!(params.is_empty());
        assert_eq!(serde_json::to_string(&params).unwrap(), "{}");
    }

    #[test]
    fn set_fields_appear_in_payload() {
        let params = TransformParams {
            resize: Some(Resize {
                width: 800,
                height: 600,
            }),
            rotate: Some(90),
            filters: vec!["grayscale".to_string()],
            format: Some(OutputFormat::Webp),
            ..Default::default()
        };

        let json: serde_json::Value = serde_json::to_value(&params).unwrap();
        assert_eq!(json["resize"]["width"], 800);
        assert_eq!(json["rotate"], 90);
        assert_eq!(json["filters"][0], "grayscale");
        assert_eq!(json["format"], "webp");
        assert!(json.get("crop").is_none());
    }

    #[test]
    fn format_cycles_through_all_variants() {
        let mut format = OutputFormat::Jpg;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(format);
            format = format.next();
        }
        assert_eq!(format, OutputFormat::Jpg);
        assert!(seen.contains(&OutputFormat::Webp));
        assert!(seen.contains(&OutputFormat::Gif));
    }
}
