//! Product and category image references.
//!
//! The API stores images in two shapes: a bare URL string (legacy records
//! and hand-entered admin data) or an upload record carrying `detail` and
//! `thumb` renditions. Both are accepted everywhere an image can appear.

use serde::{Deserialize, Serialize};

/// Image shown when a product or category has nothing resolvable.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// One rendition of an uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Public URL of the rendition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Stored file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Whether the upload service deduplicated this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reused: Option<bool>,
}

impl ImageRef {
    fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// An image as the API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Image {
    /// A plain URL string.
    PlainUrl(String),
    /// An upload record with optional renditions.
    #[serde(rename_all = "camelCase")]
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<ImageRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumb: Option<ImageRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_primary: Option<bool>,
    },
}

impl Image {
    /// Build a structured image from upload results.
    #[must_use]
    pub fn uploaded(detail_url: Option<String>, thumb_url: Option<String>) -> Self {
        let rendition = |url: Option<String>| {
            url.map(|url| ImageRef {
                url: Some(url),
                ..ImageRef::default()
            })
        };
        Self::Structured {
            detail: rendition(detail_url),
            thumb: rendition(thumb_url),
            filename: None,
            alt: None,
            is_primary: None,
        }
    }

    /// URL for full-size display: the detail rendition, then the thumbnail.
    #[must_use]
    pub fn display_url(&self) -> Option<&str> {
        match self {
            Self::PlainUrl(url) => Some(url.as_str()).filter(|u| !u.is_empty()),
            Self::Structured { detail, thumb, .. } => detail
                .as_ref()
                .and_then(ImageRef::url)
                .or_else(|| thumb.as_ref().and_then(ImageRef::url)),
        }
    }

    /// URL for small previews: the thumbnail, then the detail rendition.
    #[must_use]
    pub fn thumb_url(&self) -> Option<&str> {
        match self {
            Self::PlainUrl(_) => self.display_url(),
            Self::Structured { detail, thumb, .. } => thumb
                .as_ref()
                .and_then(ImageRef::url)
                .or_else(|| detail.as_ref().and_then(ImageRef::url)),
        }
    }

    fn is_primary(&self) -> bool {
        matches!(
            self,
            Self::Structured {
                is_primary: Some(true),
                ..
            }
        )
    }
}

impl From<&str> for Image {
    fn from(url: &str) -> Self {
        Self::PlainUrl(url.to_owned())
    }
}

/// Pick the URL to display for an ordered image list.
///
/// An image flagged primary wins if it resolves; otherwise the first image
/// that resolves to a URL is used, falling back to [`PLACEHOLDER_IMAGE`].
#[must_use]
pub fn resolve_display_url(images: &[Image]) -> &str {
    images
        .iter()
        .filter(|img| img.is_primary())
        .find_map(Image::display_url)
        .or_else(|| images.iter().find_map(Image::display_url))
        .unwrap_or(PLACEHOLDER_IMAGE)
}
