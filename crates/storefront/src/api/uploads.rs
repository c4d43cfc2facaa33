//! Image uploads.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use shapeshift_core::{Image, ImageRef};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// One stored upload, flattened from the service's per-file result.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub detail_url: Option<String>,
    pub thumb_url: Option<String>,
    pub filename: Option<String>,
    pub original_name: Option<String>,
    /// Whether the service matched an earlier upload instead of storing anew.
    pub reused: bool,
}

impl UploadedImage {
    /// The image to attach to a product or category.
    #[must_use]
    pub fn to_image(&self) -> Image {
        Image::uploaded(self.detail_url.clone(), self.thumb_url.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResult {
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    detail: Option<ImageRef>,
    #[serde(default)]
    thumb: Option<ImageRef>,
    /// Older deployments return a single `url`.
    #[serde(default)]
    url: Option<String>,
}

impl From<UploadResult> for UploadedImage {
    fn from(r: UploadResult) -> Self {
        let detail = r.detail.unwrap_or_default();
        let thumb = r.thumb.unwrap_or_default();
        Self {
            detail_url: detail.url.clone().or(r.url),
            thumb_url: thumb.url.clone(),
            filename: detail
                .filename
                .clone()
                .or_else(|| thumb.filename.clone())
                .or(r.filename),
            original_name: r.original_name,
            reused: detail.reused.unwrap_or(false) || thumb.reused.unwrap_or(false),
        }
    }
}

/// Read `results` from an upload response; anything else is an empty list.
fn parse_results(response: &Value) -> Vec<UploadedImage> {
    response
        .get("results")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    serde_json::from_value::<UploadResult>(item.clone()).unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Unrecognised upload result");
                        UploadResult::default()
                    })
                })
                .map(UploadedImage::from)
                .collect()
        })
        .unwrap_or_default()
}

impl ApiClient {
    /// Upload files as multipart field `images`.
    ///
    /// # Errors
    ///
    /// Returns an error if a content type is invalid or the request fails.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> Result<Vec<UploadedImage>, ApiError> {
        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part("images", part);
        }

        let url = self.url(&["uploads"])?;
        let response = Self::send(self.request(Method::POST, url, true).multipart(form)).await?;
        Ok(parse_results(&response))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_structured_and_legacy_results() {
        let response = json!({"results": [
            {
                "ok": true,
                "originalName": "whey.png",
                "detail": {"filename": "d-1.webp", "url": "https://cdn/d-1.webp", "reused": true},
                "thumb": {"filename": "t-1.webp", "url": "https://cdn/t-1.webp"}
            },
            {"ok": true, "filename": "old.jpg", "url": "https://cdn/old.jpg"}
        ]});

        let results = parse_results(&response);
        assert_eq!(
            results,
            vec![
                UploadedImage {
                    detail_url: Some("https://cdn/d-1.webp".into()),
                    thumb_url: Some("https://cdn/t-1.webp".into()),
                    filename: Some("d-1.webp".into()),
                    original_name: Some("whey.png".into()),
                    reused: true,
                },
                UploadedImage {
                    detail_url: Some("https://cdn/old.jpg".into()),
                    filename: Some("old.jpg".into()),
                    ..UploadedImage::default()
                },
            ]
        );
    }

    #[test]
    fn test_missing_results_is_empty() {
        assert!(parse_results(&json!({"data": []})).is_empty());
        assert!(parse_results(&Value::Null).is_empty());
    }

    #[test]
    fn test_to_image_resolves_detail() {
        let uploaded = UploadedImage {
            detail_url: Some("d.webp".into()),
            thumb_url: Some("t.webp".into()),
            ..UploadedImage::default()
        };
        let image = uploaded.to_image();
        assert_eq!(image.display_url(), Some("d.webp"));
        assert_eq!(image.thumb_url(), Some("t.webp"));
    }
}
