//! Image upload command.
//!
//! # Usage
//!
//! ```bash
//! shapeshift-cli upload whey-front.png whey-back.png
//! ```
//!
//! Prints one JSON record per stored image; `detailUrl` is what goes into a
//! product's `--image`.

use std::path::{Path, PathBuf};

use shapeshift_storefront::api::UploadFile;
use tracing::info;

use super::{CliError, client};
use crate::output;

/// MIME type from the file extension, if it is an image type the upload
/// service accepts.
fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

async fn read_file(path: PathBuf) -> Result<UploadFile, CliError> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => return Err(CliError::Read(path, e)),
    };
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());

    Ok(UploadFile {
        content_type: content_type(&path).map(str::to_owned),
        file_name,
        bytes,
    })
}

/// Upload images and print the stored records.
///
/// # Errors
///
/// Returns an error if a file cannot be read or the upload fails.
pub async fn upload(paths: Vec<PathBuf>) -> Result<(), CliError> {
    if paths.is_empty() {
        return Err(CliError::Invalid("no files given".to_string()));
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_file(path).await?);
    }

    let uploaded = client()?.upload_files(files).await?;
    info!(
        count = uploaded.len(),
        reused = uploaded.iter().filter(|u| u.reused).count(),
        "Upload finished"
    );
    output::json(&uploaded)
}
