use chrono::Utc;
use std::path::Path;
use tokio::fs;

use crate::error::{AppError, AppResult};

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Matches the request body limit configured in main.rs.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Whether the filename carries an accepted image extension.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        }
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe flat name: path components are
/// stripped and anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let flat = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    flat.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stored name = sanitized stem + UTC timestamp suffix + original extension,
/// so repeated uploads of the same file never collide.
pub fn timestamped_filename(original: &str) -> String {
    let sanitized = sanitize_filename(original);
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    match sanitized.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{timestamp}.{ext}"),
        None => format!("{sanitized}_{timestamp}"),
    }
}

/// Validate the extension and write the image under `upload_dir`, returning the
/// stored filename.
pub async fn save_image(upload_dir: &str, original_name: &str, bytes: &[u8]) -> AppResult<String> {
    if !allowed_file(original_name) {
        return Err(AppError::BadRequest(
            "Image type not allowed (png, jpg, jpeg, gif, webp)".to_string(),
        ));
    }

    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let filename = timestamped_filename(original_name);
    let path = Path::new(upload_dir).join(&filename);
    fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    Ok(filename)
}

/// Best-effort removal of a previously stored image.
pub async fn delete_image(upload_dir: &str, filename: &str) {
    let path = Path::new(upload_dir).join(filename);
    if let Err(err) = fs::remove_file(&path).await {
        tracing::warn!(error = %err, file = %filename, "failed to remove product image");
    }
}
