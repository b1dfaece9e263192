//! Multipart extraction helpers for file uploads.

use axum::extract::Multipart;
use findesk_core::AppError;

/// Extract the `file` field from a multipart request.
///
/// Returns (data, original filename, content type).
pub async fn extract_multipart_file(
    mut multipart: Multipart,
) -> Result<(Vec<u8>, String, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_filename = field
            .file_name()
            .ok_or_else(|| AppError::InvalidInput("Missing filename in upload".to_string()))?
            .to_string();

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?
            .to_vec();

        return Ok((data, original_filename, content_type));
    }

    Err(AppError::InvalidInput(
        "Missing 'file' field in multipart request".to_string(),
    ))
}
