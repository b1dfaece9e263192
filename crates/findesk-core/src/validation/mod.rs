//! Upload validation and filename sanitization helpers shared by the API and
//! the completion engine.

use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// Sanitize a filename for use inside a storage key.
///
/// Keeps the extension, replaces everything outside `[A-Za-z0-9._-]` with
/// underscores, collapses runs of underscores, and strips path components.
pub fn sanitize_file_name(filename: &str) -> Result<String, AppError> {
    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let (stem, ext) = match filename_only.rfind('.') {
        Some(idx) if idx > 0 => filename_only.split_at(idx),
        _ => (filename_only, ""),
    };

    let mut sanitized = String::with_capacity(stem.len());
    let mut last_was_underscore = false;
    for c in stem.chars().take(MAX_FILENAME_LENGTH) {
        if c.is_alphanumeric() || c == '-' || c == '.' {
            sanitized.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            sanitized.push('_');
            last_was_underscore = true;
        }
    }
    let sanitized = sanitized.trim_matches('_').to_string();

    let ext: String = ext
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.')
        .collect();

    if sanitized.is_empty() {
        return Ok(format!("file{}", ext));
    }

    Ok(format!("{}{}", sanitized, ext))
}

/// Extract the lowercase extension of a filename, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Validate file size against the configured maximum.
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "{} bytes exceeds max {} bytes",
            size, max_size
        )));
    }
    Ok(())
}

/// Validate the file extension against the configured allowlist.
pub fn validate_file_extension(filename: &str, allowed: &[String]) -> Result<String, AppError> {
    let extension = file_extension(filename).ok_or_else(|| {
        AppError::InvalidInput(format!("Missing file extension (filename: {})", filename))
    })?;
    if !allowed.iter().any(|a| a == &extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid extension '{}', allowed: {:?}",
            extension, allowed
        )));
    }
    Ok(extension)
}

/// Validate the content type against the configured allowlist.
pub fn validate_content_type(content_type: &str, allowed: &[String]) -> Result<(), AppError> {
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase();
    if !allowed.iter().any(|a| a == &normalized) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type '{}', allowed: {:?}",
            content_type, allowed
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(
            sanitize_file_name("invoice-2025_03.pdf").unwrap(),
            "invoice-2025_03.pdf"
        );
    }

    #[test]
    fn test_sanitize_replaces_special_characters() {
        assert_eq!(
            sanitize_file_name("fatura (março) €.pdf").unwrap(),
            "fatura_março.pdf"
        );
        assert_eq!(
            sanitize_file_name("a  b   c.txt").unwrap(),
            "a_b_c.txt"
        );
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(
            sanitize_file_name("/tmp/uploads/report.pdf").unwrap(),
            "report.pdf"
        );
        assert_eq!(
            sanitize_file_name("../../etc/passwd").unwrap(),
            "passwd"
        );
    }

    #[test]
    fn test_sanitize_rejects_traversal_in_name() {
        assert!(sanitize_file_name("evil..name.pdf").is_err());
    }

    #[test]
    fn test_sanitize_empty_stem_falls_back() {
        assert_eq!(sanitize_file_name("???.pdf").unwrap(), "file.pdf");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(100, 1000).is_ok());
        assert!(matches!(
            validate_file_size(0, 1000),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_file_size(2000, 1000),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_validate_extension() {
        let allowed = vec!["pdf".to_string(), "csv".to_string()];
        assert_eq!(validate_file_extension("a.PDF", &allowed).unwrap(), "pdf");
        assert!(validate_file_extension("a.exe", &allowed).is_err());
        assert!(validate_file_extension("noext", &allowed).is_err());
    }

    #[test]
    fn test_validate_content_type_ignores_parameters() {
        let allowed = vec!["text/csv".to_string()];
        assert!(validate_content_type("text/csv; charset=utf-8", &allowed).is_ok());
        assert!(validate_content_type("application/pdf", &allowed).is_err());
    }
}
