//! Shared key generation for storage backends.
//!
//! Inbox keys: `inbox/{timestamp}_{filename}`. Archive keys:
//! `archive/{company_id}/{folder_path}/{timestamp}_{filename}`. Filenames
//! must already be sanitized (see `findesk_core::validation`); folder paths
//! come from storage-location configuration and are normalized here.

use uuid::Uuid;

/// Generate a transient inbox key for an uploaded workflow file.
pub fn inbox_key(timestamp_millis: i64, sanitized_filename: &str) -> String {
    format!("inbox/{}_{}", timestamp_millis, sanitized_filename)
}

/// Generate a permanent archive key for a company's document copy.
///
/// The folder path is split on `/` and each segment is kept only if it is
/// non-empty and not a traversal component, so a misconfigured storage
/// location cannot escape the archive namespace.
pub fn archive_key(
    company_id: Uuid,
    folder_path: &str,
    timestamp_millis: i64,
    sanitized_filename: &str,
) -> String {
    let folder: Vec<&str> = folder_path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if folder.is_empty() {
        format!(
            "archive/{}/{}_{}",
            company_id, timestamp_millis, sanitized_filename
        )
    } else {
        format!(
            "archive/{}/{}/{}_{}",
            company_id,
            folder.join("/"),
            timestamp_millis,
            sanitized_filename
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_key() {
        assert_eq!(
            inbox_key(1700000000000, "invoice.pdf"),
            "inbox/1700000000000_invoice.pdf"
        );
    }

    #[test]
    fn test_archive_key() {
        let company = Uuid::nil();
        assert_eq!(
            archive_key(company, "2025/03", 1700000000000, "invoice.pdf"),
            format!("archive/{}/2025/03/1700000000000_invoice.pdf", company)
        );
    }

    #[test]
    fn test_archive_key_normalizes_folder() {
        let company = Uuid::nil();
        assert_eq!(
            archive_key(company, "/Invoices//March/", 1, "a.pdf"),
            format!("archive/{}/Invoices/March/1_a.pdf", company)
        );
        assert_eq!(
            archive_key(company, "../secret", 1, "a.pdf"),
            format!("archive/{}/secret/1_a.pdf", company)
        );
    }

    #[test]
    fn test_archive_key_empty_folder() {
        let company = Uuid::nil();
        assert_eq!(
            archive_key(company, "", 1, "a.pdf"),
            format!("archive/{}/1_a.pdf", company)
        );
    }
}
