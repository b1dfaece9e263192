//! Workflow file lifecycle: deletion of the transient copy and its side
//! effects. Keeps handler logic thin and allows unit testing without HTTP.

use std::sync::Arc;

use uuid::Uuid;

use findesk_core::AppError;
use findesk_db::{LoanDraftRepository, WorkflowFileRepository};
use findesk_storage::Storage;

pub struct FileLifecycleService {
    files: WorkflowFileRepository,
    drafts: LoanDraftRepository,
    storage: Arc<dyn Storage>,
}

impl FileLifecycleService {
    pub fn new(
        files: WorkflowFileRepository,
        drafts: LoanDraftRepository,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            files,
            drafts,
            storage,
        }
    }

    /// Delete a workflow file: discard any queued loan draft, remove the
    /// transient bytes, and delete the row.
    ///
    /// The storage delete is best-effort — an unreachable backend must not
    /// leave the row undeletable — but the draft discard is recorded first
    /// so captured loan data is never lost silently.
    #[tracing::instrument(skip(self), fields(file_id = %file_id))]
    pub async fn delete_file(&self, file_id: Uuid) -> Result<bool, AppError> {
        let Some(file) = self.files.get(file_id).await? else {
            return Ok(false);
        };

        if self.drafts.mark_discarded(file.id).await? {
            tracing::warn!(
                file_id = %file.id,
                "Discarding drafted loan data with file deletion"
            );
        }

        if let Err(err) = self.storage.delete(&file.file_key).await {
            tracing::error!(
                error = %err,
                key = %file.file_key,
                "Failed to delete file from storage, continuing with database deletion"
            );
        }

        self.files.delete(file.id).await
    }
}
