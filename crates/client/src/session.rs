//! Upload submission followed by job tracking.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sheetport_core::error::CoreError;
use sheetport_core::upload::{has_accepted_extension, upload_file_name, validate_selection};

use crate::api::UploadFile;
use crate::backend::ImportBackend;
use crate::error::ApiError;
use crate::poller::{JobPoller, PollHandle};

/// Why a submission did not start.
///
/// Failures of the later status polls are not reported here; they surface
/// through the [`PollHandle`] snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The selection was rejected before any request.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// A selected file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The upload request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Uploader state: at most one active poller at a time.
pub struct ImportSession<B: ?Sized> {
    backend: Arc<B>,
    poller: JobPoller<B>,
    poll: Option<PollHandle>,
}

impl<B> ImportSession<B>
where
    B: ImportBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<B>, poll_interval: Duration) -> Self {
        Self {
            poller: JobPoller::new(Arc::clone(&backend), poll_interval),
            backend,
            poll: None,
        }
    }

    /// Upload `paths` as one submission and start polling the created jobs.
    ///
    /// An empty selection is rejected without issuing a request. Any poller
    /// left over from a previous submission is stopped first.
    pub async fn submit<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<&PollHandle, SessionError> {
        validate_selection(paths)?;
        self.stop_polling();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            if !has_accepted_extension(path) {
                tracing::warn!(path = %path.display(), "File is not an .xlsx/.xls workbook");
            }
            let bytes = tokio::fs::read(path).await.map_err(|source| SessionError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            files.push(UploadFile {
                file_name: upload_file_name(path),
                bytes,
            });
        }

        let ids = self.backend.submit_import(files).await?;
        let handle = self.poll.insert(self.poller.start(ids));
        Ok(&*handle)
    }

    /// Poller of the latest submission, if any.
    pub fn poll(&self) -> Option<&PollHandle> {
        self.poll.as_ref()
    }

    pub fn poll_mut(&mut self) -> Option<&mut PollHandle> {
        self.poll.as_mut()
    }

    /// Stop polling but keep the last snapshot visible.
    pub fn stop_polling(&self) {
        if let Some(poll) = &self.poll {
            poll.stop();
        }
    }

    /// Stop polling and forget the tracked jobs.
    pub fn reset(&mut self) {
        self.poll = None;
    }
}
