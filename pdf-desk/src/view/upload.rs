//! Single-file PDF upload flow.

use crate::error::{ClientError, ValidationError};
use crate::models::{DocumentMetadata, UploadFile, UploadResponse};
use crate::services::auth_state::AuthState;
use crate::services::document_client::DocumentClient;
use crate::view::list_view::ListRefresher;
use crate::view::notify::{BusyGuard, BusyIndicator, Notification, Notifier};
use std::sync::{Arc, RwLock};

const GENERIC_UPLOAD_ERROR: &str = "An error occurred during file upload.";

/// Receives the backend's answer to a successful upload.
pub trait UploadSink: Send + Sync {
    fn on_uploaded(&self, response: &UploadResponse);
}

/// Shared list of document metadata, appended to after each upload.
#[derive(Debug, Clone, Default)]
pub struct DocumentCollection {
    documents: Arc<RwLock<Vec<DocumentMetadata>>>,
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, documents: Vec<DocumentMetadata>) {
        *self.documents.write().unwrap_or_else(|e| e.into_inner()) = documents;
    }

    pub fn snapshot(&self) -> Vec<DocumentMetadata> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UploadSink for DocumentCollection {
    fn on_uploaded(&self, response: &UploadResponse) {
        match response.document() {
            Some(document) => self
                .documents
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .push(document.clone()),
            None => tracing::debug!(
                filename = %response.filename(),
                "Upload response carried no metadata record"
            ),
        }
    }
}

impl UploadSink for ListRefresher {
    fn on_uploaded(&self, _response: &UploadResponse) {
        self.refresh();
    }
}

pub struct UploadFlow {
    documents: Arc<DocumentClient>,
    auth: AuthState,
    notifier: Arc<dyn Notifier>,
    busy: Arc<dyn BusyIndicator>,
    sink: Arc<dyn UploadSink>,
    max_file_size: u64,
}

impl UploadFlow {
    pub fn new(
        documents: Arc<DocumentClient>,
        auth: AuthState,
        notifier: Arc<dyn Notifier>,
        busy: Arc<dyn BusyIndicator>,
        sink: Arc<dyn UploadSink>,
        max_file_size: u64,
    ) -> Self {
        Self {
            documents,
            auth,
            notifier,
            busy,
            sink,
            max_file_size,
        }
    }

    /// Check a selection without touching the network.
    pub fn validate<'a>(&self, files: &'a [UploadFile]) -> Result<&'a UploadFile, ValidationError> {
        let file = match files {
            [] => return Err(ValidationError::NoFile),
            [file] => file,
            _ => return Err(ValidationError::MultipleFiles),
        };

        if !file.is_pdf() {
            return Err(ValidationError::NotPdf {
                content_type: file.content_type.clone(),
            });
        }

        if file.size() > self.max_file_size {
            return Err(ValidationError::TooLarge {
                size: file.size(),
                limit: self.max_file_size,
            });
        }

        Ok(file)
    }

    /// Validate and upload the selected files (exactly one PDF is accepted).
    ///
    /// Every outcome is also reported through the notifier.
    pub async fn upload(&self, files: &[UploadFile]) -> Result<UploadResponse, ClientError> {
        let file = match self.validate(files) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(files = files.len(), error = %e, "Upload rejected");
                self.notifier.notify(Notification::error("Error", e.to_string()));
                return Err(e.into());
            }
        };

        let _busy = BusyGuard::show(self.busy.as_ref());
        let credential = self.auth.credential();

        match self.documents.upload(credential.as_ref(), file).await {
            Ok(response) => {
                self.sink.on_uploaded(&response);
                self.notifier
                    .notify(Notification::success("Success", "File uploaded successfully!"));
                Ok(response)
            }
            Err(e) => {
                let title = match e {
                    ClientError::Server { .. } => "Upload Failed",
                    _ => "Error",
                };
                self.notifier
                    .notify(Notification::error(title, e.user_message(GENERIC_UPLOAD_ERROR)));
                Err(e)
            }
        }
    }
}
