use crate::error::ClientError;
use crate::models::{Chunk, DocumentMetadata, PageQuery, PageResult};
use crate::services::auth_state::AuthState;
use crate::services::document_client::DocumentClient;
use crate::view::list_view::PageSource;
use async_trait::async_trait;
use std::sync::Arc;

/// Pages of the current user's documents.
pub struct DocumentPages {
    documents: Arc<DocumentClient>,
    auth: AuthState,
}

impl DocumentPages {
    pub fn new(documents: Arc<DocumentClient>, auth: AuthState) -> Self {
        Self { documents, auth }
    }
}

#[async_trait]
impl PageSource for DocumentPages {
    type Item = DocumentMetadata;

    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult<DocumentMetadata>, ClientError> {
        let credential = self.auth.credential();
        self.documents.list_documents(credential.as_ref(), query).await
    }

    fn failure_message(&self) -> &'static str {
        "Failed to load documents. Please try again later."
    }
}

/// Pages of one document's extracted chunks.
pub struct ChunkPages {
    documents: Arc<DocumentClient>,
    auth: AuthState,
    document_id: i64,
}

impl ChunkPages {
    pub fn new(documents: Arc<DocumentClient>, auth: AuthState, document_id: i64) -> Self {
        Self {
            documents,
            auth,
            document_id,
        }
    }

    pub fn document_id(&self) -> i64 {
        self.document_id
    }
}

#[async_trait]
impl PageSource for ChunkPages {
    type Item = Chunk;

    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult<Chunk>, ClientError> {
        let credential = self.auth.credential();
        self.documents
            .list_chunks(credential.as_ref(), self.document_id, query)
            .await
    }

    fn failure_message(&self) -> &'static str {
        "Failed to load chunks. Please try again later."
    }
}
