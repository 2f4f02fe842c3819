//! Document backend client.
//!
//! Lists documents and their extracted chunks, and uploads new PDFs. All calls
//! go through [`ApiClient`] so they share bearer handling and 401 escalation.

use crate::error::ClientError;
use crate::models::{Chunk, Credential, DocumentMetadata, PageQuery, PageResult, UploadFile, UploadResponse};
use crate::services::api_client::{decode_json, ApiClient, RequestOptions};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

pub struct DocumentClient {
    api: Arc<ApiClient>,
}

impl DocumentClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// List the current user's documents, optionally filtered by title.
    pub async fn list_documents(
        &self,
        credential: Option<&Credential>,
        query: &PageQuery,
    ) -> Result<PageResult<DocumentMetadata>, ClientError> {
        let path = self.api.settings().documents_path();
        self.fetch_page(&path, credential, query).await.map_err(|e| {
            tracing::error!(page = query.page, error = %e, "List documents failed");
            e
        })
    }

    pub async fn get_document(
        &self,
        credential: Option<&Credential>,
        document_id: i64,
    ) -> Result<DocumentMetadata, ClientError> {
        let path = self.api.settings().document_path(document_id);
        let response = self
            .api
            .request(Method::GET, &path, credential, RequestOptions::new())
            .await?;

        decode_json(response).await.map_err(|e| {
            tracing::error!(document_id = %document_id, error = %e, "Get document failed");
            e
        })
    }

    /// List one document's chunks, optionally filtered by content.
    pub async fn list_chunks(
        &self,
        credential: Option<&Credential>,
        document_id: i64,
        query: &PageQuery,
    ) -> Result<PageResult<Chunk>, ClientError> {
        let path = self.api.settings().chunks_path(document_id);
        self.fetch_page(&path, credential, query).await.map_err(|e| {
            tracing::error!(document_id = %document_id, page = query.page, error = %e, "List chunks failed");
            e
        })
    }

    pub async fn get_chunk(
        &self,
        credential: Option<&Credential>,
        chunk_id: i64,
    ) -> Result<Chunk, ClientError> {
        let path = self.api.settings().chunk_path(chunk_id);
        let response = self
            .api
            .request(Method::GET, &path, credential, RequestOptions::new())
            .await?;

        decode_json(response).await
    }

    /// Full-text search over all chunks the user can see.
    pub async fn search_chunks(
        &self,
        credential: Option<&Credential>,
        query_text: &str,
        document_id: Option<i64>,
        page: u32,
        size: u32,
    ) -> Result<PageResult<Chunk>, ClientError> {
        let query = PageQuery {
            page,
            size,
            search: None,
        };
        query.validate()?;

        let mut pairs = query.to_pairs();
        pairs.push(("query_text".to_string(), query_text.to_string()));
        if let Some(document_id) = document_id {
            pairs.push(("document_id".to_string(), document_id.to_string()));
        }

        let path = self.api.settings().search_chunks_path();
        let response = self
            .api
            .request(Method::GET, &path, credential, RequestOptions::new().query(pairs))
            .await?;

        let result: PageResult<Chunk> = decode_json(response).await?;
        result.check().map_err(ClientError::Decode)?;
        Ok(result)
    }

    /// Upload a single PDF as multipart field `file`.
    ///
    /// Callers are expected to have validated the file; see `UploadFlow`.
    pub async fn upload(
        &self,
        credential: Option<&Credential>,
        file: &UploadFile,
    ) -> Result<UploadResponse, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let path = self.api.settings().upload_path();
        let response = self
            .api
            .request(Method::POST, &path, credential, RequestOptions::new().multipart(form))
            .await?;

        let uploaded: UploadResponse = decode_json(response).await.map_err(|e| {
            tracing::error!(file_name = %file.file_name, error = %e, "Upload failed");
            e
        })?;

        tracing::info!(
            file_name = %file.file_name,
            size = file.size(),
            "File uploaded successfully"
        );
        Ok(uploaded)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
        query: &PageQuery,
    ) -> Result<PageResult<T>, ClientError> {
        query.validate()?;

        let response = self
            .api
            .request(
                Method::GET,
                path,
                credential,
                RequestOptions::new().query(query.to_pairs()),
            )
            .await?;

        let result: PageResult<T> = decode_json(response).await?;
        result.check().map_err(ClientError::Decode)?;
        Ok(result)
    }
}
