use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Read-only projection of an uploaded PDF, as listed by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub id: i64,
    pub title: String,
    #[serde(default, alias = "fileName")]
    pub filename: Option<String>,
    pub total_pages: u32,
    pub uploaded_by: String,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Text extracted from one page of a document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Chunk {
    pub id: i64,
    #[serde(alias = "pdf_id")]
    pub document_id: i64,
    pub page_number: u32,
    #[serde(default)]
    pub content: String,
}

/// Summary returned by the versioned upload endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UploadSummary {
    #[serde(default)]
    pub message: Option<String>,
    pub filename: String,
    pub uploaded_by: String,
    pub total_pages: u32,
}

/// Upload responses come in two shapes depending on the backend generation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum UploadResponse {
    Metadata { pdf_meta: DocumentMetadata },
    Summary(UploadSummary),
}

impl UploadResponse {
    /// Full metadata record, when the backend returned one.
    pub fn document(&self) -> Option<&DocumentMetadata> {
        match self {
            UploadResponse::Metadata { pdf_meta } => Some(pdf_meta),
            UploadResponse::Summary(_) => None,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            UploadResponse::Metadata { pdf_meta } => {
                pdf_meta.filename.as_deref().unwrap_or(&pdf_meta.title)
            }
            UploadResponse::Summary(summary) => &summary.filename,
        }
    }
}

/// A file selected for upload, with its declared content type.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        Ok(Self {
            content_type: content_type_for(path).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_CONTENT_TYPE,
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
