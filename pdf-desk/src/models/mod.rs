pub mod auth;
pub mod document;
pub mod page;

pub use auth::{AuthStatus, Credential, LoginForm, TokenResponse, TokenValidation};
pub use document::{Chunk, DocumentMetadata, UploadFile, UploadResponse, UploadSummary, PDF_CONTENT_TYPE};
pub use page::{PageQuery, PageResult, MAX_PAGE_SIZE};
