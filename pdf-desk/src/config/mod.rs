use desk_core::config::{config_directory, load_layered};
use desk_core::error::CoreError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Settings {
    pub backend: BackendSettings,
    #[validate(nested)]
    pub auth: AuthSettings,
    #[serde(default)]
    #[validate(nested)]
    pub list: ListSettings,
    #[serde(default)]
    #[validate(nested)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Endpoint naming scheme exposed by the backend.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    /// Versioned API: `/api/v1/pdf/documents`, `/api/v1/pdf/upload`, ...
    #[default]
    V1,
    /// Early unversioned API: `/token`, `/pdfs`, `/upload`, `/pdf_chunks/{id}`.
    /// Calls it never had (token validation, single document or chunk,
    /// search) use the versioned routes.
    Legacy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the document backend, without trailing slash.
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Prefix for versioned routes. Ignored for `RouteStyle::Legacy`.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default)]
    pub routes: RouteStyle,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl BackendSettings {
    pub fn new(url: impl Into<String>, routes: RouteStyle) -> Self {
        Self {
            url: url.into(),
            api_prefix: default_api_prefix(),
            routes,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn versioned(&self, path: &str) -> String {
        format!("{}{}", self.api_prefix.trim_end_matches('/'), path)
    }

    pub fn login_path(&self) -> String {
        match self.routes {
            RouteStyle::V1 => self.versioned("/auth/login"),
            RouteStyle::Legacy => "/token".to_string(),
        }
    }

    pub fn validate_token_path(&self) -> String {
        self.versioned("/auth/validate-token")
    }

    pub fn documents_path(&self) -> String {
        match self.routes {
            RouteStyle::V1 => self.versioned("/pdf/documents"),
            RouteStyle::Legacy => "/pdfs".to_string(),
        }
    }

    pub fn document_path(&self, document_id: i64) -> String {
        self.versioned(&format!("/pdf/documents/{}", document_id))
    }

    pub fn chunks_path(&self, document_id: i64) -> String {
        match self.routes {
            RouteStyle::V1 => self.versioned(&format!("/pdf/documents/{}/chunks", document_id)),
            RouteStyle::Legacy => format!("/pdf_chunks/{}", document_id),
        }
    }

    pub fn chunk_path(&self, chunk_id: i64) -> String {
        self.versioned(&format!("/pdf/chunks/{}", chunk_id))
    }

    pub fn search_chunks_path(&self) -> String {
        self.versioned("/pdf/search/chunks")
    }

    pub fn upload_path(&self) -> String {
        match self.routes {
            RouteStyle::V1 => self.versioned("/pdf/upload"),
            RouteStyle::Legacy => "/upload".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AuthSettings {
    /// File holding the bearer credential between runs.
    pub credential_path: PathBuf,
    #[serde(default = "default_validity_check_interval_secs")]
    #[validate(range(min = 1, message = "Validity check interval must be at least 1 second"))]
    pub validity_check_interval_secs: u64,
}

fn default_validity_check_interval_secs() -> u64 {
    300
}

impl AuthSettings {
    pub fn validity_check_interval(&self) -> Duration {
        Duration::from_secs(self.validity_check_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ListSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: u32,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_page_size() -> u32 {
    10
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
        }
    }
}

impl ListSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct UploadSettings {
    /// Mirrors the backend's request size limit so oversized files are
    /// rejected before any bytes are sent.
    #[serde(default = "default_max_file_size_bytes")]
    #[validate(range(min = 1, message = "Upload size limit must be positive"))]
    pub max_file_size_bytes: u64,
}

fn default_max_file_size_bytes() -> u64 {
    16 * 1024 * 1024
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, CoreError> {
    let configuration_directory = config_directory("pdf-desk")?;
    let settings: Settings = load_layered(&configuration_directory)?;
    check(settings)
}

/// Reject values that would stall the client at runtime.
fn check(settings: Settings) -> Result<Settings, CoreError> {
    settings
        .validate()
        .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
    Ok(settings)
}
