#![allow(dead_code)]

use pdf_desk::config::{
    AuthSettings, BackendSettings, ListSettings, RouteStyle, Settings, TelemetrySettings,
    UploadSettings,
};
use pdf_desk::services::credential_store::{CredentialStore, MemoryCredentialStore};
use pdf_desk::startup::build_state_with_store;
use pdf_desk::AppState;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token-123";
pub const TEST_USER: &str = "demo@example.com";
pub const TEST_PASSWORD: &str = "demo123";

pub struct TestApp {
    pub server: MockServer,
    pub settings: Settings,
    pub store: Arc<MemoryCredentialStore>,
    pub state: AppState,
}

impl TestApp {
    /// Client state against a fresh mock backend, with nothing stored.
    pub async fn spawn(routes: RouteStyle) -> Self {
        Self::spawn_with_store(routes, MemoryCredentialStore::new()).await
    }

    /// Store holds [`TEST_TOKEN`] from an earlier run; nothing loaded yet.
    pub async fn spawn_with_stored_token(routes: RouteStyle) -> Self {
        Self::spawn_with_store(routes, MemoryCredentialStore::with_token(TEST_TOKEN)).await
    }

    /// Client state whose store already holds [`TEST_TOKEN`]. The session is
    /// rehydrated but not validated.
    pub async fn spawn_logged_in(routes: RouteStyle) -> Self {
        let app = Self::spawn_with_stored_token(routes).await;
        app.state
            .auth
            .restore()
            .await
            .expect("Failed to restore credential");
        app
    }

    async fn spawn_with_store(routes: RouteStyle, store: MemoryCredentialStore) -> Self {
        let server = MockServer::start().await;
        let settings = test_settings(&server.uri(), routes);
        let store = Arc::new(store);
        let dyn_store: Arc<dyn CredentialStore> = store.clone();
        let state = build_state_with_store(&settings, dyn_store).expect("Failed to build state");

        Self {
            server,
            settings,
            store,
            state,
        }
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.stored().map(|c| c.expose().to_string())
    }
}

pub fn test_settings(url: &str, routes: RouteStyle) -> Settings {
    Settings {
        backend: BackendSettings::new(url, routes),
        auth: AuthSettings {
            credential_path: PathBuf::from("unused-in-tests"),
            validity_check_interval_secs: 300,
        },
        list: ListSettings {
            debounce_ms: 50,
            page_size: 10,
        },
        upload: UploadSettings::default(),
        telemetry: TelemetrySettings::default(),
    }
}

pub fn bearer() -> String {
    format!("Bearer {}", TEST_TOKEN)
}

pub fn document_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "filename": title,
        "total_pages": 3,
        "uploaded_by": TEST_USER,
        "upload_date": "2024-05-01T12:00:00",
        "size": 2048
    })
}

/// Backend page body with `pages` computed from `total` and `size`.
pub fn page_json(items: Vec<Value>, total: u64, page: u32, size: u32) -> Value {
    json!({
        "items": items,
        "total": total,
        "page": page,
        "size": size,
        "pages": total.div_ceil(u64::from(size)),
    })
}

pub fn valid_token_json() -> Value {
    json!({
        "valid": true,
        "message": "Token is valid",
        "expires_at": "2030-01-01T00:00:00",
        "remaining_minutes": 42.0
    })
}
