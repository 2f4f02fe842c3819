use crate::config::{ListSettings, Settings};
use crate::error::ClientError;
use crate::services::api_client::ApiClient;
use crate::services::auth_client::AuthClient;
use crate::services::auth_state::AuthState;
use crate::services::credential_store::{CredentialStore, FileCredentialStore};
use crate::services::document_client::DocumentClient;
use crate::services::logout_hook::LogoutHook;
use crate::view::list_view::ListViewModel;
use crate::view::page_sources::{ChunkPages, DocumentPages};
use crate::AppState;
use std::sync::Arc;

/// Wire clients, credential storage and the session from settings.
pub fn build_state(settings: &Settings) -> Result<AppState, ClientError> {
    let store: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(settings.auth.credential_path.clone()));
    build_state_with_store(settings, store)
}

/// Same as [`build_state`] with a caller-chosen credential store.
pub fn build_state_with_store(
    settings: &Settings,
    store: Arc<dyn CredentialStore>,
) -> Result<AppState, ClientError> {
    let logout_hook = LogoutHook::new();
    let api_client = Arc::new(ApiClient::new(settings.backend.clone(), logout_hook.clone())?);
    let auth_client = Arc::new(AuthClient::new(api_client.clone()));
    let document_client = Arc::new(DocumentClient::new(api_client.clone()));

    let auth = AuthState::new(
        store,
        auth_client.clone(),
        &logout_hook,
        settings.auth.validity_check_interval(),
    );

    tracing::info!(
        backend = %settings.backend.url,
        routes = ?settings.backend.routes,
        "Client state initialised"
    );

    Ok(AppState::new(
        logout_hook,
        api_client,
        auth_client,
        document_client,
        auth,
    ))
}

pub fn document_list_view(state: &AppState, list: &ListSettings) -> ListViewModel<DocumentPages> {
    ListViewModel::new(
        DocumentPages::new(state.document_client.clone(), state.auth.clone()),
        list.page_size,
        list.debounce(),
    )
}

pub fn chunk_list_view(
    state: &AppState,
    list: &ListSettings,
    document_id: i64,
) -> ListViewModel<ChunkPages> {
    ListViewModel::new(
        ChunkPages::new(state.document_client.clone(), state.auth.clone(), document_id),
        list.page_size,
        list.debounce(),
    )
}
