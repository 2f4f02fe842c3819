pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod view;

use services::{
    api_client::ApiClient, auth_client::AuthClient, auth_state::AuthState,
    document_client::DocumentClient, logout_hook::LogoutHook,
};
use std::sync::Arc;

/// Shared application state containing the backend clients and the session.
#[derive(Clone)]
pub struct AppState {
    pub logout_hook: LogoutHook,
    pub api_client: Arc<ApiClient>,
    pub auth_client: Arc<AuthClient>,
    pub document_client: Arc<DocumentClient>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(
        logout_hook: LogoutHook,
        api_client: Arc<ApiClient>,
        auth_client: Arc<AuthClient>,
        document_client: Arc<DocumentClient>,
        auth: AuthState,
    ) -> Self {
        Self {
            logout_hook,
            api_client,
            auth_client,
            document_client,
            auth,
        }
    }
}
