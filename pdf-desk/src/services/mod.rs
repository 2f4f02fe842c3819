pub mod api_client;
pub mod auth_client;
pub mod auth_state;
pub mod credential_store;
pub mod document_client;
pub mod logout_hook;
