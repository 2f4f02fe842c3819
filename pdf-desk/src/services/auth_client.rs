use crate::error::ClientError;
use crate::models::{Credential, LoginForm, TokenResponse, TokenValidation};
use crate::services::api_client::{decode_json, ApiClient, RequestOptions};
use reqwest::Method;
use std::sync::Arc;
use validator::Validate;

/// Login and token-validation calls against the backend's auth routes.
pub struct AuthClient {
    api: Arc<ApiClient>,
}

impl AuthClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Exchange username and password for a bearer credential.
    ///
    /// Wrong credentials come back as [`ClientError::Server`] with the
    /// backend's `detail` message; they never trigger the logout hook.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ClientError> {
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        form.validate()?;

        let path = self.api.settings().login_path();
        let response = self
            .api
            .public_request(
                Method::POST,
                &path,
                RequestOptions::new().form(vec![
                    ("username".to_string(), form.username.clone()),
                    ("password".to_string(), form.password),
                ]),
            )
            .await?;

        let token: TokenResponse = decode_json(response).await.map_err(|e| {
            tracing::warn!(username = %form.username, error = %e, "Login failed");
            e
        })?;

        let credential = Credential::new(token.access_token);
        if credential.is_empty() {
            return Err(ClientError::Decode("login response carried an empty token".to_string()));
        }

        tracing::info!(username = %form.username, "User logged in successfully");
        Ok(credential)
    }

    /// Ask the backend whether `credential` is still good.
    pub async fn validate_token(&self, credential: &Credential) -> Result<TokenValidation, ClientError> {
        let path = self.api.settings().validate_token_path();
        let response = self
            .api
            .request(Method::GET, &path, Some(credential), RequestOptions::new())
            .await?;

        decode_json(response).await
    }
}
