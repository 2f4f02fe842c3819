//! Authenticated HTTP wrapper around the document backend.
//!
//! Every backend call goes through [`ApiClient::request`], which attaches the
//! bearer credential and escalates 401 answers to the registered logout
//! handler. Everything else is handed back to the caller untouched.

use crate::config::BackendSettings;
use crate::error::ClientError;
use crate::models::Credential;
use crate::services::logout_hook::LogoutHook;
use desk_core::observability::{TracedClientExt, TracedRequest};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Body variants a backend call can carry.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(reqwest::multipart::Form),
}

/// Caller-supplied request options.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }
}

pub struct ApiClient {
    client: Client,
    settings: BackendSettings,
    logout_hook: LogoutHook,
}

impl ApiClient {
    pub fn new(settings: BackendSettings, logout_hook: LogoutHook) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            settings,
            logout_hook,
        })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn base_url(&self) -> &str {
        self.settings.url.trim_end_matches('/')
    }

    pub fn logout_hook(&self) -> &LogoutHook {
        &self.logout_hook
    }

    /// Send an authenticated request.
    ///
    /// Fails with [`ClientError::MissingCredential`] before touching the
    /// network when no usable credential is supplied. A 401 answer runs the
    /// registered logout handler and fails with [`ClientError::Unauthorized`];
    /// any other status is returned as-is.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let credential = match credential {
            Some(credential) if !credential.is_empty() => credential,
            _ => {
                tracing::warn!(path = %path, "Refusing to send request without a credential");
                return Err(ClientError::MissingCredential);
            }
        };

        let url = format!("{}{}", self.base_url(), path);
        let mut options = options;
        // The bearer header always comes from the session, never the caller.
        options.headers.remove(AUTHORIZATION);

        let response = self
            .build(method.clone(), &url, options)
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send {} request to {}: {}", method, url, e);
                ClientError::Network(e)
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %url, "Backend rejected credential, ending session");
            self.logout_hook.trigger(credential).await;
            return Err(ClientError::Unauthorized);
        }

        Ok(response)
    }

    /// Send a request that needs no session, e.g. the login form.
    pub async fn public_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url(), path);

        self.build(method.clone(), &url, options)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send {} request to {}: {}", method, url, e);
                ClientError::Network(e)
            })
    }

    fn build(&self, method: Method, url: &str, options: RequestOptions) -> TracedRequest {
        let mut request = self.client.traced_request(method, url).headers(options.headers);

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }

        match options.body {
            Some(RequestBody::Json(body)) => request.json(&body),
            Some(RequestBody::Form(pairs)) => request.form(&pairs),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        }
    }
}

/// Decode a 2xx JSON body, or turn any other status into a server error.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(server_error(response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Build a [`ClientError::Server`] from a non-2xx response, keeping the
/// backend's `detail` field when the body has one.
pub async fn server_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    ClientError::Server {
        status,
        detail: extract_detail(&body),
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Null => None,
        // Validation failures carry a list of field errors.
        other => Some(other.to_string()),
    }
}
