//! Session owner.
//!
//! `AuthState` is the only holder of the bearer credential. Views and flows
//! read it through [`AuthState::credential`] and never keep their own copy, so
//! a logout (explicit, periodic, or triggered by a 401 anywhere) is seen by
//! everyone at once.
//!
//! Rejections are tied to the credential they were issued for. A late answer
//! about a credential that has since been replaced leaves the newer session
//! alone.

use crate::error::ClientError;
use crate::models::{AuthStatus, Credential};
use crate::services::auth_client::AuthClient;
use crate::services::credential_store::CredentialStore;
use crate::services::logout_hook::LogoutHook;
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shortest period between background validity checks.
pub const MIN_VALIDITY_CHECK_INTERVAL: Duration = Duration::from_secs(1);

struct Inner {
    store: Arc<dyn CredentialStore>,
    auth_client: Arc<AuthClient>,
    credential: RwLock<Option<Credential>>,
    /// Serializes login and logout so storage and memory change together.
    transition: Mutex<()>,
    status: watch::Sender<AuthStatus>,
    validity_check_interval: Duration,
}

#[derive(Clone)]
pub struct AuthState {
    inner: Arc<Inner>,
}

/// Keeps the periodic validity check alive. Dropping it stops the task.
#[derive(Debug)]
pub struct ValidityMonitor {
    handle: JoinHandle<()>,
}

impl Drop for ValidityMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl AuthState {
    /// Create the holder and register its `logout` as the global handler.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        auth_client: Arc<AuthClient>,
        logout_hook: &LogoutHook,
        validity_check_interval: Duration,
    ) -> Self {
        let (status, _) = watch::channel(AuthStatus::default());
        let state = Self {
            inner: Arc::new(Inner {
                store,
                auth_client,
                credential: RwLock::new(None),
                transition: Mutex::new(()),
                status,
                validity_check_interval,
            }),
        };
        state.register_logout(logout_hook);
        state
    }

    /// Point the hook at this holder, replacing any earlier registration.
    ///
    /// The hook keeps only a weak reference; once the holder is gone the
    /// handler does nothing.
    pub fn register_logout(&self, logout_hook: &LogoutHook) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        logout_hook.register(move |rejected: Credential| {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    AuthState { inner }.logout_if_current(&rejected).await;
                }
            }
        });
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner
            .credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Credential for a guarded operation; logged-out sessions are refused.
    pub fn require_credential(&self) -> Result<Credential, ClientError> {
        self.credential().ok_or(ClientError::MissingCredential)
    }

    pub fn status(&self) -> AuthStatus {
        *self.inner.status.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status().is_authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.inner.status.subscribe()
    }

    /// Wait until the start-up validity check has finished.
    pub async fn ready(&self) -> AuthStatus {
        let mut receiver = self.subscribe();
        let status = match receiver.wait_for(|status| !status.is_loading).await {
            Ok(status) => *status,
            // Sender lives in `inner`, which we hold.
            Err(_) => self.status(),
        };
        status
    }

    /// Rehydrate the credential from durable storage.
    pub async fn restore(&self) -> Result<bool, ClientError> {
        let _transition = self.inner.transition.lock().await;
        let stored = self.inner.store.load().await?;
        let present = stored.is_some();
        self.set_credential(stored);
        Ok(present)
    }

    /// Start the session: rehydrate, run one validity check and keep checking
    /// every `validity_check_interval`.
    ///
    /// `status().is_loading` stays true until the first check resolves.
    pub fn start(&self) -> ValidityMonitor {
        let weak = Arc::downgrade(&self.inner);
        let period = self
            .inner
            .validity_check_interval
            .max(MIN_VALIDITY_CHECK_INTERVAL);
        let state = self.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = state.restore().await {
                tracing::error!(error = %e, "Failed to restore stored credential");
            }
            state.check_token_validity().await;
            drop(state);

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                AuthState { inner }.check_token_validity().await;
            }
        });

        ValidityMonitor { handle }
    }

    /// Store a freshly issued credential and mark the session authenticated.
    ///
    /// A storage failure only costs persistence across restarts; the session
    /// itself continues.
    pub async fn login(&self, credential: Credential) {
        let _transition = self.inner.transition.lock().await;
        if let Err(e) = self.inner.store.save(&credential).await {
            tracing::error!(error = %e, "Failed to persist credential");
        }
        self.set_credential(Some(credential));
        self.inner.status.send_modify(|status| status.is_loading = false);
    }

    /// Log in with username and password via the backend.
    pub async fn login_with_password(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let credential = self.inner.auth_client.login(username, password).await?;
        self.login(credential).await;
        Ok(())
    }

    /// End the session. Calling it again is a no-op.
    pub async fn logout(&self) {
        let _transition = self.inner.transition.lock().await;
        self.end_session().await;
    }

    /// End the session only if it still runs on `rejected`.
    ///
    /// Returns `false` when the credential was already replaced or cleared,
    /// in which case nothing changes.
    pub async fn logout_if_current(&self, rejected: &Credential) -> bool {
        let _transition = self.inner.transition.lock().await;
        if self.credential().as_ref() != Some(rejected) {
            tracing::debug!("Ignoring rejection of a superseded credential");
            return false;
        }
        self.end_session().await;
        true
    }

    async fn end_session(&self) {
        if let Err(e) = self.inner.store.clear().await {
            tracing::error!(error = %e, "Failed to clear stored credential");
        }

        let had_credential = self
            .inner
            .credential
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some();
        self.inner.status.send_if_modified(|status| {
            let changed = status.is_authenticated;
            status.is_authenticated = false;
            changed
        });

        if had_credential {
            tracing::info!("User logged out");
        }
    }

    /// Check the credential with the backend.
    ///
    /// An invalid answer or any failure to get one ends the session, unless
    /// the checked credential was replaced while the check was in flight.
    /// Several checks may run at once.
    pub async fn check_token_validity(&self) -> bool {
        let valid = match self.credential() {
            None => {
                self.set_authenticated(false);
                false
            }
            Some(credential) => match self.inner.auth_client.validate_token(&credential).await {
                Ok(validation) if validation.valid => {
                    tracing::debug!(
                        remaining_minutes = ?validation.remaining_minutes,
                        "Credential is valid"
                    );
                    if self.credential().as_ref() == Some(&credential) {
                        self.set_authenticated(true);
                    }
                    true
                }
                Ok(validation) => {
                    tracing::warn!(
                        message = validation.message.as_deref().unwrap_or("none"),
                        "Credential is no longer valid"
                    );
                    self.logout_if_current(&credential).await;
                    false
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Credential validation failed");
                    self.logout_if_current(&credential).await;
                    false
                }
            },
        };

        self.inner.status.send_if_modified(|status| {
            let changed = status.is_loading;
            status.is_loading = false;
            changed
        });
        valid
    }

    fn set_credential(&self, credential: Option<Credential>) {
        let present = credential.is_some();
        *self
            .inner
            .credential
            .write()
            .unwrap_or_else(|e| e.into_inner()) = credential;
        self.set_authenticated(present);
    }

    fn set_authenticated(&self, authenticated: bool) {
        self.inner.status.send_if_modified(|status| {
            let changed = status.is_authenticated != authenticated;
            status.is_authenticated = authenticated;
            changed
        });
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("status", &self.status())
            .finish()
    }
}
