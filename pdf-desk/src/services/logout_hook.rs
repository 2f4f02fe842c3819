//! Single-slot logout callback register.
//!
//! The HTTP layer needs to end the session when the backend answers 401, but it
//! must not depend on the auth state holder that owns the credential. The
//! holder registers its `logout` here at construction and the HTTP layer only
//! ever calls [`LogoutHook::trigger`] with the credential the backend
//! rejected, so a holder that has moved on to a newer credential can ignore it.
//!
//! Contract: exactly one writer, the live `AuthState`. A later registration
//! replaces the earlier one so the hook always reaches the current holder.

use crate::models::Credential;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, RwLock};

type LogoutHandler = Arc<dyn Fn(Credential) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct LogoutHook {
    slot: Arc<RwLock<Option<LogoutHandler>>>,
}

impl LogoutHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler`, replacing any previous registration.
    pub fn register<F, Fut>(&self, handler: F)
    where
        F: Fn(Credential) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: LogoutHandler = Arc::new(move |rejected| -> BoxFuture<'static, ()> {
            Box::pin(handler(rejected))
        });
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(handler);
    }

    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    pub fn is_registered(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Run the registered handler for `rejected`. Returns `false` when nothing
    /// is registered.
    pub async fn trigger(&self, rejected: &Credential) -> bool {
        // Clone out of the lock so the handler may re-register.
        let handler = self
            .slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        match handler {
            Some(handler) => {
                handler(rejected.clone()).await;
                true
            }
            None => {
                tracing::debug!("Logout requested but no handler is registered");
                false
            }
        }
    }
}

impl std::fmt::Debug for LogoutHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoutHook")
            .field("registered", &self.is_registered())
            .finish()
    }
}
