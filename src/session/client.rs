//! Stateful session driver. Owns the transport, the current [`Session`] and
//! the refresh-handle store, and serializes auth operations so at most one is
//! outstanding at a time. A call made while another is in flight resolves
//! immediately with [`AuthError::Busy`] instead of racing it.

use super::{transition, AuthError, Operation, Session, Transition};
use crate::{
    api::{ApiClient, ApiResponse, RequestOptions, TransportError},
    config::ClientConfig,
    store::{MemoryStore, RefreshHandle, RefreshHandleStore},
};
use reqwest::{header::AUTHORIZATION, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct SessionClient {
    api: ApiClient,
    config: ClientConfig,
    store: Arc<dyn RefreshHandleStore>,
    session: RwLock<Session>,
    in_flight: Mutex<()>,
}

impl SessionClient {
    /// Builds a client and seeds its cookie store from any saved refresh handle.
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, store: Arc<dyn RefreshHandleStore>) -> Result<Self, TransportError> {
        let api = ApiClient::new(&config)?;

        match store.load() {
            Ok(Some(handle)) => {
                debug!(cookie = %handle.cookie_name, "restoring refresh handle");
                api.cookies()
                    .insert(&handle.cookie_name, handle.value.expose_secret());
            }
            Ok(None) => {}
            Err(err) => warn!("Failed to load refresh handle: {err:#}"),
        }

        Ok(Self {
            api,
            config,
            store,
            session: RwLock::new(Session::Anonymous),
            in_flight: Mutex::new(()),
        })
    }

    /// Builds a client whose refresh handle lives only as long as the process.
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn in_memory(config: ClientConfig) -> Result<Self, TransportError> {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether the cookie store currently holds a refresh session.
    #[must_use]
    pub fn has_refresh_handle(&self) -> bool {
        self.api.cookies().get(&self.config.refresh_cookie).is_some()
    }

    #[instrument(skip(self, email, password))]
    pub async fn register(&self, email: &str, password: &SecretString) -> Transition {
        let credentials = Credentials {
            email,
            password: password.expose_secret(),
        };
        match RequestOptions::json(&credentials) {
            Ok(options) => self.run(Operation::Register, options).await,
            Err(err) => self.reject(Operation::Register, err.into()).await,
        }
    }

    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Transition {
        let credentials = Credentials {
            email,
            password: password.expose_secret(),
        };
        match RequestOptions::json(&credentials) {
            Ok(options) => self.run(Operation::Login, options).await,
            Err(err) => self.reject(Operation::Login, err.into()).await,
        }
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Transition {
        self.run(Operation::Refresh, RequestOptions::default()).await
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Transition {
        self.run(Operation::Logout, RequestOptions::default()).await
    }

    /// Sends a request to another endpoint of the same service, carrying the
    /// session cookies and, when configured, the bearer token.
    /// # Errors
    /// Returns an error if the exchange could not be completed.
    pub async fn authorized_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, TransportError> {
        let current = self.session().await;
        let options = self.with_bearer(options, &current);
        self.api.request(method, path, options).await
    }

    async fn run(&self, operation: Operation, options: RequestOptions) -> Transition {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!(%operation, "rejected: another auth operation is in progress");
            return Transition::rejected(operation, &self.session().await, AuthError::Busy);
        };

        let current = self.session().await;
        let options = self.with_bearer(options, &current);

        let result = self
            .api
            .request::<Value>(Method::POST, operation.path(), options)
            .await;

        let transition = transition::apply(operation, &current, result);

        if transition.is_success() {
            self.sync_refresh_handle(operation);
        }

        *self.session.write().await = transition.session.clone();

        info!(
            %operation,
            success = transition.is_success(),
            authenticated = transition.session.is_authenticated(),
            "{}",
            transition.message
        );

        transition
    }

    async fn reject(&self, operation: Operation, error: AuthError) -> Transition {
        Transition::rejected(operation, &self.session().await, error)
    }

    fn with_bearer(&self, options: RequestOptions, current: &Session) -> RequestOptions {
        if !self.config.attach_bearer_token {
            return options;
        }

        match current.access_token() {
            Some(token) => options.header(AUTHORIZATION.as_str(), format!("Bearer {}", token.expose())),
            None => options,
        }
    }

    /// Persists or clears the refresh handle after a successful operation.
    /// Storage failures are logged and never affect the transition.
    fn sync_refresh_handle(&self, operation: Operation) {
        let name = &self.config.refresh_cookie;

        if operation == Operation::Logout {
            self.api.cookies().remove(name);
            if let Err(err) = self.store.clear() {
                warn!("Failed to clear refresh handle: {err:#}");
            }
            return;
        }

        let Some(value) = self.api.cookies().get(name) else {
            debug!(cookie = %name, "no refresh cookie issued");
            return;
        };

        if let Err(err) = self.store.save(&RefreshHandle::new(name.clone(), value)) {
            warn!("Failed to save refresh handle: {err:#}");
        }
    }
}
