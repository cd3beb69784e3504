// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication session store.
//!
//! Owns the current user and bearer token, mirrors them into secure storage
//! and rehydrates them once at startup. The session is an explicit object
//! handed to whoever needs it; there is no ambient global.

use crate::error::{ClientError, Result};
use crate::forms::{LoginForm, ProfileForm, RegisterForm};
use crate::models::{AuthResponse, Session, User};
use crate::services::api::ApiClient;
use crate::services::storage::{keys, SecureStore};

/// Authentication state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated(Session),
}

/// Session store over a [`SecureStore`].
pub struct AuthSession<S: SecureStore> {
    api: ApiClient,
    store: S,
    state: AuthState,
    /// True until the first `rehydrate()` completes
    loading: bool,
}

impl<S: SecureStore> AuthSession<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            state: AuthState::Unauthenticated,
            loading: true,
        }
    }

    /// Restore user and token from secure storage.
    ///
    /// Unreadable entries are logged and treated as absent. Clears the
    /// loading flag whatever the outcome.
    pub fn rehydrate(&mut self) -> Option<&Session> {
        let user = match self.store.get(keys::USER) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored user is unreadable, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to restore user");
                None
            }
        };

        let token = match self.store.get(keys::TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to restore token");
                None
            }
        };

        self.state = match user {
            Some(user) => {
                tracing::info!(email = %user.email, has_token = token.is_some(), "Session restored");
                AuthState::Authenticated(Session { user, token })
            }
            None => AuthState::Unauthenticated,
        };
        self.loading = false;
        self.session()
    }

    /// Log in with email and password.
    ///
    /// On failure the server's message is returned; a signed-in session
    /// stays signed in, otherwise the state is unauthenticated.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session> {
        LoginForm::new(email, password).check()?;

        let previous = std::mem::replace(&mut self.state, AuthState::Authenticating);
        let result = self.api.login(email, password).await;
        self.complete(result, previous)
    }

    /// Register a new account; same contract as [`login`](Self::login).
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<&Session> {
        RegisterForm::new(name, email, password).check()?;

        let previous = std::mem::replace(&mut self.state, AuthState::Authenticating);
        let result = self.api.register(name, email, password).await;
        self.complete(result, previous)
    }

    /// Apply an auth response. A failure leaves any existing session (in
    /// memory and in storage) in place.
    fn complete(&mut self, result: Result<AuthResponse>, previous: AuthState) -> Result<&Session> {
        let response = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::info!(error = %e, "Authentication failed");
                self.state = match previous {
                    AuthState::Authenticated(session) => AuthState::Authenticated(session),
                    _ => AuthState::Unauthenticated,
                };
                return Err(e);
            }
        };

        let session = Session {
            user: response.user,
            token: response.token,
        };
        if let Err(e) = self.persist(&session) {
            tracing::warn!(error = %e, "Failed to persist session, continuing anyway");
        }

        tracing::info!(email = %session.user.email, "Authenticated");
        self.state = AuthState::Authenticated(session);
        self.session().ok_or(ClientError::Unauthenticated)
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Failed to encode user: {}", e)))?;
        self.store.set(keys::USER, &user)?;
        match &session.token {
            Some(token) => self.store.set(keys::TOKEN, token),
            None => self.store.delete(keys::TOKEN),
        }
    }

    /// Clear the session.
    ///
    /// Memory is cleared first and unconditionally. Both storage entries are
    /// deleted independently; returns `false` if either deletion failed.
    pub fn logout(&mut self) -> bool {
        self.state = AuthState::Unauthenticated;

        let mut ok = true;
        for key in [keys::USER, keys::TOKEN] {
            if let Err(e) = self.store.delete(key) {
                tracing::error!(key, error = %e, "Logout failed to clear stored entry");
                ok = false;
            }
        }
        tracing::info!(clean = ok, "Logged out");
        ok
    }

    /// Update name and email of the signed-in user.
    pub async fn update_profile(&mut self, name: &str, email: &str) -> Result<()> {
        ProfileForm::new(name, email).check()?;

        let token = self
            .token()
            .map(str::to_string)
            .ok_or(ClientError::Unauthenticated)?;
        self.api.update_info(&token, name, email).await?;

        if let AuthState::Authenticated(session) = &mut self.state {
            session.user.name = name.to_string();
            session.user.email = email.to_string();
        }
        if let Some(session) = self.session() {
            if let Err(e) = self.persist(session) {
                tracing::warn!(error = %e, "Failed to persist updated profile");
            }
        }
        Ok(())
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session().and_then(|s| s.token.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
