// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store tests against the fake backend.

use bus_tracker::error::{ClientError, Result};
use bus_tracker::models::User;
use bus_tracker::services::storage::keys;
use bus_tracker::services::{AuthSession, AuthState, MemoryStore, SecureStore};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{spawn_backend, TAKEN_EMAIL, VALID_PASSWORD, VALID_TOKEN};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Store whose writes or deletes of selected keys fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_set: bool,
    fail_delete: Option<&'static str>,
}

impl SecureStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_set {
            return Err(ClientError::Storage("keystore locked".to_string()));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.fail_delete == Some(key) {
            return Err(ClientError::Storage("keystore locked".to_string()));
        }
        self.inner.delete(key)
    }
}

fn stored_user(store: &impl SecureStore) -> Option<User> {
    store
        .get(keys::USER)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

#[tokio::test]
async fn test_login_success_persists_session() {
    let backend = spawn_backend().await;
    let store = Arc::new(MemoryStore::new());
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store.clone());

    assert!(auth.is_loading());
    assert!(auth.rehydrate().is_none());
    assert!(!auth.is_loading());

    let session = auth.login("ana@example.com", VALID_PASSWORD).await.unwrap();
    assert_eq!(session.user.name, "Ana Cruz");
    assert_eq!(session.token.as_deref(), Some(VALID_TOKEN));

    assert!(auth.is_authenticated());
    assert_eq!(auth.token(), Some(VALID_TOKEN));
    assert_eq!(
        stored_user(&store).map(|u| u.email),
        Some("ana@example.com".to_string())
    );
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let backend = spawn_backend().await;
    let store = Arc::new(MemoryStore::new());
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store.clone());
    auth.rehydrate();

    let err = auth
        .login("ana@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));

    assert_eq!(auth.state(), &AuthState::Unauthenticated);
    assert!(store.get(keys::USER).unwrap().is_none());
    assert!(store.get(keys::TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn test_failed_relogin_keeps_existing_session() {
    let backend = spawn_backend().await;
    let store = Arc::new(MemoryStore::new());
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store.clone());
    auth.login("ana@example.com", VALID_PASSWORD).await.unwrap();

    let err = auth
        .login("ana@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    // Memory and storage still agree on the original session.
    assert!(auth.is_authenticated());
    assert_eq!(auth.token(), Some(VALID_TOKEN));
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some(VALID_TOKEN));

    let mut restored = AuthSession::new(common::unreachable_client(), store.clone());
    assert_eq!(
        restored.rehydrate().map(|s| s.user.name.clone()),
        auth.user().map(|u| u.name.clone())
    );
}

#[tokio::test]
async fn test_login_validation_skips_network() {
    let backend = spawn_backend().await;
    let mut auth = AuthSession::new(backend.client(TIMEOUT), MemoryStore::new());

    let err = auth.login("", VALID_PASSWORD).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(err.to_string(), "Please fill out all fields.");
    assert_eq!(backend.state.hits("/api/auth/login"), 0);
}

#[tokio::test]
async fn test_login_unreachable_backend() {
    let mut auth = AuthSession::new(common::unreachable_client(), MemoryStore::new());

    let err = auth.login("ana@example.com", VALID_PASSWORD).await.unwrap_err();
    assert!(err.is_network());
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_login_survives_persistence_failure() {
    let backend = spawn_backend().await;
    let store = FlakyStore {
        fail_set: true,
        ..Default::default()
    };
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store);

    auth.login("ana@example.com", VALID_PASSWORD).await.unwrap();
    assert!(auth.is_authenticated());
    assert!(auth.store().get(keys::USER).unwrap().is_none());
}

#[tokio::test]
async fn test_register_sends_user_role() {
    let backend = spawn_backend().await;
    let mut auth = AuthSession::new(backend.client(TIMEOUT), MemoryStore::new());

    let session = auth
        .register("Ben Santos", "ben@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(session.user.role.as_deref(), Some("user"));

    let sent = backend.state.last_register().unwrap();
    assert_eq!(sent["role"], "user");
    assert_eq!(sent["name"], "Ben Santos");
}

#[tokio::test]
async fn test_register_failure_uses_message_field() {
    let backend = spawn_backend().await;
    let mut auth = AuthSession::new(backend.client(TIMEOUT), MemoryStore::new());

    let err = auth
        .register("Ben Santos", TAKEN_EMAIL, "pw")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The email has already been taken.");
    assert!(!auth.is_authenticated());
}

#[test]
fn test_rehydrate_restores_stored_session() {
    let store = MemoryStore::new();
    store
        .set(
            keys::USER,
            r#"{"name":"Ana Cruz","email":"ana@example.com","role":"user"}"#,
        )
        .unwrap();
    store.set(keys::TOKEN, VALID_TOKEN).unwrap();

    let mut auth = AuthSession::new(common::unreachable_client(), store);
    let session = auth.rehydrate().cloned().unwrap();
    assert_eq!(session.user.name, "Ana Cruz");
    assert_eq!(session.token.as_deref(), Some(VALID_TOKEN));
    assert!(!auth.is_loading());
}

#[test]
fn test_rehydrate_ignores_corrupt_user() {
    let store = MemoryStore::new();
    store.set(keys::USER, "{not json").unwrap();
    store.set(keys::TOKEN, VALID_TOKEN).unwrap();

    let mut auth = AuthSession::new(common::unreachable_client(), store);
    assert!(auth.rehydrate().is_none());
    assert_eq!(auth.state(), &AuthState::Unauthenticated);
    assert!(!auth.is_loading());
}

#[tokio::test]
async fn test_logout_clears_memory_even_if_storage_fails() {
    let backend = spawn_backend().await;
    let store = FlakyStore {
        fail_delete: Some(keys::USER),
        ..Default::default()
    };
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store);
    auth.login("ana@example.com", VALID_PASSWORD).await.unwrap();

    assert!(!auth.logout());
    assert_eq!(auth.state(), &AuthState::Unauthenticated);
    assert!(auth.token().is_none());

    // The token entry is still removed even though the user entry failed.
    assert!(auth.store().get(keys::TOKEN).unwrap().is_none());
    assert!(auth.store().get(keys::USER).unwrap().is_some());
}

#[tokio::test]
async fn test_logout_clean() {
    let backend = spawn_backend().await;
    let store = Arc::new(MemoryStore::new());
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store.clone());
    auth.login("ana@example.com", VALID_PASSWORD).await.unwrap();

    assert!(auth.logout());
    assert!(store.get(keys::USER).unwrap().is_none());
    assert!(store.get(keys::TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn test_update_profile() {
    let backend = spawn_backend().await;
    let store = Arc::new(MemoryStore::new());
    let mut auth = AuthSession::new(backend.client(TIMEOUT), store.clone());
    auth.login("ana@example.com", VALID_PASSWORD).await.unwrap();

    auth.update_profile("Ana Reyes", "ana.reyes@example.com")
        .await
        .unwrap();
    assert_eq!(auth.user().map(|u| u.name.as_str()), Some("Ana Reyes"));
    assert_eq!(
        stored_user(&store).map(|u| u.email),
        Some("ana.reyes@example.com".to_string())
    );

    let err = auth.update_profile("", "x@example.com").await.unwrap_err();
    assert_eq!(err.to_string(), "All fields are required");
}

#[tokio::test]
async fn test_update_profile_requires_session() {
    let backend = spawn_backend().await;
    let mut auth = AuthSession::new(backend.client(TIMEOUT), MemoryStore::new());

    let err = auth
        .update_profile("Ana Reyes", "ana@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated));
    assert_eq!(backend.state.hits("/api/update/info"), 0);
}
