// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API client.
//!
//! Handles:
//! - Auth (login, register) and account updates
//! - Password reset (request token, set new password)
//! - Bus list, stop list and per-bus tracking payloads
//!
//! Shape differences between backend versions are resolved here, via the
//! raw types in [`crate::models::payload`].

use crate::error::{ClientError, Result};
use crate::models::payload::{
    ErrorBody, ListEnvelope, RawBus, RawStop, RawTracking, TrackingEnvelope,
};
use crate::models::{AuthResponse, BusId, BusSummary, Stop};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role sent with every self-registration.
const REGISTER_ROLE: &str = "user";

/// Backend API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.post_json("/api/auth/login", &body, None).await?;
        self.check_response_json(response, ErrorPolicy::error_first("Login failed"))
            .await
    }

    /// `POST /api/auth/register`
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "role": REGISTER_ROLE,
        });
        let response = self.post_json("/api/auth/register", &body, None).await?;
        self.check_response_json(
            response,
            ErrorPolicy::message_first("Registration failed"),
        )
        .await
    }

    /// `POST /api/update/forgot-password`, returns the reset token.
    pub async fn forgot_password(&self, email: &str) -> Result<ForgotPasswordResponse> {
        let body = serde_json::json!({ "email": email });
        let response = self
            .post_json("/api/update/forgot-password", &body, None)
            .await?;
        self.check_response_json(
            response,
            ErrorPolicy::error_first("Failed to validate email"),
        )
        .await
    }

    /// `POST /api/update/reset-password`
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<()> {
        let body = ResetPasswordRequest {
            token,
            password,
            password_confirmation,
        };
        let response = self
            .post_json("/api/update/reset-password", &body, None)
            .await?;
        self.check_response(response, ErrorPolicy::error_first("Failed to reset password"))
            .await
    }

    /// `POST /api/update/info` (bearer-authenticated)
    pub async fn update_info(&self, access_token: &str, name: &str, email: &str) -> Result<()> {
        let body = serde_json::json!({ "name": name, "email": email });
        let response = self
            .post_json("/api/update/info", &body, Some(access_token))
            .await?;
        self.check_response(response, ErrorPolicy::error_first("Update failed"))
            .await
    }

    // ─── Tracking ────────────────────────────────────────────────────────────

    /// `GET /api/buses`. Entries without an id are dropped.
    pub async fn list_buses(&self) -> Result<Vec<BusSummary>> {
        let envelope: ListEnvelope<RawBus> = self.get_json("/api/buses").await?;
        let raw = envelope.into_items();
        let total = raw.len();

        let buses: Vec<BusSummary> = raw.into_iter().filter_map(BusSummary::from_raw).collect();
        if buses.len() < total {
            tracing::warn!(dropped = total - buses.len(), "Bus entries without id ignored");
        }
        Ok(buses)
    }

    /// `GET /api/stops`. Entries without an id or coordinates are dropped.
    pub async fn list_stops(&self) -> Result<Vec<Stop>> {
        let envelope: ListEnvelope<RawStop> = self.get_json("/api/stops").await?;
        let raw = envelope.into_items();
        let total = raw.len();

        let stops: Vec<Stop> = raw.into_iter().filter_map(Stop::from_raw).collect();
        if stops.len() < total {
            tracing::warn!(dropped = total - stops.len(), "Malformed stops ignored");
        }
        Ok(stops)
    }

    /// `GET /api/buses/{id}/tracking`. Fails unless the backend reports success.
    pub async fn bus_tracking(&self, bus_id: BusId) -> Result<RawTracking> {
        let envelope: TrackingEnvelope = self
            .get_json(&format!("/api/buses/{}/tracking", bus_id))
            .await?;
        let message = envelope.message.clone();
        envelope.into_data().ok_or_else(|| {
            ClientError::Payload(
                message.unwrap_or_else(|| "Invalid API response format".to_string()),
            )
        })
    }

    // ─── Plumbing ────────────────────────────────────────────────────────────

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .post(self.url(path))
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ClientError::Network(format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Payload(format!("JSON parse error: {}", e)))
    }

    /// Check response status and return the server's message if not successful.
    async fn check_response(&self, response: reqwest::Response, policy: ErrorPolicy) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(api_error(response, policy).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        policy: ErrorPolicy,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(api_error(response, policy).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Payload(format!("JSON parse error: {}", e)))
    }
}

/// Which error-body field carries the user-facing message, and the default.
#[derive(Debug, Clone, Copy)]
struct ErrorPolicy {
    prefer_message: bool,
    fallback: &'static str,
}

impl ErrorPolicy {
    const fn error_first(fallback: &'static str) -> Self {
        Self {
            prefer_message: false,
            fallback,
        }
    }

    const fn message_first(fallback: &'static str) -> Self {
        Self {
            prefer_message: true,
            fallback,
        }
    }
}

async fn api_error(response: reqwest::Response, policy: ErrorPolicy) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.pick(policy.prefer_message))
        .unwrap_or_else(|| policy.fallback.to_string());

    tracing::debug!(status = %status, message = %message, "Backend rejected request");
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    password: &'a str,
    password_confirmation: &'a str,
}

/// Response of the forgot-password step.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordResponse {
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}
