// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bus Tracker: client core of the live bus-tracking app
//!
//! This crate provides everything the app's screens call into: the session
//! store, the backend API client, and the tracking reconciler that turns
//! live, mock and error data into one display-ready record per bus.

pub mod bus_colors;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod eta;
pub mod forms;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{ApiClient, AuthSession, BusTracker, MockDataset, ReverseGeocoder, SecureStore};

/// Shared client state for one signed-in app instance.
pub struct AppState<S: SecureStore> {
    pub config: Config,
    pub api: ApiClient,
    pub auth: AuthSession<S>,
    pub tracker: BusTracker,
}

impl<S: SecureStore> AppState<S> {
    /// Wire up the client from configuration. The session is not yet
    /// rehydrated.
    pub fn new(config: Config, store: S) -> Self {
        let api = ApiClient::new(config.api_base_url.clone(), config.api_timeout);
        let auth = AuthSession::new(api.clone(), store);
        let tracker = BusTracker::new(api.clone(), MockDataset::builtin());
        Self {
            config,
            api,
            auth,
            tracker,
        }
    }

    /// Dashboard over this state's tracker.
    pub fn dashboard(&self) -> dashboard::Dashboard {
        dashboard::Dashboard::new(
            self.tracker.clone(),
            self.config.speed_unit,
            self.config.poll_interval,
        )
    }

    /// Dashboard that also resolves the selected bus's street address.
    pub fn dashboard_with_geocoder<G: ReverseGeocoder>(
        &self,
        geocoder: G,
    ) -> dashboard::Dashboard<G> {
        dashboard::Dashboard::with_geocoder(
            self.tracker.clone(),
            self.config.speed_unit,
            self.config.poll_interval,
            geocoder,
        )
    }
}
