// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bus Tracker headless client
//!
//! Restores (or establishes) a session, then follows the fleet live and
//! logs what the dashboard would show, until interrupted.

use anyhow::Context;
use bus_tracker::{config::Config, services::FileStore, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        api = %config.api_base_url,
        speed_unit = %config.speed_unit,
        "Starting Bus Tracker client"
    );

    let store = FileStore::new(config.session_dir.clone());
    let mut state = AppState::new(config.clone(), store);

    // Restore session, or log in with configured credentials
    if state.auth.rehydrate().is_none() {
        match (&config.login_email, &config.login_password) {
            (Some(email), Some(password)) => {
                state
                    .auth
                    .login(email, password)
                    .await
                    .context("Login failed")?;
            }
            _ => anyhow::bail!("No stored session; set LOGIN_EMAIL and LOGIN_PASSWORD"),
        }
    }
    if let Some(user) = state.auth.user() {
        tracing::info!(name = %user.name, "Signed in");
    }

    // Follow the fleet
    let mut dashboard = state.dashboard();
    dashboard.load().await;
    dashboard.start_polling();

    let mut ticker = tokio::time::interval(config.poll_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => log_dashboard(&mut dashboard).await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.unmount();
    tracing::info!("Shutting down");
    Ok(())
}

async fn log_dashboard(dashboard: &mut bus_tracker::dashboard::Dashboard) {
    let view = dashboard.snapshot().await;
    if let Some(banner) = &view.banner {
        tracing::warn!(banner = %banner, "Status");
    }

    match &view.selected {
        Some(bus) => tracing::info!(
            bus_id = bus.id,
            bus = %bus.bus_name,
            lat = bus.current_position.lat,
            long = bus.current_position.long,
            speed = bus.current_position.speed,
            passengers = bus.current_position.passenger_count,
            live = bus.from_api,
            address = view.address.as_deref().unwrap_or("-"),
            nearest_stop = view.nearest_stop.as_ref().map(|n| n.stop.name.as_str()).unwrap_or("-"),
            eta = %view.eta,
            "Tracking"
        ),
        None => tracing::info!(buses = view.buses.len(), "No bus selected"),
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bus_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
