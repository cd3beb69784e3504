// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reverse geocoding with a last-coordinate cache.
//!
//! The lookup itself is the device's location service, behind
//! [`ReverseGeocoder`]. [`AddressResolver`] only asks it when the coordinate
//! pair changes, and drops results of lookups that were superseded by a
//! newer pair (last request wins).

use crate::error::{ClientError, Result};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

/// Shown when there is no usable address.
pub const NOT_AVAILABLE: &str = "N/A";

/// Reverse geocoding result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placemark {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Placemark {
    /// "name street, city, region, country", skipping empty parts.
    pub fn format(&self) -> Option<String> {
        let non_empty = |part: &Option<String>| {
            part.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let head: Vec<String> = [&self.name, &self.street]
            .into_iter()
            .filter_map(non_empty)
            .collect();

        let mut parts = Vec::new();
        if !head.is_empty() {
            parts.push(head.join(" "));
        }
        parts.extend(
            [&self.city, &self.region, &self.country]
                .into_iter()
                .filter_map(non_empty),
        );

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Platform reverse-geocoding service.
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the place at a coordinate. Fails with
    /// [`ClientError::PermissionDenied`] when location access is refused.
    fn reverse_geocode(
        &self,
        lat: f64,
        long: f64,
    ) -> impl Future<Output = Result<Option<Placemark>>> + Send;
}

/// Geocoder for environments without a location service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

impl ReverseGeocoder for NoGeocoder {
    fn reverse_geocode(
        &self,
        _lat: f64,
        _long: f64,
    ) -> impl Future<Output = Result<Option<Placemark>>> + Send {
        async { Ok(None) }
    }
}

type Coordinates = (Option<f64>, Option<f64>);

#[derive(Debug)]
struct ResolverState {
    last: Option<Coordinates>,
    address: String,
    /// Bumped on every new request and on cancel
    generation: u64,
}

/// Caching, last-request-wins address lookup.
pub struct AddressResolver<G: ReverseGeocoder> {
    geocoder: G,
    state: Mutex<ResolverState>,
}

impl<G: ReverseGeocoder> AddressResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            state: Mutex::new(ResolverState {
                last: None,
                address: NOT_AVAILABLE.to_string(),
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Address for the coordinate pair, or `"N/A"`.
    ///
    /// An unchanged pair returns the cached value without a lookup. A lookup
    /// that completes after a newer pair was requested is discarded and the
    /// current cached value is returned instead.
    pub async fn resolve(&self, lat: Option<f64>, long: Option<f64>) -> String {
        let (generation, lat, long) = {
            let mut state = self.lock();
            if state.last == Some((lat, long)) {
                return state.address.clone();
            }
            state.last = Some((lat, long));
            state.generation += 1;

            match (lat, long) {
                (Some(lat), Some(long)) => (state.generation, lat, long),
                _ => {
                    state.address = NOT_AVAILABLE.to_string();
                    return state.address.clone();
                }
            }
        };

        let address = match self.geocoder.reverse_geocode(lat, long).await {
            Ok(Some(place)) => place.format(),
            Ok(None) => None,
            Err(ClientError::PermissionDenied) => {
                tracing::warn!("Location permission denied, showing coordinates");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, lat, long, "Reverse geocoding failed");
                None
            }
        }
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(lat, long, "Discarding superseded address lookup");
            return state.address.clone();
        }
        state.address = address;
        state.address.clone()
    }

    /// Resolved address, or the raw coordinates when there is none.
    pub async fn display_text(&self, lat: Option<f64>, long: Option<f64>) -> String {
        let address = self.resolve(lat, long).await;
        if address == NOT_AVAILABLE {
            format_coordinates(lat, long)
        } else {
            address
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Last resolved address without triggering a lookup.
    pub fn cached(&self) -> String {
        self.lock().address.clone()
    }

    /// Invalidate any in-flight lookup and forget the cached pair.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.last = None;
    }
}

/// "lat, long" with six decimals; absent values print as zero.
pub fn format_coordinates(lat: Option<f64>, long: Option<f64>) -> String {
    format!("{:.6}, {:.6}", lat.unwrap_or(0.0), long.unwrap_or(0.0))
}
