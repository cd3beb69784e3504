// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake backend for integration tests.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bus_tracker::services::ApiClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const VALID_PASSWORD: &str = "secret123";
pub const VALID_TOKEN: &str = "tok-123";
pub const RESET_TOKEN: &str = "reset-token";
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Canned responses and a request log.
#[derive(Default)]
pub struct BackendState {
    requests: Mutex<Vec<String>>,
    buses: Mutex<Option<(u16, Value)>>,
    stops: Mutex<Option<(u16, Value)>>,
    tracking: Mutex<HashMap<u64, (u16, Value)>>,
    tracking_delay: Mutex<Duration>,
    bus_list_delay: Mutex<Duration>,
    last_register: Mutex<Option<Value>>,
}

impl BackendState {
    fn log(&self, path: String) {
        self.requests.lock().unwrap().push(path);
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    pub fn set_buses(&self, status: u16, body: Value) {
        *self.buses.lock().unwrap() = Some((status, body));
    }

    pub fn set_stops(&self, status: u16, body: Value) {
        *self.stops.lock().unwrap() = Some((status, body));
    }

    pub fn set_tracking(&self, bus_id: u64, status: u16, body: Value) {
        self.tracking.lock().unwrap().insert(bus_id, (status, body));
    }

    pub fn set_tracking_delay(&self, delay: Duration) {
        *self.tracking_delay.lock().unwrap() = delay;
    }

    pub fn set_bus_list_delay(&self, delay: Duration) {
        *self.bus_list_delay.lock().unwrap() = delay;
    }

    pub fn last_register(&self) -> Option<Value> {
        self.last_register.lock().unwrap().clone()
    }
}

pub struct FakeBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

impl FakeBackend {
    /// Client against this backend with the given timeout.
    pub fn client(&self, timeout: Duration) -> ApiClient {
        ApiClient::new(self.base_url.clone(), timeout)
    }
}

/// Start the fake backend on an ephemeral port.
pub async fn spawn_backend() -> FakeBackend {
    let state = Arc::new(BackendState::default());

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/update/forgot-password", post(forgot_password))
        .route("/api/update/reset-password", post(reset_password))
        .route("/api/update/info", post(update_info))
        .route("/api/buses", get(buses))
        .route("/api/stops", get(stops))
        .route("/api/buses/{id}/tracking", get(tracking))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });

    FakeBackend {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// Client for a base URL nothing listens on.
pub fn unreachable_client() -> ApiClient {
    ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2))
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: u16, body: Value) -> Reply {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
}

async fn login(State(s): State<Arc<BackendState>>, Json(body): Json<Value>) -> Reply {
    s.log("/api/auth/login".to_string());
    if body["password"] == VALID_PASSWORD {
        reply(
            200,
            json!({
                "user": {"id": 1, "name": "Ana Cruz", "email": body["email"], "role": "user"},
                "token": VALID_TOKEN
            }),
        )
    } else {
        reply(401, json!({"error": "Invalid credentials"}))
    }
}

async fn register(State(s): State<Arc<BackendState>>, Json(body): Json<Value>) -> Reply {
    s.log("/api/auth/register".to_string());
    *s.last_register.lock().unwrap() = Some(body.clone());
    if body["email"] == TAKEN_EMAIL {
        return reply(422, json!({"message": "The email has already been taken."}));
    }
    reply(
        201,
        json!({
            "user": {"name": body["name"], "email": body["email"], "role": body["role"]},
            "token": VALID_TOKEN
        }),
    )
}

async fn forgot_password(State(s): State<Arc<BackendState>>, Json(body): Json<Value>) -> Reply {
    s.log("/api/update/forgot-password".to_string());
    if body["email"] == "ana@example.com" {
        reply(200, json!({"token": RESET_TOKEN, "message": "Enter new password"}))
    } else {
        reply(404, json!({"error": "Email not found"}))
    }
}

async fn reset_password(State(s): State<Arc<BackendState>>, Json(body): Json<Value>) -> Reply {
    s.log("/api/update/reset-password".to_string());
    if body["token"] == RESET_TOKEN && body["password"] == body["password_confirmation"] {
        reply(200, json!({"message": "Password updated"}))
    } else {
        reply(400, json!({"error": "Invalid or expired token"}))
    }
}

async fn update_info(State(s): State<Arc<BackendState>>, headers: HeaderMap) -> Reply {
    s.log("/api/update/info".to_string());
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", VALID_TOKEN));
    if authorized {
        reply(200, json!({"message": "Profile updated"}))
    } else {
        reply(401, json!({"error": "Unauthenticated."}))
    }
}

async fn buses(State(s): State<Arc<BackendState>>) -> Reply {
    s.log("/api/buses".to_string());
    let delay = *s.bus_list_delay.lock().unwrap();
    tokio::time::sleep(delay).await;
    let canned = s.buses.lock().unwrap().clone();
    match canned {
        Some((status, body)) => reply(status, body),
        None => reply(500, json!({"message": "Server Error"})),
    }
}

async fn stops(State(s): State<Arc<BackendState>>) -> Reply {
    s.log("/api/stops".to_string());
    let canned = s.stops.lock().unwrap().clone();
    match canned {
        Some((status, body)) => reply(status, body),
        None => reply(500, json!({"message": "Server Error"})),
    }
}

async fn tracking(State(s): State<Arc<BackendState>>, Path(id): Path<u64>) -> Reply {
    s.log(format!("/api/buses/{}/tracking", id));
    let delay = *s.tracking_delay.lock().unwrap();
    tokio::time::sleep(delay).await;
    let canned = s.tracking.lock().unwrap().get(&id).cloned();
    match canned {
        Some((status, body)) => reply(status, body),
        None => reply(404, json!({"success": false, "message": "Bus not found"})),
    }
}

/// A live tracking payload with one path sample and a current position.
pub fn tracking_payload(bus_id: u64, lat: f64, long: f64, speed: f64) -> Value {
    json!({
        "success": true,
        "data": {
            "id": bus_id,
            "bus_name": format!("Live Bus {}", bus_id),
            "path_travelled": [{"lat": lat - 0.001, "long": long, "speed": speed}],
            "current_position": {"lat": lat, "long": long, "speed": speed, "passenger_count": 7},
            "updated_at": "2026-03-01T08:15:30Z",
            "is_active": true
        },
        "message": "ok"
    })
}
