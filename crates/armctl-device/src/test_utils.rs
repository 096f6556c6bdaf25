//! In-process mock of the servo controller firmware.
//!
//! [`MockDevice`] binds an ephemeral localhost port and serves the two
//! firmware endpoints through an `axum` router:
//!
//! - `GET /status` returns the four stored angles as `a1..a4`
//! - `GET /setServo?servo=N&angle=A` validates, clamps and stores the angle
//!
//! Latency and failure modes can be injected at any time, which lets tests
//! exercise timeouts, rejected commands and malformed payloads without real
//! hardware. The server task is aborted when the `MockDevice` is dropped.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type SharedState = Arc<Mutex<MockState>>;

/// A `setServo` request as received by the mock, after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCall {
    pub servo: u8,
    pub angle: i64,
}

#[derive(Debug)]
struct MockState {
    /// Index 0 unused, channels 1..=4.
    angles: [i64; 5],
    calls: Vec<ServoCall>,
    status_requests: usize,
    status_delay: Duration,
    status_code: u16,
    status_body: Option<String>,
    servo_delay: Duration,
    servo_delays: VecDeque<Duration>,
    servo_rejection: Option<(u16, String)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            angles: [0, 90, 90, 90, 90],
            calls: Vec::new(),
            status_requests: 0,
            status_delay: Duration::ZERO,
            status_code: 200,
            status_body: None,
            servo_delay: Duration::ZERO,
            servo_delays: VecDeque::new(),
            servo_rejection: None,
        }
    }
}

/// Mock servo controller listening on `127.0.0.1:<ephemeral>`.
#[derive(Debug)]
pub struct MockDevice {
    addr: SocketAddr,
    state: SharedState,
    task: JoinHandle<()>,
}

impl MockDevice {
    /// Bind and start serving. Must be called inside a tokio runtime.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route("/", get(|| async { "Mock servo controller" }))
            .route("/status", get(status))
            .route("/setServo", get(set_servo))
            .with_state(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::debug!("mock device server stopped: {}", e);
            }
        });

        Ok(Self { addr, state, task })
    }

    /// `host:port`, suitable as a wifi-mode address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// `http://host:port`, suitable as the localhost endpoint.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Overwrite the stored angles, as if moved from the device side.
    pub fn set_angles(&self, angles: [i64; 4]) {
        self.with_state(|s| s.angles[1..].copy_from_slice(&angles));
    }

    /// Stored angles for channels 1..=4.
    pub fn angles(&self) -> [i64; 4] {
        self.with_state(|s| [s.angles[1], s.angles[2], s.angles[3], s.angles[4]])
    }

    /// Every accepted `setServo` call, in arrival order.
    pub fn servo_calls(&self) -> Vec<ServoCall> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn clear_servo_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    pub fn status_requests(&self) -> usize {
        self.with_state(|s| s.status_requests)
    }

    /// Delay before answering `/status`.
    pub fn set_status_delay(&self, delay: Duration) {
        self.with_state(|s| s.status_delay = delay);
    }

    /// HTTP status for `/status`. Non-200 answers carry an empty body.
    pub fn set_status_code(&self, code: u16) {
        self.with_state(|s| s.status_code = code);
    }

    /// Replace the `/status` body verbatim (`None` restores the real payload).
    pub fn set_status_body(&self, body: Option<&str>) {
        self.with_state(|s| s.status_body = body.map(str::to_string));
    }

    /// Default delay before answering `/setServo`.
    pub fn set_servo_delay(&self, delay: Duration) {
        self.with_state(|s| s.servo_delay = delay);
    }

    /// One-shot delay for the next `/setServo` call; queued delays are used
    /// in order before falling back to the default.
    pub fn push_servo_delay(&self, delay: Duration) {
        self.with_state(|s| s.servo_delays.push_back(delay));
    }

    /// Reject every `/setServo` call with the given status and reason.
    pub fn reject_servo_commands(&self, status: u16, reason: &str) {
        self.with_state(|s| s.servo_rejection = Some((status, reason.to_string())));
    }

    pub fn accept_servo_commands(&self) {
        self.with_state(|s| s.servo_rejection = None);
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lock(state: &SharedState) -> std::sync::MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn status(State(state): State<SharedState>) -> Response {
    let (delay, response) = {
        let mut state = lock(&state);
        state.status_requests += 1;
        let response = if state.status_code != 200 {
            status_code(state.status_code).into_response()
        } else {
            let body = match &state.status_body {
                Some(body) => body.clone(),
                None => serde_json::json!({
                    "a1": state.angles[1],
                    "a2": state.angles[2],
                    "a3": state.angles[3],
                    "a4": state.angles[4],
                    "ip": "127.0.0.1",
                    "mode": "local",
                })
                .to_string(),
            };
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        };
        (state.status_delay, response)
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    response
}

async fn set_servo(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let (delay, reply) = {
        let mut state = lock(&state);
        let delay = state.servo_delays.pop_front().unwrap_or(state.servo_delay);
        (delay, apply_set_servo(&params, &mut state))
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    reply
}

/// Validate, clamp and store one `setServo` request.
fn apply_set_servo(params: &HashMap<String, String>, state: &mut MockState) -> (StatusCode, String) {
    let param = |name: &str| params.get(name).and_then(|v| parse_int(v));

    let (Some(servo), Some(angle)) = (param("servo"), param("angle")) else {
        return (StatusCode::BAD_REQUEST, "servo and angle required".into());
    };
    if !(1..=4).contains(&servo) {
        return (StatusCode::BAD_REQUEST, "servo out of range".into());
    }
    if let Some((status, reason)) = &state.servo_rejection {
        return (status_code(*status), reason.clone());
    }

    let angle = angle.clamp(0, 180);
    let servo = servo as u8;
    state.angles[servo as usize] = angle;
    state.calls.push(ServoCall { servo, angle });
    tracing::trace!("mock setServo -> servo={} angle={}", servo, angle);
    (StatusCode::OK, "OK".into())
}

/// Leading-integer parse: "45", "45.7" and "45abc" all read as 45.
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse().ok()
}
