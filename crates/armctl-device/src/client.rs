//! HTTP client for the servo controller.
//!
//! [`DeviceClient`] issues the two requests the firmware understands against a
//! base URL chosen from the connection mode. Every request carries its own
//! deadline; on expiry the in-flight request future is dropped (aborting the
//! connection) and the failure is reported as
//! [`DeviceError::ConnectivityTimeout`], distinct from HTTP errors.

use std::time::Duration;

use url::Url;

use armctl_core::prelude::*;
use armctl_core::{Angle, ConnectionMode, ServoId};

use crate::protocol::{parse_status, set_servo_query, DeviceStatus, SET_SERVO_PATH, STATUS_PATH};

// ---------------------------------------------------------------------------
// Base URL selection
// ---------------------------------------------------------------------------

/// Resolve the base URL for a connection mode.
///
/// `wifi` uses the user-editable `address` (bare host, `host:port`, or a full
/// `http://` URL). `localhost` uses the fixed test endpoint.
pub fn base_url_for(mode: ConnectionMode, address: &str, localhost_url: &str) -> Result<Url> {
    let raw = match mode {
        ConnectionMode::Wifi => address.trim(),
        ConnectionMode::Localhost => localhost_url.trim(),
    };

    if raw.is_empty() {
        return Err(Error::invalid_address(raw, "address is empty"));
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let mut url =
        Url::parse(&with_scheme).map_err(|e| Error::invalid_address(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_address(raw, "only http and https are supported"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid_address(raw, "missing host"));
    }

    // Relative joins replace the last path segment unless the path ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

// ---------------------------------------------------------------------------
// DeviceClient
// ---------------------------------------------------------------------------

/// Cheap-to-clone handle for talking to one device base URL.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("armctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http_client(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Reuse an existing connection pool against a different base URL.
    pub fn with_base_url(&self, base_url: Url) -> Self {
        Self {
            http: self.http.clone(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, DeviceError> {
        self.base_url
            .join(path)
            .map_err(|e| DeviceError::refused(format!("invalid request URL: {}", e)))
    }

    /// `GET /status` with a hard deadline.
    ///
    /// A non-200 answer is a [`DeviceError::ConnectivityRefused`] carrying the
    /// status code. A 200 whose body lacks the angle fields is still `Ok`, with
    /// `positions: None`.
    pub async fn get_status(&self, timeout: Duration) -> std::result::Result<DeviceStatus, DeviceError> {
        let url = self.endpoint(STATUS_PATH)?;
        trace!("GET {}", url);

        let request = async {
            let response = self.http.get(url.clone()).send().await.map_err(transport_error)?;
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                return Err(DeviceError::bad_status(status.as_u16()));
            }
            response.text().await.map_err(transport_error)
        };

        let body = match tokio::time::timeout(timeout, request).await {
            Ok(result) => result?,
            Err(_) => {
                debug!("GET {} timed out after {:?}", url, timeout);
                return Err(DeviceError::timeout(timeout));
            }
        };

        let status = parse_status(&body);
        if let Some(reason) = &status.malformed {
            debug!("Status payload without usable angles: {}", reason);
        }
        Ok(status)
    }

    /// `GET /setServo?servo=N&angle=A` with a hard deadline.
    ///
    /// No retry. Any non-2xx answer becomes [`DeviceError::CommandRejected`]
    /// with the device's plain-text reason.
    pub async fn set_servo_angle(
        &self,
        servo: ServoId,
        angle: Angle,
        timeout: Duration,
    ) -> std::result::Result<(), DeviceError> {
        let mut url = self.endpoint(SET_SERVO_PATH)?;
        url.query_pairs_mut().extend_pairs(set_servo_query(servo, angle));
        trace!("GET {}", url);

        let request = async {
            let response = self.http.get(url.clone()).send().await.map_err(transport_error)?;
            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let reason = response.text().await.unwrap_or_default();
            Err(DeviceError::rejected(status.as_u16(), reason.trim()))
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                debug!("GET {} timed out after {:?}", url, timeout);
                Err(DeviceError::timeout(timeout))
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> DeviceError {
    if err.is_connect() {
        DeviceError::refused(format!("cannot reach device: {}", err.without_url()))
    } else {
        DeviceError::refused(err.without_url().to_string())
    }
}
