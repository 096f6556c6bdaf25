//! Wire protocol of the servo controller
//!
//! ```text
//! GET /status                      -> 200 {"a1":90,"a2":90,"a3":90,"a4":90,"ip":"...","mode":"..."}
//! GET /setServo?servo=N&angle=A    -> 200 "OK" | 400 "<reason>"
//! ```
//!
//! `a1..a4` map to base, shoulder, elbow and gripper.

use serde::Deserialize;

use armctl_core::{Angle, ServoId, ServoPositions};

pub const STATUS_PATH: &str = "status";
pub const SET_SERVO_PATH: &str = "setServo";

/// Raw `/status` body. Every field is optional so that a partial payload
/// can still be recognised as "device reachable".
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawStatus {
    #[serde(default)]
    a1: Option<serde_json::Value>,
    #[serde(default)]
    a2: Option<serde_json::Value>,
    #[serde(default)]
    a3: Option<serde_json::Value>,
    #[serde(default)]
    a4: Option<serde_json::Value>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    mode: Option<String>,
}

/// Decoded `/status` response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceStatus {
    /// Reported angles; `None` when the payload did not carry all four.
    pub positions: Option<ServoPositions>,
    /// Device IP as reported by the firmware.
    pub ip: Option<String>,
    /// Firmware network mode (e.g. "ap", "sta", "local").
    pub mode: Option<String>,
    /// Why the angles were not usable, if they were not.
    pub malformed: Option<String>,
}

impl DeviceStatus {
    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }
}

/// Decode a `/status` body.
///
/// Never fails: a body that is not JSON or lacks angle fields yields a
/// status with `positions: None` and the reason in `malformed`.
pub fn parse_status(body: &str) -> DeviceStatus {
    let raw: RawStatus = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            return DeviceStatus {
                malformed: Some(format!("invalid JSON: {}", e)),
                ..Default::default()
            }
        }
    };

    let fields = [&raw.a1, &raw.a2, &raw.a3, &raw.a4];
    let mut positions = ServoPositions::neutral();
    let mut problem = None;
    for (servo, field) in ServoId::ALL.into_iter().zip(fields) {
        match field.as_ref().and_then(angle_from_json) {
            Some(angle) => positions.set(servo, angle),
            None => {
                problem = Some(format!("missing or non-numeric a{}", servo.channel()));
                break;
            }
        }
    }

    DeviceStatus {
        positions: problem.is_none().then_some(positions),
        ip: raw.ip,
        mode: raw.mode,
        malformed: problem,
    }
}

/// Accepts numbers and numeric strings, clamped through the angle model.
fn angle_from_json(value: &serde_json::Value) -> Option<Angle> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(Angle::clamp(number))
}

/// Query pairs for a `/setServo` request.
pub fn set_servo_query(servo: ServoId, angle: Angle) -> [(&'static str, String); 2] {
    [
        ("servo", servo.channel().to_string()),
        ("angle", angle.degrees().to_string()),
    ]
}
