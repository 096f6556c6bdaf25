//! Action handlers: UpdateAction dispatch and background task spawning
//!
//! Every device request runs in its own task behind a [`CancelToken`]. A
//! cancelled operation never reports back, so the update loop only sees
//! results it may still care about (and re-checks staleness anyway).

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, trace, warn};

use armctl_device::{run_cancellable, CancelToken, DeviceClient};

use crate::config::save_settings;
use crate::handler::ServoCommand;
use crate::message::Message;
use crate::UpdateAction;

mod poll;

pub use poll::spawn_status_poll;

/// Execute an action by spawning a background task
pub fn handle_action(
    action: UpdateAction,
    msg_tx: mpsc::Sender<Message>,
    shutdown_rx: watch::Receiver<bool>,
) {
    match action {
        UpdateAction::ProbeDevice {
            attempt,
            client,
            cancel,
            timeout,
        } => {
            spawn_probe(attempt, client, cancel, timeout, msg_tx);
        }

        UpdateAction::SendServoCommands {
            client,
            commands,
            timeout,
        } => {
            for command in commands {
                spawn_servo_command(client.clone(), command, timeout, msg_tx.clone());
            }
        }

        UpdateAction::StartStatusPoll {
            session,
            client,
            cancel,
            interval,
            timeout,
        } => {
            spawn_status_poll(session, client, cancel, interval, timeout, msg_tx, shutdown_rx);
        }

        UpdateAction::ReconcileStatus {
            attempt,
            client,
            cancel,
            timeout,
        } => {
            tokio::spawn(async move {
                let outcome = run_cancellable(cancel, client.get_status(timeout)).await;
                if let Some(result) = outcome.into_result() {
                    let _ = msg_tx
                        .send(Message::ReconcileCompleted { attempt, result })
                        .await;
                }
            });
        }

        UpdateAction::SaveSettings { path, settings } => {
            // Blocking file I/O off the runtime threads
            tokio::task::spawn_blocking(move || match save_settings(&path, &settings) {
                Ok(()) => debug!("Settings saved to {}", path.display()),
                Err(e) if e.is_recoverable() => {
                    warn!("Failed to save settings to {}: {}", path.display(), e)
                }
                Err(e) => error!("Failed to save settings to {}: {}", path.display(), e),
            });
        }

        UpdateAction::Batch(actions) => {
            for action in actions {
                handle_action(action, msg_tx.clone(), shutdown_rx.clone());
            }
        }
    }
}

/// Spawn the connectivity probe for one connection attempt.
fn spawn_probe(
    attempt: u64,
    client: DeviceClient,
    cancel: CancelToken,
    timeout: Duration,
    msg_tx: mpsc::Sender<Message>,
) {
    tokio::spawn(async move {
        let op = cancel.id();
        let outcome = run_cancellable(cancel, client.get_status(timeout)).await;
        match outcome.into_result() {
            Some(result) => {
                let _ = msg_tx.send(Message::ProbeCompleted { attempt, result }).await;
            }
            None => debug!("Probe attempt {} cancelled (op {})", attempt, op),
        }
    });
}

/// Spawn one fire-and-forget `setServo` request.
fn spawn_servo_command(
    client: DeviceClient,
    command: ServoCommand,
    timeout: Duration,
    msg_tx: mpsc::Sender<Message>,
) {
    let ServoCommand {
        servo,
        angle,
        token,
        cancel,
    } = command;

    tokio::spawn(async move {
        let outcome = run_cancellable(cancel, client.set_servo_angle(servo, angle, timeout)).await;
        match outcome.into_result() {
            Some(result) => {
                let _ = msg_tx
                    .send(Message::ServoCommandCompleted {
                        servo,
                        token,
                        angle,
                        result,
                    })
                    .await;
            }
            None => trace!("{} -> {} superseded (token {})", servo, angle, token),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use armctl_core::{Angle, ServoId};
    use armctl_device::test_utils::MockDevice;
    use armctl_device::OperationHandle;
    use url::Url;

    fn client_for(device: &MockDevice) -> DeviceClient {
        DeviceClient::new(Url::parse(&device.url()).unwrap()).unwrap()
    }

    async fn recv(rx: &mut mpsc::Receiver<Message>) -> Message {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("message in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_probe_reports_status() {
        let device = MockDevice::start().await.unwrap();
        device.set_angles([10, 20, 30, 40]);
        let (msg_tx, mut msg_rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (_handle, cancel) = OperationHandle::new();

        handle_action(
            UpdateAction::ProbeDevice {
                attempt: 7,
                client: client_for(&device),
                cancel,
                timeout: Duration::from_secs(2),
            },
            msg_tx,
            shutdown_rx,
        );

        match recv(&mut msg_rx).await {
            Message::ProbeCompleted { attempt, result } => {
                assert_eq!(attempt, 7);
                let positions = result.unwrap().positions.unwrap();
                assert_eq!(positions.gripper, Angle::from_degrees(40));
            }
            other => panic!("expected ProbeCompleted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_probe_never_reports() {
        let device = MockDevice::start().await.unwrap();
        device.set_status_delay(Duration::from_millis(300));
        let (msg_tx, mut msg_rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, cancel) = OperationHandle::new();

        handle_action(
            UpdateAction::ProbeDevice {
                attempt: 1,
                client: client_for(&device),
                cancel,
                timeout: Duration::from_secs(2),
            },
            msg_tx,
            shutdown_rx,
        );
        drop(handle);

        let result = tokio::time::timeout(Duration::from_millis(600), msg_rx.recv()).await;
        assert!(
            matches!(result, Ok(None)) || result.is_err(),
            "cancelled probe must not send a message"
        );
    }

    #[tokio::test]
    async fn test_servo_commands_report_per_servo() {
        let device = MockDevice::start().await.unwrap();
        let (msg_tx, mut msg_rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (_base, base_cancel) = OperationHandle::new();
        let (_grip, grip_cancel) = OperationHandle::new();

        handle_action(
            UpdateAction::SendServoCommands {
                client: client_for(&device),
                commands: vec![
                    ServoCommand {
                        servo: ServoId::Base,
                        angle: Angle::from_degrees(45),
                        token: 3,
                        cancel: base_cancel,
                    },
                    ServoCommand {
                        servo: ServoId::Gripper,
                        angle: Angle::MAX,
                        token: 9,
                        cancel: grip_cancel,
                    },
                ],
                timeout: Duration::from_secs(2),
            },
            msg_tx,
            shutdown_rx,
        );

        let mut tokens = Vec::new();
        for _ in 0..2 {
            match recv(&mut msg_rx).await {
                Message::ServoCommandCompleted {
                    servo,
                    token,
                    result,
                    ..
                } => {
                    assert!(result.is_ok());
                    tokens.push((servo, token));
                }
                other => panic!("expected ServoCommandCompleted, got {:?}", other),
            }
        }
        tokens.sort_by_key(|(_, token)| *token);
        assert_eq!(tokens, vec![(ServoId::Base, 3), (ServoId::Gripper, 9)]);
        assert_eq!(device.angles(), [45, 90, 90, 180]);
    }

    #[tokio::test]
    async fn test_rejected_command_carries_reason() {
        let device = MockDevice::start().await.unwrap();
        device.reject_servo_commands(400, "servo out of range");
        let (msg_tx, mut msg_rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (_handle, cancel) = OperationHandle::new();

        handle_action(
            UpdateAction::SendServoCommands {
                client: client_for(&device),
                commands: vec![ServoCommand {
                    servo: ServoId::Elbow,
                    angle: Angle::from_degrees(10),
                    token: 1,
                    cancel,
                }],
                timeout: Duration::from_secs(2),
            },
            msg_tx,
            shutdown_rx,
        );

        match recv(&mut msg_rx).await {
            Message::ServoCommandCompleted { result, .. } => {
                let err = result.unwrap_err();
                assert_eq!(err.status(), Some(400));
                assert!(err.to_string().contains("servo out of range"));
            }
            other => panic!("expected ServoCommandCompleted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_settings_action_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (msg_tx, _msg_rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut settings = crate::config::Settings::default();
        settings.connection.address = "10.1.2.3".into();

        handle_action(
            UpdateAction::SaveSettings {
                path: path.clone(),
                settings: Box::new(settings),
            },
            msg_tx,
            shutdown_rx,
        );

        let mut saved = false;
        for _ in 0..50 {
            if path.exists() {
                saved = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(saved);
        let loaded = crate::config::load_settings(&path);
        assert_eq!(loaded.connection.address, "10.1.2.3");
    }
}
