//! Line commands accepted on stdin in headless mode

use armctl_app::Message;
use armctl_core::{ConnectionMode, Direction, JoystickVector};

/// A parsed stdin line.
#[derive(Debug, Clone)]
pub enum Command {
    /// Forwarded to the engine
    Engine(Message),
    /// Print a state snapshot
    Status,
}

/// Parse one stdin line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let message = match (verb, args.as_slice()) {
        ("connect", []) => Message::Connect,
        ("connect", ["wifi"]) => Message::ConnectTo {
            mode: ConnectionMode::Wifi,
            address: None,
        },
        ("connect", ["wifi", address]) => Message::ConnectTo {
            mode: ConnectionMode::Wifi,
            address: Some(address.to_string()),
        },
        ("connect", ["localhost"]) => Message::ConnectTo {
            mode: ConnectionMode::Localhost,
            address: None,
        },
        ("connect", _) => return Err("usage: connect [wifi <addr>|localhost]".into()),
        ("disconnect", []) => Message::Disconnect,
        ("mode", []) => Message::ToggleMode,
        ("address", [address]) => Message::SetAddress(address.to_string()),
        ("power", []) => Message::TogglePower,
        ("press", [dir]) => Message::DirectionPressed(parse_direction(dir)?),
        ("release", [dir]) => Message::DirectionReleased(parse_direction(dir)?),
        ("joystick", [x, y]) => Message::JoystickMoved(JoystickVector::new(
            parse_axis(x)?,
            parse_axis(y)?,
        )),
        ("joystick", _) => return Err("usage: joystick <x> <y>".into()),
        ("release-joystick", []) => Message::JoystickReleased,
        ("open", []) => Message::GripperOpen,
        ("close", []) => Message::GripperClose,
        ("reset", []) => Message::Reset,
        ("status", []) => return Ok(Some(Command::Status)),
        ("q" | "quit", []) => Message::Quit,
        _ => return Err(format!("unknown command: {}", line.trim())),
    };

    Ok(Some(Command::Engine(message)))
}

fn parse_direction(word: &str) -> Result<Direction, String> {
    Direction::parse(word)
        .ok_or_else(|| format!("invalid direction '{}': use up|down|left|right", word))
}

fn parse_axis(word: &str) -> Result<f64, String> {
    word.parse::<f64>()
        .map_err(|_| format!("invalid joystick axis '{}'", word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(line: &str) -> Message {
        match parse_command(line) {
            Ok(Some(Command::Engine(message))) => message,
            other => panic!("expected engine message for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert!(matches!(parse_command(""), Ok(None)));
        assert!(matches!(parse_command("   "), Ok(None)));
    }

    #[test]
    fn test_connect_variants() {
        assert!(matches!(message("connect"), Message::Connect));
        assert!(matches!(
            message("connect localhost"),
            Message::ConnectTo {
                mode: ConnectionMode::Localhost,
                address: None
            }
        ));
        match message("connect wifi 10.0.0.5") {
            Message::ConnectTo {
                mode: ConnectionMode::Wifi,
                address: Some(address),
            } => assert_eq!(address, "10.0.0.5"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_command("connect bluetooth").is_err());
    }

    #[test]
    fn test_arm_commands() {
        assert!(matches!(message("power"), Message::TogglePower));
        assert!(matches!(
            message("press left"),
            Message::DirectionPressed(Direction::Left)
        ));
        assert!(matches!(
            message("release UP"),
            Message::DirectionReleased(Direction::Up)
        ));
        assert!(matches!(message("open"), Message::GripperOpen));
        assert!(matches!(message("close"), Message::GripperClose));
        assert!(matches!(message("reset"), Message::Reset));
        assert!(matches!(message("release-joystick"), Message::JoystickReleased));
    }

    #[test]
    fn test_joystick_axes_are_clamped() {
        match message("joystick 0.5 -3") {
            Message::JoystickMoved(v) => {
                assert_eq!(v.x, 0.5);
                assert_eq!(v.y, -1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_command("joystick left 1").is_err());
        assert!(parse_command("joystick 1").is_err());
    }

    #[test]
    fn test_status_and_quit() {
        assert!(matches!(parse_command("status"), Ok(Some(Command::Status))));
        assert!(matches!(message("quit"), Message::Quit));
        assert!(matches!(message("q"), Message::Quit));
    }

    #[test]
    fn test_unknown_commands_rejected() {
        let err = parse_command("fly away").unwrap_err();
        assert_eq!(err, "unknown command: fly away");
        assert!(parse_command("press sideways").is_err());
        assert!(parse_command("power on").is_err());
    }
}
