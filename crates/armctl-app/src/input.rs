//! Input mapping: D-pad, joystick and buttons to per-servo instructions.
//!
//! Mapping is pure. The caller applies the resulting instructions to the
//! current positions through the angle model and decides what to dispatch.
//!
//! | Input              | Servo     | Effect                         |
//! |--------------------|-----------|--------------------------------|
//! | D-pad left/right   | base      | `-step` / `+step`              |
//! | D-pad up/down      | shoulder  | `+step` / `-step`              |
//! | Joystick x         | elbow     | `x * joystick_step`            |
//! | Joystick y         | gripper   | `y * joystick_step`            |
//! | Reset              | all       | 90°                            |
//! | Gripper open/close | gripper   | 180° / 0°                      |

use armctl_core::{Angle, Direction, JoystickVector, ServoId, ServoPositions};

use crate::config::ControlSettings;

/// Input that can move the arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArmInput {
    Press(Direction),
    Joystick(JoystickVector),
    Reset,
    GripperOpen,
    GripperClose,
}

impl ArmInput {
    pub fn label(&self) -> &'static str {
        match self {
            ArmInput::Press(_) => "direction",
            ArmInput::Joystick(_) => "joystick",
            ArmInput::Reset => "reset",
            ArmInput::GripperOpen => "gripper open",
            ArmInput::GripperClose => "gripper close",
        }
    }
}

/// Change requested for one servo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServoInstruction {
    Delta { servo: ServoId, degrees: f64 },
    Absolute { servo: ServoId, angle: Angle },
}

impl ServoInstruction {
    pub fn servo(&self) -> ServoId {
        match self {
            ServoInstruction::Delta { servo, .. } | ServoInstruction::Absolute { servo, .. } => {
                *servo
            }
        }
    }

    /// Resolve against the current angle.
    pub fn target(&self, current: Angle) -> Angle {
        match self {
            ServoInstruction::Delta { degrees, .. } => current.apply_delta(*degrees),
            ServoInstruction::Absolute { angle, .. } => *angle,
        }
    }
}

/// Input was rejected because the arm is powered off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocked;

#[derive(Debug, Clone, PartialEq)]
pub struct InputMapper {
    dpad_step: f64,
    joystick_step: f64,
    dead_zone: f64,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::from_settings(&ControlSettings::default())
    }
}

impl InputMapper {
    pub fn from_settings(settings: &ControlSettings) -> Self {
        Self {
            dpad_step: f64::from(settings.dpad_step),
            joystick_step: if settings.joystick_step.is_finite() {
                settings.joystick_step
            } else {
                0.0
            },
            dead_zone: settings.joystick_dead_zone.abs().min(1.0),
        }
    }

    /// Map `input` to instructions. Every input is blocked while power is off.
    pub fn map(&self, power: bool, input: ArmInput) -> Result<Vec<ServoInstruction>, Blocked> {
        if !power {
            return Err(Blocked);
        }
        Ok(match input {
            ArmInput::Press(direction) => vec![self.direction(direction)],
            ArmInput::Joystick(vector) => self.joystick(vector),
            ArmInput::Reset => ServoId::ALL
                .into_iter()
                .map(|servo| ServoInstruction::Absolute {
                    servo,
                    angle: Angle::NEUTRAL,
                })
                .collect(),
            ArmInput::GripperOpen => vec![ServoInstruction::Absolute {
                servo: ServoId::Gripper,
                angle: Angle::MAX,
            }],
            ArmInput::GripperClose => vec![ServoInstruction::Absolute {
                servo: ServoId::Gripper,
                angle: Angle::MIN,
            }],
        })
    }

    fn direction(&self, direction: Direction) -> ServoInstruction {
        let (servo, sign) = match direction {
            Direction::Left => (ServoId::Base, -1.0),
            Direction::Right => (ServoId::Base, 1.0),
            Direction::Up => (ServoId::Shoulder, 1.0),
            Direction::Down => (ServoId::Shoulder, -1.0),
        };
        ServoInstruction::Delta {
            servo,
            degrees: sign * self.dpad_step,
        }
    }

    fn joystick(&self, vector: JoystickVector) -> Vec<ServoInstruction> {
        [(ServoId::Elbow, vector.x), (ServoId::Gripper, vector.y)]
            .into_iter()
            .filter_map(|(servo, axis)| {
                let degrees = self.axis_delta(axis);
                (degrees != 0.0).then_some(ServoInstruction::Delta { servo, degrees })
            })
            .collect()
    }

    /// Delta for one joystick axis; zero inside the dead-zone.
    pub fn axis_delta(&self, axis: f64) -> f64 {
        if !axis.is_finite() || axis.abs() <= self.dead_zone {
            0.0
        } else {
            axis.clamp(-1.0, 1.0) * self.joystick_step
        }
    }
}

/// Apply instructions to `positions`, returning the servos whose angle was
/// set (in instruction order), with their new angles.
pub fn apply_instructions(
    positions: &mut ServoPositions,
    instructions: &[ServoInstruction],
) -> Vec<(ServoId, Angle)> {
    instructions
        .iter()
        .map(|instruction| {
            let servo = instruction.servo();
            let target = instruction.target(positions.get(servo));
            positions.set(servo, target);
            (servo, target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> InputMapper {
        InputMapper::default()
    }

    #[test]
    fn test_all_inputs_blocked_when_powered_off() {
        let inputs = [
            ArmInput::Press(Direction::Left),
            ArmInput::Joystick(JoystickVector::new(1.0, 1.0)),
            ArmInput::Reset,
            ArmInput::GripperOpen,
            ArmInput::GripperClose,
        ];
        for input in inputs {
            assert_eq!(mapper().map(false, input), Err(Blocked), "{}", input.label());
        }
    }

    #[test]
    fn test_direction_mapping() {
        let m = mapper();
        assert_eq!(
            m.map(true, ArmInput::Press(Direction::Left)).unwrap(),
            vec![ServoInstruction::Delta { servo: ServoId::Base, degrees: -5.0 }]
        );
        assert_eq!(
            m.map(true, ArmInput::Press(Direction::Right)).unwrap(),
            vec![ServoInstruction::Delta { servo: ServoId::Base, degrees: 5.0 }]
        );
        assert_eq!(
            m.map(true, ArmInput::Press(Direction::Up)).unwrap(),
            vec![ServoInstruction::Delta { servo: ServoId::Shoulder, degrees: 5.0 }]
        );
        assert_eq!(
            m.map(true, ArmInput::Press(Direction::Down)).unwrap(),
            vec![ServoInstruction::Delta { servo: ServoId::Shoulder, degrees: -5.0 }]
        );
    }

    #[test]
    fn test_dead_zone() {
        let m = mapper();
        for v in [0.0, 0.05, 0.1, -0.1, -0.05] {
            assert_eq!(m.axis_delta(v), 0.0, "axis {}", v);
        }
        assert_eq!(m.axis_delta(0.5), 1.0);
        assert_eq!(m.axis_delta(-1.0), -2.0);
        assert_eq!(m.axis_delta(f64::NAN), 0.0);
    }

    #[test]
    fn test_joystick_axes_are_independent() {
        let m = mapper();
        let only_x = m.map(true, ArmInput::Joystick(JoystickVector::new(0.5, 0.05))).unwrap();
        assert_eq!(
            only_x,
            vec![ServoInstruction::Delta { servo: ServoId::Elbow, degrees: 1.0 }]
        );

        let both = m.map(true, ArmInput::Joystick(JoystickVector::new(-1.0, 1.0))).unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(both[1].servo(), ServoId::Gripper);

        let centered = m.map(true, ArmInput::Joystick(JoystickVector::CENTER)).unwrap();
        assert!(centered.is_empty());
    }

    #[test]
    fn test_nineteen_left_presses_floor_at_zero() {
        let m = mapper();
        let mut positions = ServoPositions::neutral();
        for _ in 0..19 {
            let instructions = m.map(true, ArmInput::Press(Direction::Left)).unwrap();
            apply_instructions(&mut positions, &instructions);
        }
        assert_eq!(positions.base, Angle::MIN);
        assert_eq!(positions.shoulder, Angle::NEUTRAL);
    }

    #[test]
    fn test_single_left_press_decreases_by_five() {
        let mut positions = ServoPositions::neutral();
        let instructions = mapper().map(true, ArmInput::Press(Direction::Left)).unwrap();
        let changed = apply_instructions(&mut positions, &instructions);
        assert_eq!(changed, vec![(ServoId::Base, Angle::from_degrees(85))]);
    }

    #[test]
    fn test_discrete_actions() {
        let m = mapper();
        let mut positions = ServoPositions::neutral();
        positions.set(ServoId::Base, Angle::from_degrees(10));

        let open = m.map(true, ArmInput::GripperOpen).unwrap();
        apply_instructions(&mut positions, &open);
        assert_eq!(positions.gripper, Angle::MAX);

        let close = m.map(true, ArmInput::GripperClose).unwrap();
        apply_instructions(&mut positions, &close);
        assert_eq!(positions.gripper, Angle::MIN);

        let reset = m.map(true, ArmInput::Reset).unwrap();
        let changed = apply_instructions(&mut positions, &reset);
        assert_eq!(positions, ServoPositions::neutral());
        assert_eq!(changed.len(), 4);
    }

    #[test]
    fn test_custom_steps() {
        let m = InputMapper::from_settings(&ControlSettings {
            dpad_step: 10,
            joystick_step: 4.0,
            joystick_dead_zone: 0.25,
        });
        assert_eq!(m.axis_delta(0.2), 0.0);
        assert_eq!(m.axis_delta(0.5), 2.0);
        assert_eq!(
            m.map(true, ArmInput::Press(Direction::Down)).unwrap(),
            vec![ServoInstruction::Delta { servo: ServoId::Shoulder, degrees: -10.0 }]
        );
    }
}
