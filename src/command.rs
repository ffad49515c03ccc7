//! Stepper commands understood by the dispenser's Arduino firmware.

pub(crate) const PING: u8 = 0x01;
pub(crate) const MOVE_STEPPER: u8 = 0x10;
pub(crate) const SET_STEPPER_SPEED: u8 = 0x11;
pub(crate) const SET_STEPPER_ACCELERATION: u8 = 0x12;
pub(crate) const ENABLE_STEPPER: u8 = 0x13;
pub(crate) const DISABLE_STEPPER: u8 = 0x14;
pub(crate) const MOVE_STEPPER_TO: u8 = 0x15;
pub(crate) const SET_STEPPER_POSITION: u8 = 0x16;
pub(crate) const GET_STEPPER_POSITION: u8 = 0x17;
pub(crate) const HOME_STEPPER: u8 = 0x18;
pub(crate) const MOTION_COMPLETE: u8 = 0x19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Reverse = 0,
    Forward = 1,
}

impl Direction {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Reverse => Direction::Forward,
            Direction::Forward => Direction::Reverse,
        }
    }
}

/// Drive a motor toward its home switch until it trips, moving at most
/// `max_steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bon::Builder)]
pub struct Homing {
    pub motor: u8,
    pub direction: Direction,
    pub steps_per_second: u16,
    pub max_steps: u32,
    /// Arduino pin the home limit switch is wired to.
    pub switch_pin: u8,
}

impl Homing {
    /// `[motor, direction, speed(2), max_steps(4), switch_pin]`, little-endian.
    pub fn to_bytes(&self) -> [u8; 9] {
        let [s0, s1] = self.steps_per_second.to_le_bytes();
        let [m0, m1, m2, m3] = self.max_steps.to_le_bytes();
        [
            self.motor,
            self.direction as u8,
            s0,
            s1,
            m0,
            m1,
            m2,
            m3,
            self.switch_pin,
        ]
    }
}

/// A relative move of `steps` steps on one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bon::Builder)]
pub struct StepperMove {
    pub motor: u8,
    pub direction: Direction,
    pub steps: u16,
}

impl StepperMove {
    /// `[motor, direction, steps_lo, steps_hi]`
    pub fn to_bytes(&self) -> [u8; 4] {
        let [lo, hi] = self.steps.to_le_bytes();
        [self.motor, self.direction as u8, lo, hi]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    MoveStepper(StepperMove),
    SetStepperSpeed { motor: u8, steps_per_second: u16 },
    SetStepperAcceleration { motor: u8, steps_per_second_squared: u16 },
    EnableStepper { motor: u8 },
    DisableStepper { motor: u8 },
    /// Absolute move to `position` steps from the origin.
    MoveStepperTo { motor: u8, position: i32 },
    /// Redefine the current position without moving.
    SetStepperPosition { motor: u8, position: i32 },
    GetStepperPosition { motor: u8 },
    HomeStepper(Homing),
    MotionComplete { motor: u8 },
}

impl Command {
    pub fn id(&self) -> u8 {
        match self {
            Command::Ping => PING,
            Command::MoveStepper(..) => MOVE_STEPPER,
            Command::SetStepperSpeed { .. } => SET_STEPPER_SPEED,
            Command::SetStepperAcceleration { .. } => SET_STEPPER_ACCELERATION,
            Command::EnableStepper { .. } => ENABLE_STEPPER,
            Command::DisableStepper { .. } => DISABLE_STEPPER,
            Command::MoveStepperTo { .. } => MOVE_STEPPER_TO,
            Command::SetStepperPosition { .. } => SET_STEPPER_POSITION,
            Command::GetStepperPosition { .. } => GET_STEPPER_POSITION,
            Command::HomeStepper(..) => HOME_STEPPER,
            Command::MotionComplete { .. } => MOTION_COMPLETE,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        fn motor_and_value(motor: u8, value: u16) -> Vec<u8> {
            let [lo, hi] = value.to_le_bytes();
            vec![motor, lo, hi]
        }

        fn motor_and_position(motor: u8, position: i32) -> Vec<u8> {
            let mut payload = vec![motor];
            payload.extend_from_slice(&position.to_le_bytes());
            payload
        }

        match *self {
            Command::Ping => Vec::new(),
            Command::MoveStepper(step) => step.to_bytes().to_vec(),
            Command::SetStepperSpeed {
                motor,
                steps_per_second,
            } => motor_and_value(motor, steps_per_second),
            Command::SetStepperAcceleration {
                motor,
                steps_per_second_squared,
            } => motor_and_value(motor, steps_per_second_squared),
            Command::MoveStepperTo { motor, position }
            | Command::SetStepperPosition { motor, position } => {
                motor_and_position(motor, position)
            }
            Command::HomeStepper(homing) => homing.to_bytes().to_vec(),
            Command::EnableStepper { motor }
            | Command::DisableStepper { motor }
            | Command::GetStepperPosition { motor }
            | Command::MotionComplete { motor } => vec![motor],
        }
    }
}
