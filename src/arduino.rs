use embedded_hal::delay::DelayNs;
use log::debug;

use crate::command::{self, Command, Homing, StepperMove};
use crate::{Error, FormatOut, Link, Reply, SerialMaster};

/// An Arduino on the serial bus, reached through a [`SerialMaster`].
pub struct Arduino<L> {
    master: SerialMaster<L>,
    address: u8,
}

impl<L: Link> Arduino<L> {
    pub fn new(master: SerialMaster<L>, address: u8) -> Self {
        Self { master, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn into_master(self) -> SerialMaster<L> {
        self.master
    }

    pub fn send(&mut self, command: Command, format: FormatOut) -> Result<Reply, Error> {
        self.send_raw(command.id(), &command.payload(), format)
    }

    /// Send a command that must be answered and return the raw reply data.
    fn query(&mut self, command: Command) -> Result<Vec<u8>, Error> {
        let data = self
            .master
            .transact(self.address, command.id(), &command.payload(), true)?;
        data.ok_or(Error::EmptyResponse)
    }

    fn send_raw(&mut self, command: u8, payload: &[u8], format: FormatOut) -> Result<Reply, Error> {
        let data = self
            .master
            .transact(self.address, command, payload, format.expects_reply())?;
        match data {
            Some(data) => format.decode(data),
            None => Ok(Reply::None),
        }
    }

    pub fn ping(&mut self) -> Result<Reply, Error> {
        self.send(Command::Ping, FormatOut::String)
    }

    pub fn move_stepper(&mut self, step: StepperMove, format: FormatOut) -> Result<Reply, Error> {
        debug!(
            "Stepper {} {:?} {} steps",
            step.motor, step.direction, step.steps
        );
        self.send(Command::MoveStepper(step), format)
    }

    /// Move a stepper with a pre-built `[motor, direction, steps_lo, steps_hi]`
    /// payload.
    pub fn move_stepper_raw(&mut self, payload: &[u8], format: FormatOut) -> Result<Reply, Error> {
        self.send_raw(command::MOVE_STEPPER, payload, format)
    }

    pub fn set_stepper_speed(
        &mut self,
        motor: u8,
        steps_per_second: u16,
        format: FormatOut,
    ) -> Result<Reply, Error> {
        self.send(
            Command::SetStepperSpeed {
                motor,
                steps_per_second,
            },
            format,
        )
    }

    pub fn set_stepper_acceleration(
        &mut self,
        motor: u8,
        steps_per_second_squared: u16,
        format: FormatOut,
    ) -> Result<Reply, Error> {
        self.send(
            Command::SetStepperAcceleration {
                motor,
                steps_per_second_squared,
            },
            format,
        )
    }

    pub fn enable_stepper(&mut self, motor: u8, format: FormatOut) -> Result<Reply, Error> {
        self.send(Command::EnableStepper { motor }, format)
    }

    pub fn disable_stepper(&mut self, motor: u8, format: FormatOut) -> Result<Reply, Error> {
        self.send(Command::DisableStepper { motor }, format)
    }

    pub fn move_stepper_to(
        &mut self,
        motor: u8,
        position: i32,
        format: FormatOut,
    ) -> Result<Reply, Error> {
        debug!("Stepper {motor} to {position}");
        self.send(Command::MoveStepperTo { motor, position }, format)
    }

    pub fn set_stepper_position(
        &mut self,
        motor: u8,
        position: i32,
        format: FormatOut,
    ) -> Result<Reply, Error> {
        self.send(Command::SetStepperPosition { motor, position }, format)
    }

    /// Current position in steps from the origin.
    pub fn stepper_position(&mut self, motor: u8) -> Result<i32, Error> {
        let data = self.query(Command::GetStepperPosition { motor })?;
        let Ok(bytes) = <[u8; 4]>::try_from(data.as_slice()) else {
            return Err(Error::MalformedResponse("position is not 4 bytes"));
        };
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn home_stepper(&mut self, homing: Homing, format: FormatOut) -> Result<Reply, Error> {
        debug!(
            "Homing stepper {} {:?} on pin {}",
            homing.motor, homing.direction, homing.switch_pin
        );
        self.send(Command::HomeStepper(homing), format)
    }

    pub fn motion_complete(&mut self, motor: u8) -> Result<bool, Error> {
        let data = self.query(Command::MotionComplete { motor })?;
        let done = data.first().ok_or(Error::EmptyResponse)?;
        Ok(*done != 0)
    }

    /// Poll [`Arduino::motion_complete`] every `poll_ms` until the motor stops.
    pub fn wait_until_stopped(
        &mut self,
        motor: u8,
        mut delay: impl DelayNs,
        poll_ms: u32,
    ) -> Result<(), Error> {
        while !self.motion_complete(motor)? {
            delay.delay_ms(poll_ms);
        }
        Ok(())
    }
}
