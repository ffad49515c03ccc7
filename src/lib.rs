//! Drive the candy dispenser's stepper motor from a Raspberry Pi.
//!
//! The Pi talks SPI to the motor interface board, which forwards bytes to an
//! Arduino's serial port. [`SerialMaster`] frames requests over any [`Link`]
//! and [`Arduino`] wraps it with the stepper commands the firmware accepts.

mod arduino;
pub mod command;
mod dispense;
mod error;
mod format;
mod frame;
mod link;
mod master;
pub mod mib;
mod serial;

pub use arduino::Arduino;
pub use command::{Command, Direction, Homing, StepperMove};
pub use dispense::{release_candy, DispenseConfig};
pub use error::Error;
pub use format::{FormatOut, Reply};
pub use link::Link;
pub use master::{MasterConfig, SerialMaster};
pub use mib::{open_spi, SpiBridge, SpiConfig};
pub use serial::SerialLink;
