use std::io::Write;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::info;

use crate::command::{Direction, StepperMove};
use crate::{Arduino, Error, FormatOut, Link, Reply};

#[derive(Debug, Clone, bon::Builder)]
pub struct DispenseConfig {
    #[builder(default = 1)]
    pub motor: u8,
    #[builder(default = 200)]
    pub steps: u16,
    /// Time the release stays open between the two moves.
    #[builder(default = Duration::from_secs(3))]
    pub pause: Duration,
    #[builder(default)]
    pub format: FormatOut,
}

impl Default for DispenseConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Turn the release forward, wait, then turn it back.
///
/// Each decoded reply is written to `out` on its own line as soon as it
/// arrives. Moves sent with [`FormatOut::NoResponse`] print `None`.
pub fn release_candy<L: Link>(
    arduino: &mut Arduino<L>,
    config: &DispenseConfig,
    mut delay: impl DelayNs,
    mut out: impl Write,
) -> Result<[Reply; 2], Error> {
    let forward = StepperMove::builder()
        .motor(config.motor)
        .direction(Direction::Forward)
        .steps(config.steps)
        .build();
    let reverse = StepperMove {
        direction: forward.direction.opposite(),
        ..forward
    };

    info!("Releasing candy on motor {}", config.motor);
    let opened = arduino.move_stepper(forward, config.format)?;
    writeln!(out, "{opened}")?;

    let pause_ms = u32::try_from(config.pause.as_millis()).unwrap_or(u32::MAX);
    delay.delay_ms(pause_ms);

    let closed = arduino.move_stepper(reverse, config.format)?;
    writeln!(out, "{closed}")?;
    info!("Release closed");

    Ok([opened, closed])
}
