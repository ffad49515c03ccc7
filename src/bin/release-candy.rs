use std::io;
use std::time::Duration;

use anyhow::{bail, Context};
use candy_dispenser::{
    open_spi, release_candy, Arduino, DispenseConfig, FormatOut, Link, MasterConfig,
    SerialLink, SerialMaster, SpiBridge, SpiConfig,
};
use clap::Parser;
use log::LevelFilter;
use rppal::hal::Delay;
use rppal::spi::{Bus, SlaveSelect};

/// Turn the dispenser's release forward and back once.
#[derive(Parser, Debug)]
#[command(name = "release-candy", version, about = "Candy dispenser - release one round")]
struct Args {
    /// Bus address of the dispenser's Arduino
    #[arg(long, default_value_t = 17)]
    address: u8,

    /// Serial baud rate between the bridge and the Arduino
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Stepper motor number
    #[arg(long, default_value_t = 1)]
    motor: u8,

    /// Steps per move
    #[arg(long, default_value_t = 200)]
    steps: u16,

    /// Pause between the forward and reverse moves
    #[arg(long, value_name = "MS", default_value_t = 3_000)]
    pause_ms: u64,

    /// Give up on a reply after this long (default: wait for the move to finish)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// How replies are decoded before printing
    #[arg(long, value_enum, default_value_t = FormatOut::String)]
    format: FormatOut,

    #[arg(long, default_value_t = 0)]
    spi_bus: u8,

    #[arg(long, default_value_t = 0)]
    chip_select: u8,

    /// SPI clock in Hz
    #[arg(long, default_value_t = 500_000)]
    spi_clock: u32,

    /// Talk to an Arduino on this serial port instead of through the SPI bridge
    #[arg(long, value_name = "PATH")]
    serial: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity_level: u8,
}

fn spi_bus(n: u8) -> anyhow::Result<Bus> {
    Ok(match n {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        other => bail!("no SPI bus {other}"),
    })
}

fn slave_select(n: u8) -> anyhow::Result<SlaveSelect> {
    Ok(match n {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        3 => SlaveSelect::Ss3,
        other => bail!("no chip select {other}"),
    })
}

fn run<L: Link>(link: L, args: &Args) -> anyhow::Result<()> {
    let master_config = MasterConfig::builder()
        .baud(args.baud)
        .maybe_response_timeout(args.timeout_ms.map(Duration::from_millis))
        .build();
    let master = SerialMaster::with_config(link, master_config)?;
    let mut arduino = Arduino::new(master, args.address);

    let config = DispenseConfig::builder()
        .motor(args.motor)
        .steps(args.steps)
        .pause(Duration::from_millis(args.pause_ms))
        .format(args.format)
        .build();
    release_candy(&mut arduino, &config, Delay::new(), io::stdout().lock())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbosity_level {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Some(path) = &args.serial {
        let link = SerialLink::open(path, args.baud)
            .with_context(|| format!("failed to open serial port {path}"))?;
        return run(link, &args);
    }

    let spi_config = SpiConfig::builder()
        .bus(spi_bus(args.spi_bus)?)
        .slave_select(slave_select(args.chip_select)?)
        .clock_speed(args.spi_clock)
        .build();
    let spi = open_spi(&spi_config).context("failed to open the SPI bus")?;
    run(SpiBridge::new(spi), &args)
}
