use std::{fs::File, io::BufReader, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use atk_mo1218::DeviceConfig;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serialport::{FlowControl, SerialPort};

/// Settings accepted by the `query` subcommand
pub const QUERY_SETTINGS: [&str; 18] = [
    "version",
    "crc",
    "boot-status",
    "position-rate",
    "power-mode",
    "datum",
    "dop-mask",
    "elevation-cnr-mask",
    "position-pinning",
    "cable-delay",
    "sbas",
    "qzss",
    "saee",
    "extended-nmea-intervals",
    "interference",
    "navigation-mode",
    "gnss",
    "pps-pulse-width",
];

fn timeout_arg() -> Arg {
    Arg::new("timeout-ticks")
        .long("timeout-ticks")
        .value_parser(value_parser!(u32))
        .default_value("2000")
        .help("Polls spent waiting for a complete fix")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of text")
}

fn satellites_arg() -> Arg {
    Arg::new("satellites")
        .long("satellites")
        .action(ArgAction::SetTrue)
        .help("Also collect GPS and BeiDou satellites in view")
}

pub fn build() -> Command {
    Command::new("atk-mo1218")
        .about("Configures and monitors an ATK-MO1218 GNSS receiver")
        .version(clap::crate_version!())
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("port")
                .value_name("port")
                .short('p')
                .long("port")
                .global(true)
                .help("Serial port the receiver is attached to"),
        )
        .arg(
            Arg::new("baud")
                .value_name("baud")
                .short('s')
                .long("baud")
                .global(true)
                .default_value("38400")
                .value_parser(value_parser!(u32))
                .help("Baud rate of the port"),
        )
        .arg(
            Arg::new("config")
                .value_name("file")
                .short('c')
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file overriding the driver timing"),
        )
        .subcommand(Command::new("info").about("Print firmware version, CRC and boot status"))
        .subcommand(
            Command::new("setup").about(
                "Factory reset, then enable NMEA output of GGA/GSA/GSV/GLL/RMC/VTG at 1 Hz using GPS and BeiDou",
            ),
        )
        .subcommand(
            Command::new("monitor")
                .about("Print fixes as they arrive")
                .arg(satellites_arg())
                .arg(json_arg())
                .arg(timeout_arg())
                .arg(
                    Arg::new("cycles")
                        .long("cycles")
                        .value_parser(value_parser!(u32))
                        .help("Stop after this many fixes"),
                ),
        )
        .subcommand(
            Command::new("query").about("Read one setting back as JSON").arg(
                Arg::new("setting")
                    .required(true)
                    .value_parser(QUERY_SETTINGS),
            ),
        )
        .subcommand(
            Command::new("replay")
                .about("Run one update cycle over a file of captured NMEA output")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(satellites_arg())
                .arg(json_arg()),
        )
}

/// Driver timing, from `--config` when given
pub fn device_config(matches: &ArgMatches) -> Result<DeviceConfig> {
    let Some(path) = matches.get_one::<PathBuf>("config") else {
        return Ok(DeviceConfig::default());
    };
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

pub fn serialport(matches: &ArgMatches) -> Result<Box<dyn SerialPort>> {
    let port = matches
        .get_one::<String>("port")
        .context("--port is required to talk to a receiver")?;
    let baud = matches.get_one::<u32>("baud").copied().unwrap_or(38400);

    serialport::new(port, baud)
        .timeout(Duration::from_millis(10))
        .flow_control(FlowControl::None)
        .open()
        .with_context(|| format!("Failed to open port: {}", port))
}
