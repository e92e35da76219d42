use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use atk_mo1218::{
    nmea::SatellitesInView, Delay, Device, FactoryReset, FixSnapshot, GnssSelection,
    MemoryTransport, NmeaIntervals, NoDelay, OutputType, PositionRate, SaveTarget,
    SerialTransport, StdDelay, Transport, UpdateRequest,
};
use clap::ArgMatches;
use log::{info, warn};
use serde_json::{json, Value};

mod cli;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = cli::build().get_matches();
    let config = cli::device_config(&matches)?;

    if let Some(("replay", sub)) = matches.subcommand() {
        return replay(sub);
    }

    let port = cli::serialport(&matches)?;
    let mut device = Device::with_config(SerialTransport::new(port), StdDelay, config);

    match matches.subcommand() {
        Some(("info", _)) => print_info(&mut device),
        Some(("setup", _)) => setup(&mut device),
        Some(("monitor", sub)) => monitor(&mut device, sub),
        Some(("query", sub)) => {
            let setting = sub
                .get_one::<String>("setting")
                .context("missing setting")?;
            println!("{:#}", query(&mut device, setting)?);
            Ok(())
        },
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn print_info<T: Transport, D: Delay>(device: &mut Device<T, D>) -> Result<()> {
    let version = device.init().context("Receiver does not answer")?;
    let crc = device.software_crc()?;
    let boot = device.boot_status()?;
    println!("Firmware: {}", version);
    println!("CRC:      {:#06x}", crc.crc);
    println!("Boot:     {:?} ({:?} flash)", boot.source, boot.flash_type);
    Ok(())
}

fn setup<T: Transport, D: Delay>(device: &mut Device<T, D>) -> Result<()> {
    device.init().context("Receiver does not answer")?;

    info!("Restoring factory defaults");
    device.factory_reset(FactoryReset::Reboot)?;
    device.configure_output_type(OutputType::Nmea, SaveTarget::Sram)?;
    let intervals = NmeaIntervals {
        gga: 1,
        gsa: 1,
        gsv: 1,
        gll: 1,
        rmc: 1,
        vtg: 1,
        zda: 0,
    };
    device.configure_nmea_intervals(&intervals, SaveTarget::Sram)?;
    device.configure_position_rate(PositionRate::Hz1, SaveTarget::Sram)?;
    device.configure_gnss_for_navigation(GnssSelection::GpsBeidou, SaveTarget::Sram)?;
    info!("Receiver configured");
    Ok(())
}

fn request(matches: &ArgMatches) -> UpdateRequest {
    let mut request = UpdateRequest::UTC
        | UpdateRequest::POSITION
        | UpdateRequest::ALTITUDE
        | UpdateRequest::SPEED
        | UpdateRequest::FIX_INFO;
    if matches.get_flag("satellites") {
        request |= UpdateRequest::GPS_SATELLITES | UpdateRequest::BEIDOU_SATELLITES;
    }
    request
}

fn monitor<T: Transport, D: Delay>(device: &mut Device<T, D>, matches: &ArgMatches) -> Result<()> {
    let request = request(matches);
    let json = matches.get_flag("json");
    let timeout_ticks = matches
        .get_one::<u32>("timeout-ticks")
        .copied()
        .unwrap_or(2000);
    let cycles = matches.get_one::<u32>("cycles").copied();

    let mut done = 0;
    while cycles.is_none_or(|n| done < n) {
        let mut fix = FixSnapshot::default();
        match device.update(request, &mut fix, timeout_ticks) {
            Ok(()) => {
                print_fix(&fix, request, json)?;
                done += 1;
            },
            Err(atk_mo1218::Error::Timeout) => warn!("No complete fix within {} polls", timeout_ticks),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn replay(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("file")
        .context("missing capture file")?;
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut transport = MemoryTransport::new();
    transport.push_frame(&data);
    let mut device = Device::new(transport, NoDelay);

    let request = request(matches);
    let mut fix = FixSnapshot::default();
    if let Err(e) = device.update(request, &mut fix, 1) {
        warn!("Capture is missing sentences ({}), output is partial", e);
    }
    print_fix(&fix, request, matches.get_flag("json"))
}

fn print_fix(fix: &FixSnapshot, request: UpdateRequest, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(fix)?);
        return Ok(());
    }

    match fix.date.and_time(&fix.time) {
        Ok(utc) => println!("UTC:       {}", utc.and_utc().to_rfc3339()),
        Err(e) => println!("UTC:       {}", e),
    }
    println!(
        "Position:  {:.5}, {:.5}",
        fix.latitude.degrees(),
        fix.longitude.degrees()
    );
    println!("Altitude:  {:.1} m", f64::from(fix.altitude) / 10.0);
    println!("Speed:     {:.1} km/h", f64::from(fix.speed) / 10.0);
    println!(
        "Fix:       {:?} {:?}, {} satellites, PDOP {:.1} HDOP {:.1} VDOP {:.1}",
        fix.fix.fix_type,
        fix.fix.quality,
        fix.fix.satellites_used,
        f64::from(fix.fix.pdop) / 10.0,
        f64::from(fix.fix.hdop) / 10.0,
        f64::from(fix.fix.vdop) / 10.0,
    );
    if request.contains(UpdateRequest::GPS_SATELLITES) {
        print_satellites("GPS", &fix.gps_satellites);
    }
    if request.contains(UpdateRequest::BEIDOU_SATELLITES) {
        print_satellites("BeiDou", &fix.beidou_satellites);
    }
    Ok(())
}

fn print_satellites(name: &str, view: &SatellitesInView) {
    println!("{} satellites in view: {}", name, view.count);
    for sat in view.visible() {
        println!(
            "  #{:<3} elevation {:>2}° azimuth {:>3}° SNR {:>2} dB-Hz",
            sat.id, sat.elevation, sat.azimuth, sat.snr
        );
    }
}

fn query<T: Transport, D: Delay>(device: &mut Device<T, D>, setting: &str) -> Result<Value> {
    let value = match setting {
        "version" => json!(device.software_version()?),
        "crc" => json!(device.software_crc()?),
        "boot-status" => json!(device.boot_status()?),
        "position-rate" => json!(device.position_rate()?),
        "power-mode" => json!(device.power_mode()?),
        "datum" => json!({ "datum_index": device.datum()? }),
        "dop-mask" => json!(device.dop_mask()?),
        "elevation-cnr-mask" => json!(device.elevation_cnr_mask()?),
        "position-pinning" => json!(device.position_pinning()?),
        "cable-delay" => json!({ "cable_delay": device.cable_delay()? }),
        "sbas" => json!(device.sbas_status()?),
        "qzss" => json!(device.qzss_status()?),
        "saee" => json!(device.saee()?),
        "extended-nmea-intervals" => json!(device.extended_nmea_intervals()?),
        "interference" => json!(device.interference_detection()?),
        "navigation-mode" => json!(device.navigation_mode()?),
        "gnss" => json!(device.gnss_for_navigation()?),
        "pps-pulse-width" => json!({ "pulse_width_us": device.pps_pulse_width()? }),
        other => anyhow::bail!("unknown setting {}", other),
    };
    Ok(value)
}
