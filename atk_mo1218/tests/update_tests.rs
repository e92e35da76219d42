#![cfg(feature = "alloc")]

use atk_mo1218::{
    nmea::{FixQuality, FixType, LatitudeIndicator, SatellitesInView},
    Delay, Device, Error, FixInfo, FixSnapshot, MemoryTransport, UpdateRequest,
};

const GGA: &[u8] =
    b"$GNGGA,092725.000,4717.11399,N,00833.91590,E,1,08,1.0,499.6,M,48.0,M,,*5B\r\n";
const GSA: &[u8] = b"$GNGSA,A,3,05,13,15,18,20,29,,,,,,,1.92,1.05,1.61*1D\r\n";
const RMC: &[u8] =
    b"$GNRMC,123519.000,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,A*6A\r\n";
const GPGSV: &[u8] = b"$GPGSV,2,1,08,01,40,083,46,02,17,308,,12,07,344,39,14,22,228,45*75\r\n\
$GPGSV,2,2,08,15,25,045,,17,60,300,41,19,05,120,,22,33,270,38*70\r\n";
const BDGSV: &[u8] = b"$BDGSV,1,1,02,201,45,120,30,202,30,200,*00\r\n";

#[derive(Default)]
struct CountingDelay {
    ticks: u32,
}

impl Delay for CountingDelay {
    fn delay_ms(&mut self, _ms: u32) {
        self.ticks += 1;
    }
}

fn device(transport: MemoryTransport) -> Device<MemoryTransport, CountingDelay> {
    Device::new(transport, CountingDelay::default())
}

#[test]
fn test_update_over_three_ticks() {
    let mut transport = MemoryTransport::new();
    transport.push_frame(GGA).push_frame(GSA).push_frame(RMC);
    let mut dev = device(transport);

    let request = UpdateRequest::ALTITUDE
        | UpdateRequest::FIX_INFO
        | UpdateRequest::UTC
        | UpdateRequest::POSITION;
    let mut fix = FixSnapshot::default();
    dev.update(request, &mut fix, 10).unwrap();

    let (_, delay) = dev.into_parts();
    // done on the third poll, two waits in between
    assert_eq!(delay.ticks, 2);

    assert_eq!(fix.altitude, 4996);
    assert_eq!(fix.fix.quality, FixQuality::Sps);
    assert_eq!(fix.fix.satellites_used, 8);
    assert_eq!(fix.fix.fix_type, FixType::Fix3D);
    assert_eq!(fix.fix.satellite_ids[..6], [5, 13, 15, 18, 20, 29]);
    assert_eq!((fix.fix.pdop, fix.fix.hdop, fix.fix.vdop), (19, 10, 16));
    assert_eq!(fix.time.hour, 12);
    assert_eq!(fix.date.year, 2094);
    assert_eq!(fix.latitude.degree, 4_811_730);
    assert_eq!(fix.latitude.indicator, LatitudeIndicator::North);
    assert_eq!(fix.longitude.degree, 1_151_666);
    // not requested
    assert_eq!(fix.speed, 0);
    assert_eq!(fix.gps_satellites, SatellitesInView::default());
}

#[test]
fn test_update_times_out_with_missing_sentence() {
    let mut transport = MemoryTransport::new();
    transport.push_frame(GGA).push_frame(GGA).push_frame(GGA);
    let mut dev = device(transport);

    let mut fix = FixSnapshot::default();
    assert_eq!(
        dev.update(UpdateRequest::FIX_INFO, &mut fix, 5),
        Err(Error::Timeout)
    );
    // GGA part of the fix info arrived, the GSA part did not
    assert_eq!(fix.fix.quality, FixQuality::Sps);
    assert_eq!(fix.fix.fix_type, FixType::NotAvailable);
    assert_eq!(fix.fix.pdop, 0);
    assert_eq!(fix.altitude, 0);

    let (_, delay) = dev.into_parts();
    assert_eq!(delay.ticks, 5);
}

#[test]
fn test_update_satellites_in_one_burst() {
    let mut burst = GPGSV.to_vec();
    burst.extend_from_slice(BDGSV);
    let mut transport = MemoryTransport::new();
    transport.push_frame(&burst);
    let mut dev = device(transport);

    let mut fix = FixSnapshot::default();
    dev.update(
        UpdateRequest::GPS_SATELLITES | UpdateRequest::BEIDOU_SATELLITES,
        &mut fix,
        1,
    )
    .unwrap();

    assert_eq!(fix.gps_satellites.count, 8);
    assert_eq!(fix.gps_satellites.visible()[7].id, 22);
    assert_eq!(fix.beidou_satellites.count, 2);
    assert_eq!(fix.beidou_satellites.visible()[1].snr, 0);
    assert_eq!(fix.fix, FixInfo::default());
}

#[test]
fn test_update_ignores_unrequested_sentences() {
    let mut burst = GGA.to_vec();
    burst.extend_from_slice(GSA);
    burst.extend_from_slice(RMC);
    let mut transport = MemoryTransport::new();
    transport.push_frame(&burst);
    let mut dev = device(transport);

    let mut fix = FixSnapshot::default();
    dev.update(UpdateRequest::ALTITUDE, &mut fix, 1).unwrap();
    assert_eq!(fix.altitude, 4996);
    assert_eq!(fix.fix, FixInfo::default());
    assert_eq!(fix.latitude.degree, 0);
}

#[test]
fn test_update_restarts_capture_after_each_burst() {
    let mut transport = MemoryTransport::new();
    transport.push_frame(GGA).push_idle().push_frame(RMC);
    let mut dev = device(transport);

    let mut fix = FixSnapshot::default();
    dev.update(UpdateRequest::UTC | UpdateRequest::ALTITUDE, &mut fix, 10)
        .unwrap();
    // once up front, once after the GGA burst
    assert_eq!(dev.transport().restart_count(), 2);
    assert_eq!(dev.transport().pending(), 0);
}

#[cfg(feature = "serde")]
#[test]
fn test_snapshot_to_json() {
    let mut transport = MemoryTransport::new();
    transport.push_frame(GGA);
    let mut dev = device(transport);

    let mut snapshot = FixSnapshot::default();
    dev.update(UpdateRequest::ALTITUDE, &mut snapshot, 3).unwrap();

    let json = serde_json::to_value(snapshot).unwrap();
    assert_eq!(json["altitude"], 4996);
    assert_eq!(json["fix"]["quality"], "Unavailable");
    assert_eq!(json["latitude"]["indicator"], "North");

    let back: FixSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, snapshot);
}
