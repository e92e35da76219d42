//! NMEA polling loop aggregating several sentence types into one snapshot

use bitflags::bitflags;
use log::{debug, warn};

use crate::{
    constants::MAX_SATELLITES,
    device::Device,
    error::{Error, Result},
    nmea::{
        self, FixQuality, FixType, Latitude, Longitude, SatellitesInView, SentenceType, UtcDate,
        UtcTime,
    },
    transport::{Delay, Transport},
};

bitflags! {
    /// Outputs wanted from [`Device::update`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UpdateRequest: u8 {
        /// UTC date and time, from RMC
        const UTC = 0x01;
        /// Latitude and longitude, from RMC
        const POSITION = 0x02;
        /// Altitude, from GGA
        const ALTITUDE = 0x04;
        /// Ground speed in km/h, from VTG
        const SPEED = 0x08;
        /// Fix quality and satellites used from GGA, DOP and satellite IDs from GSA
        const FIX_INFO = 0x10;
        const GPS_SATELLITES = 0x20;
        const BEIDOU_SATELLITES = 0x40;
    }
}

bitflags! {
    /// Sentence types still awaited by an update cycle
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Pending: u8 {
        const GGA = 0x01;
        const GSA = 0x02;
        const GP_GSV = 0x04;
        const BD_GSV = 0x08;
        const RMC = 0x10;
        const VTG = 0x20;
    }
}

impl Pending {
    fn for_request(request: UpdateRequest) -> Self {
        let mut pending = Pending::empty();
        pending.set(
            Pending::GGA,
            request.intersects(UpdateRequest::ALTITUDE | UpdateRequest::FIX_INFO),
        );
        pending.set(Pending::GSA, request.contains(UpdateRequest::FIX_INFO));
        pending.set(
            Pending::GP_GSV,
            request.contains(UpdateRequest::GPS_SATELLITES),
        );
        pending.set(
            Pending::BD_GSV,
            request.contains(UpdateRequest::BEIDOU_SATELLITES),
        );
        pending.set(
            Pending::RMC,
            request.intersects(UpdateRequest::UTC | UpdateRequest::POSITION),
        );
        pending.set(Pending::VTG, request.contains(UpdateRequest::SPEED));
        pending
    }
}

/// Fix quality and precision of the current solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixInfo {
    pub quality: FixQuality,
    pub satellites_used: u8,
    pub fix_type: FixType,
    pub satellite_ids: [u16; MAX_SATELLITES],
    /// Dilution of precision values carry one decimal digit
    pub pdop: u16,
    pub hdop: u16,
    pub vdop: u16,
}

/// Everything [`Device::update`] can report.
///
/// Only the parts named by the request are written; the rest keep whatever
/// the caller put there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixSnapshot {
    pub date: UtcDate,
    pub time: UtcTime,
    pub latitude: Latitude,
    pub longitude: Longitude,
    /// Metres above mean sea level, one decimal digit
    pub altitude: i32,
    /// km/h, one decimal digit
    pub speed: u16,
    pub fix: FixInfo,
    pub gps_satellites: SatellitesInView,
    pub beidou_satellites: SatellitesInView,
}

impl<T: Transport, D: Delay> Device<T, D> {
    /// Polls NMEA output until every part of `request` has been refreshed.
    ///
    /// Each poll decodes the awaited sentence types found in the captured
    /// burst; a sentence that is present but does not decode stays awaited.
    /// Waits `update_tick_ms` between polls and gives up with
    /// [`Error::Timeout`] after `timeout_ticks` polls, in which case
    /// `snapshot` may be partly updated.
    pub fn update(
        &mut self,
        request: UpdateRequest,
        snapshot: &mut FixSnapshot,
        timeout_ticks: u32,
    ) -> Result<()> {
        if request.is_empty() {
            return Err(Error::InvalidArgument("no output requested"));
        }

        let mut pending = Pending::for_request(request);
        self.transport.restart_capture();

        let mut remaining = timeout_ticks;
        while remaining > 0 {
            let captured = match self.transport.get_frame() {
                Some(data) => {
                    process_burst(data, request, &mut pending, snapshot);
                    true
                },
                None => false,
            };
            if pending.is_empty() {
                return Ok(());
            }
            if captured {
                self.transport.restart_capture();
            }
            remaining -= 1;
            self.delay.delay_ms(self.config.update_tick_ms);
        }

        warn!("Update timed out, still waiting for {:?}", pending);
        Err(Error::Timeout)
    }
}

/// Decodes `sentence` from `data` if it is present; decode failures are
/// logged and reported as `None`
fn decode_in<R>(
    data: &[u8],
    sentence: SentenceType,
    decode: impl FnOnce(&[u8]) -> Result<R>,
) -> Option<R> {
    let found = nmea::locate(data, sentence, 1)?;
    match decode(found) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!("Skipping {:?}: {}", sentence, e);
            None
        },
    }
}

fn process_burst(
    data: &[u8],
    request: UpdateRequest,
    pending: &mut Pending,
    snapshot: &mut FixSnapshot,
) {
    if pending.contains(Pending::GGA) {
        if let Some(gga) = decode_in(data, SentenceType::GnGga, nmea::decode_gga) {
            if request.contains(UpdateRequest::ALTITUDE) {
                snapshot.altitude = gga.altitude;
            }
            if request.contains(UpdateRequest::FIX_INFO) {
                snapshot.fix.quality = gga.quality;
                snapshot.fix.satellites_used = gga.satellites_used;
            }
            pending.remove(Pending::GGA);
        }
    }

    if pending.contains(Pending::GSA) {
        if let Some(gsa) = decode_in(data, SentenceType::GnGsa, nmea::decode_gsa) {
            snapshot.fix.fix_type = gsa.fix_type;
            snapshot.fix.satellite_ids = gsa.satellite_ids;
            snapshot.fix.pdop = gsa.pdop;
            snapshot.fix.hdop = gsa.hdop;
            snapshot.fix.vdop = gsa.vdop;
            pending.remove(Pending::GSA);
        }
    }

    if pending.contains(Pending::GP_GSV) {
        if let Some(view) = decode_in(data, SentenceType::GpGsv, nmea::decode_gsv) {
            snapshot.gps_satellites = view;
            pending.remove(Pending::GP_GSV);
        }
    }

    if pending.contains(Pending::BD_GSV) {
        if let Some(view) = decode_in(data, SentenceType::BdGsv, nmea::decode_gsv) {
            snapshot.beidou_satellites = view;
            pending.remove(Pending::BD_GSV);
        }
    }

    if pending.contains(Pending::RMC) {
        if let Some(rmc) = decode_in(data, SentenceType::GnRmc, nmea::decode_rmc) {
            if request.contains(UpdateRequest::UTC) {
                snapshot.date = rmc.utc_date;
                snapshot.time = rmc.utc_time;
            }
            if request.contains(UpdateRequest::POSITION) {
                snapshot.latitude = rmc.latitude;
                snapshot.longitude = rmc.longitude;
            }
            pending.remove(Pending::RMC);
        }
    }

    if pending.contains(Pending::VTG) {
        if let Some(vtg) = decode_in(data, SentenceType::GnVtg, nmea::decode_vtg) {
            snapshot.speed = vtg.speed_kph;
            pending.remove(Pending::VTG);
        }
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::{device::tests::TickCounter, transport::MemoryTransport};

    const GGA: &[u8] =
        b"$GNGGA,092725.000,4717.11399,N,00833.91590,E,1,08,1.0,499.6,M,48.0,M,,*5B\r\n";
    const GSA: &[u8] = b"$GNGSA,A,3,05,13,15,18,20,29,,,,,,,1.92,1.05,1.61*1D\r\n";
    const RMC: &[u8] =
        b"$GNRMC,123519.000,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,A*6A\r\n";
    const VTG: &[u8] = b"$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*28\r\n";

    fn device(transport: MemoryTransport) -> Device<MemoryTransport, TickCounter> {
        Device::new(transport, TickCounter::default())
    }

    #[test]
    fn test_pending_for_request() {
        assert_eq!(
            Pending::for_request(UpdateRequest::FIX_INFO),
            Pending::GGA | Pending::GSA
        );
        assert_eq!(
            Pending::for_request(UpdateRequest::UTC | UpdateRequest::POSITION),
            Pending::RMC
        );
        assert_eq!(Pending::for_request(UpdateRequest::all()), Pending::all());
    }

    #[test]
    fn test_update_rejects_empty_request() {
        let mut dev = device(MemoryTransport::new());
        let mut snapshot = FixSnapshot::default();
        assert_eq!(
            dev.update(UpdateRequest::empty(), &mut snapshot, 10),
            Err(Error::InvalidArgument("no output requested"))
        );
        assert_eq!(dev.transport().restart_count(), 0);
    }

    #[test]
    fn test_update_single_burst() {
        let mut burst = GGA.to_vec();
        burst.extend_from_slice(RMC);
        burst.extend_from_slice(VTG);
        let mut transport = MemoryTransport::new();
        transport.push_frame(&burst);
        let mut dev = device(transport);

        let mut snapshot = FixSnapshot::default();
        let request = UpdateRequest::ALTITUDE | UpdateRequest::SPEED | UpdateRequest::UTC;
        dev.update(request, &mut snapshot, 5).unwrap();

        assert_eq!(snapshot.altitude, 4996);
        assert_eq!(snapshot.speed, 102);
        assert_eq!(snapshot.time.hour, 12);
        assert_eq!(snapshot.date.day, 23);
        // position was not requested
        assert_eq!(snapshot.latitude, Latitude::default());
        assert_eq!(snapshot.fix, FixInfo::default());
        assert_eq!(dev.delay.ticks, 0);
    }

    #[test]
    fn test_update_undecodable_sentence_stays_pending() {
        let mut transport = MemoryTransport::new();
        transport
            .push_frame(b"$GNVTG,054.7,T,,M,,N,,K,N*00\r\n")
            .push_frame(VTG);
        let mut dev = device(transport);

        let mut snapshot = FixSnapshot::default();
        dev.update(UpdateRequest::SPEED, &mut snapshot, 5).unwrap();
        assert_eq!(snapshot.speed, 102);
        assert_eq!(dev.delay.ticks, 1);
    }

    #[test]
    fn test_update_fix_info_from_two_sentences() {
        let mut transport = MemoryTransport::new();
        transport.push_frame(GSA).push_idle().push_frame(GGA);
        let mut dev = device(transport);

        let mut snapshot = FixSnapshot::default();
        dev.update(UpdateRequest::FIX_INFO, &mut snapshot, 5).unwrap();
        assert_eq!(snapshot.fix.quality, FixQuality::Sps);
        assert_eq!(snapshot.fix.satellites_used, 8);
        assert_eq!(snapshot.fix.fix_type, FixType::Fix3D);
        assert_eq!(snapshot.fix.pdop, 19);
        // altitude was not requested even though GGA carries it
        assert_eq!(snapshot.altitude, 0);
    }

    #[test]
    fn test_update_zero_ticks() {
        let mut transport = MemoryTransport::new();
        transport.push_frame(VTG);
        let mut dev = device(transport);
        let mut snapshot = FixSnapshot::default();
        assert_eq!(
            dev.update(UpdateRequest::SPEED, &mut snapshot, 0),
            Err(Error::Timeout)
        );
    }
}
