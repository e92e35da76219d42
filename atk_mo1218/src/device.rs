use crate::{
    constants::{
        BIN_ACK_FRAME_LEN, BIN_ACK_SID_FRAME_LEN, DEFAULT_ACK_TICK_MS, DEFAULT_ACK_TIMEOUT_TICKS,
        DEFAULT_UPDATE_TICK_MS, MID_ACK, MID_NACK,
    },
    error::{Error, ProtocolError, Result},
    frame::{self, FrameRef},
    transport::{Delay, Transport},
};
use log::{debug, trace, warn};

/// Timing of the polling loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Polls spent waiting for an acknowledgement or a response
    pub ack_timeout_ticks: u32,
    /// Wait between two acknowledgement polls, in milliseconds
    pub ack_tick_ms: u32,
    /// Wait between two polls of [`Device::update`], in milliseconds
    pub update_tick_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ticks: DEFAULT_ACK_TIMEOUT_TICKS,
            ack_tick_ms: DEFAULT_ACK_TICK_MS,
            update_tick_ms: DEFAULT_UPDATE_TICK_MS,
        }
    }
}

/// Identity of an expected response message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Response {
    pub(crate) id: u8,
    pub(crate) sub_id: Option<u8>,
}

impl Response {
    pub(crate) const fn id(id: u8) -> Self {
        Self { id, sub_id: None }
    }

    pub(crate) const fn sub(id: u8, sub_id: u8) -> Self {
        Self {
            id,
            sub_id: Some(sub_id),
        }
    }

    fn check(self, frame: &FrameRef<'_>) -> core::result::Result<(), ProtocolError> {
        if frame.message_id() != self.id {
            return Err(ProtocolError::UnexpectedMessage {
                expect: self.id,
                got: frame.message_id(),
            });
        }
        match (self.sub_id, frame.sub_id()) {
            (None, _) => Ok(()),
            (Some(expect), Some(got)) if expect == got => Ok(()),
            (Some(expect), got) => Err(ProtocolError::UnexpectedMessage {
                expect,
                got: got.unwrap_or(0),
            }),
        }
    }
}

/// ATK-MO1218 receiver attached through a [`Transport`].
///
/// The configuration and query commands live in [`crate::messages`], the
/// NMEA polling loop in [`Device::update`].
pub struct Device<T: Transport, D: Delay> {
    pub(crate) transport: T,
    pub(crate) delay: D,
    pub(crate) config: DeviceConfig,
}

impl<T: Transport, D: Delay> Device<T, D> {
    pub fn new(transport: T, delay: D) -> Self {
        Self::with_config(transport, delay, DeviceConfig::default())
    }

    pub fn with_config(transport: T, delay: D, config: DeviceConfig) -> Self {
        Self {
            transport,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DeviceConfig) {
        self.config = config;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_parts(self) -> (T, D) {
        (self.transport, self.delay)
    }

    /// Sends `payload` and waits up to `timeout_ticks` polls for the
    /// acknowledgement.
    ///
    /// With `timeout_ticks == 0` the frame is sent and the call returns at
    /// once. A corrupt reply triggers a retransmission within the same budget;
    /// a NACK or any other well-formed message ends the wait with an error.
    pub fn send_and_await(&mut self, payload: &[u8], timeout_ticks: u32) -> Result<()> {
        let frame = frame::encode(payload)?;
        let request_id = payload[0];

        self.transport.restart_capture();
        trace!("Sending {:02x?}", frame.as_bytes());
        self.transport.transmit(frame.as_bytes());

        if timeout_ticks == 0 {
            return Ok(());
        }

        let mut remaining = timeout_ticks;
        while remaining > 0 {
            let reply = self
                .transport
                .get_frame()
                .map(|data| frame::decode(data).map(|f| (f.message_id(), f.sub_id())));
            match reply {
                Some(Ok((MID_ACK, acked))) => {
                    return match acked {
                        Some(id) if id != request_id => {
                            Err(ProtocolError::UnexpectedMessage {
                                expect: request_id,
                                got: id,
                            }
                            .into())
                        },
                        _ => Ok(()),
                    };
                },
                Some(Ok((MID_NACK, _))) => {
                    warn!("Message {:#04x} rejected by the receiver", request_id);
                    return Err(ProtocolError::Nack { id: request_id }.into());
                },
                Some(Ok((id, _))) => {
                    return Err(ProtocolError::UnexpectedMessage {
                        expect: MID_ACK,
                        got: id,
                    }
                    .into());
                },
                Some(Err(e)) => {
                    debug!("Corrupt reply to {:#04x} ({e}), retransmitting", request_id);
                    self.transport.restart_capture();
                    self.transport.transmit(frame.as_bytes());
                },
                None => {},
            }
            remaining -= 1;
            self.delay.delay_ms(self.config.ack_tick_ms);
        }

        warn!("No acknowledgement for message {:#04x}", request_id);
        Err(Error::Timeout)
    }

    /// Configuration command with the default acknowledgement budget
    pub(crate) fn command(&mut self, payload: &[u8]) -> Result<()> {
        self.send_and_await(payload, self.config.ack_timeout_ticks)
    }

    /// Query command: acknowledgement first, then the typed response which
    /// follows the ACK frame in the capture.
    pub(crate) fn query<R>(
        &mut self,
        payload: &[u8],
        expect: Response,
        parse: impl FnOnce(&[u8]) -> Result<R>,
    ) -> Result<R> {
        self.command(payload)?;

        let mut offset = if payload.len() > 1 && expect.sub_id.is_some() {
            BIN_ACK_SID_FRAME_LEN
        } else {
            BIN_ACK_FRAME_LEN
        };
        let mut remaining = self.config.ack_timeout_ticks;
        loop {
            let mut incomplete = false;
            if let Some(data) = self.transport.get_frame() {
                if data.len() > offset {
                    match frame::decode(&data[offset..]) {
                        Ok(response) => {
                            expect.check(&response)?;
                            return parse(response.payload());
                        },
                        Err(ProtocolError::Truncated { .. }) => incomplete = true,
                        Err(e) => return Err(e.into()),
                    }
                } else {
                    incomplete = offset > 0;
                }
            }
            if incomplete {
                debug!("Response to {:#04x} not complete in this capture", payload[0]);
                offset = 0;
                self.transport.restart_capture();
            }
            if remaining == 0 {
                warn!("No response {:#04x} received", expect.id);
                return Err(Error::Timeout);
            }
            remaining -= 1;
            self.delay.delay_ms(self.config.ack_tick_ms);
        }
    }
}

#[cfg(all(test, feature = "alloc"))]
pub(crate) mod tests {
    use super::*;
    use crate::{frame::encode, transport::MemoryTransport};
    use alloc::vec::Vec;

    /// Counts requested waits instead of sleeping
    #[derive(Default)]
    pub(crate) struct TickCounter {
        pub(crate) ticks: u32,
    }

    impl Delay for TickCounter {
        fn delay_ms(&mut self, _ms: u32) {
            self.ticks += 1;
        }
    }

    pub(crate) fn frame_of(payload: &[u8]) -> Vec<u8> {
        encode(payload).unwrap().as_bytes().to_vec()
    }

    /// ACK for `payload` followed by the response frame, in one capture
    pub(crate) fn ack_then(acked: &[u8], response: &[u8]) -> Vec<u8> {
        let mut ack = Vec::from([MID_ACK]);
        ack.extend_from_slice(acked);
        let mut out = frame_of(&ack);
        out.extend_from_slice(&frame_of(response));
        out
    }

    pub(crate) fn device(t: MemoryTransport) -> Device<MemoryTransport, TickCounter> {
        Device::new(t, TickCounter::default())
    }

    #[test]
    fn test_fire_and_forget() {
        let mut dev = device(MemoryTransport::new());
        dev.send_and_await(&[0x04, 0x01], 0).unwrap();
        assert_eq!(dev.transport.sent(), &[frame_of(&[0x04, 0x01])]);
        assert_eq!(dev.delay.ticks, 0);
    }

    #[test]
    fn test_ack_after_idle_polls() {
        let mut t = MemoryTransport::new();
        t.push_idle().push_idle().push_frame(&frame_of(&[MID_ACK, 0x09]));
        let mut dev = device(t);
        dev.send_and_await(&[0x09, 0x01, 0x00], 5).unwrap();
        assert_eq!(dev.delay.ticks, 2);
    }

    #[test]
    fn test_nack_is_terminal() {
        let mut t = MemoryTransport::new();
        t.push_frame(&frame_of(&[MID_NACK, 0x09]))
            .push_frame(&frame_of(&[MID_ACK, 0x09]));
        let mut dev = device(t);
        assert_eq!(
            dev.send_and_await(&[0x09, 0x01, 0x00], 5),
            Err(Error::Protocol(ProtocolError::Nack { id: 0x09 }))
        );
        assert_eq!(dev.transport.sent().len(), 1);
    }

    #[test]
    fn test_unexpected_message_is_terminal() {
        let mut t = MemoryTransport::new();
        t.push_frame(&frame_of(&[0x86, 0x01]));
        let mut dev = device(t);
        assert_eq!(
            dev.send_and_await(&[0x09, 0x01, 0x00], 5),
            Err(Error::Protocol(ProtocolError::UnexpectedMessage {
                expect: MID_ACK,
                got: 0x86
            }))
        );
    }

    #[test]
    fn test_ack_for_other_message_rejected() {
        let mut t = MemoryTransport::new();
        t.push_frame(&frame_of(&[MID_ACK, 0x08]));
        let mut dev = device(t);
        assert_eq!(
            dev.send_and_await(&[0x09, 0x01, 0x00], 5),
            Err(Error::Protocol(ProtocolError::UnexpectedMessage {
                expect: 0x09,
                got: 0x08
            }))
        );
    }

    #[test]
    fn test_corrupt_reply_retransmits() {
        let mut corrupt = frame_of(&[MID_ACK, 0x09]);
        corrupt[5] ^= 0xff;
        let mut t = MemoryTransport::new();
        t.push_frame(&corrupt).push_frame(&frame_of(&[MID_ACK, 0x09]));
        let mut dev = device(t);
        dev.send_and_await(&[0x09, 0x01, 0x00], 5).unwrap();

        let request = frame_of(&[0x09, 0x01, 0x00]);
        assert_eq!(dev.transport.sent(), &[request.clone(), request]);
        assert_eq!(dev.delay.ticks, 1);
    }

    #[test]
    fn test_timeout_consumes_every_tick() {
        let mut dev = device(MemoryTransport::new());
        assert_eq!(dev.send_and_await(&[0x10], 7), Err(Error::Timeout));
        assert_eq!(dev.delay.ticks, 7);
    }

    #[test]
    fn test_query_reads_response_after_ack() {
        let mut t = MemoryTransport::new();
        t.push_frame(&ack_then(&[0x10], &[0x86, 0x05]));
        let mut dev = device(t);
        let rate = dev
            .query(&[0x10], Response::id(0x86), |p| Ok(p[1]))
            .unwrap();
        assert_eq!(rate, 5);
    }

    #[test]
    fn test_query_response_in_separate_capture() {
        let mut t = MemoryTransport::new();
        t.push_frame(&frame_of(&[MID_ACK, 0x10]))
            .push_idle()
            .push_frame(&frame_of(&[0x86, 0x0a]));
        let mut dev = device(t);
        let rate = dev
            .query(&[0x10], Response::id(0x86), |p| Ok(p[1]))
            .unwrap();
        assert_eq!(rate, 10);
    }

    #[test]
    fn test_query_truncated_response_waits_for_next_capture() {
        let mut cut = ack_then(&[0x10], &[0x86, 0x05]);
        cut.truncate(cut.len() - 3);
        let mut t = MemoryTransport::new();
        t.push_frame(&cut)
            .push_idle()
            .push_frame(&frame_of(&[0x86, 0x05]));
        let mut dev = device(t);
        let rate = dev
            .query(&[0x10], Response::id(0x86), |p| Ok(p[1]))
            .unwrap();
        assert_eq!(rate, 5);
        assert_eq!(dev.transport.sent().len(), 1);
    }

    #[test]
    fn test_query_corrupt_response_is_terminal() {
        let mut bad = ack_then(&[0x10], &[0x86, 0x05]);
        let cs = bad.len() - 3;
        bad[cs] ^= 0x01;
        let mut t = MemoryTransport::new();
        t.push_frame(&bad);
        let mut dev = device(t);
        assert!(matches!(
            dev.query(&[0x10], Response::id(0x86), |p| Ok(p[1])),
            Err(Error::Protocol(ProtocolError::InvalidChecksum { .. }))
        ));
    }

    #[test]
    fn test_query_checks_sub_id() {
        let mut t = MemoryTransport::new();
        t.push_frame(&ack_then(&[0x64, 0x18], &[0x64, 0x8c, 0x00, 0x01]));
        let mut dev = device(t);
        assert_eq!(
            dev.query(&[0x64, 0x18], Response::sub(0x64, 0x8b), |_| Ok(())),
            Err(Error::Protocol(ProtocolError::UnexpectedMessage {
                expect: 0x8b,
                got: 0x8c
            }))
        );
    }

    #[test]
    fn test_query_without_response_times_out() {
        let mut t = MemoryTransport::new();
        t.push_frame(&frame_of(&[MID_ACK, 0x46]));
        let mut dev = device(t);
        assert_eq!(
            dev.query(&[0x46], Response::id(0xbb), |_| Ok(())),
            Err(Error::Timeout)
        );
    }
}
