//! Collaborators the driver is built on: a frame-oriented transport and a
//! millisecond delay source.

#[cfg(feature = "alloc")]
use alloc::{collections::VecDeque, vec::Vec};

/// Frame-oriented link to the receiver.
///
/// A "frame" is whatever arrived between two idle periods of the line: one
/// binary message (often an ACK followed by the response), or a burst of NMEA
/// sentences. The driver takes `&mut self` for every exchange, so a capture
/// restart and the following `get_frame` can never interleave with another
/// request on the same transport.
pub trait Transport {
    /// Fire-and-forget send
    fn transmit(&mut self, bytes: &[u8]);

    /// Drop the captured frame, if any, and arm capture of the next one
    fn restart_capture(&mut self);

    /// The most recently completed frame, `None` while capture is in progress
    fn get_frame(&mut self) -> Option<&[u8]>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transmit(&mut self, bytes: &[u8]) {
        (**self).transmit(bytes)
    }

    fn restart_capture(&mut self) {
        (**self).restart_capture()
    }

    fn get_frame(&mut self) -> Option<&[u8]> {
        (**self).get_frame()
    }
}

/// Blocking wait used between polls
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Sleeps the current thread
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// Returns immediately, for replaying captures and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

/// In-memory transport replaying a scripted sequence of frames.
///
/// Each poll that finds no captured frame takes the next scripted entry; an
/// idle entry makes that poll come back empty. A captured frame stays
/// available until `restart_capture` drops it. Everything transmitted is
/// recorded.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct MemoryTransport {
    script: VecDeque<Option<Vec<u8>>>,
    current: Option<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    restarts: usize,
}

#[cfg(feature = "alloc")]
impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame delivered on a later poll
    pub fn push_frame(&mut self, frame: &[u8]) -> &mut Self {
        self.script.push_back(Some(frame.to_vec()));
        self
    }

    /// Queue one poll that finds nothing
    pub fn push_idle(&mut self) -> &mut Self {
        self.script.push_back(None);
        self
    }

    /// Frames transmitted so far, oldest first
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn restart_count(&self) -> usize {
        self.restarts
    }

    /// Scripted entries not yet consumed
    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

#[cfg(feature = "alloc")]
impl Transport for MemoryTransport {
    fn transmit(&mut self, bytes: &[u8]) {
        self.sent.push(bytes.to_vec());
    }

    fn restart_capture(&mut self) {
        self.restarts += 1;
        self.current = None;
    }

    fn get_frame(&mut self) -> Option<&[u8]> {
        if self.current.is_none() {
            self.current = self.script.pop_front().flatten();
        }
        self.current.as_deref()
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;

    #[test]
    fn test_memory_transport_holds_frame_until_restart() {
        let mut t = MemoryTransport::new();
        t.push_frame(b"first").push_idle().push_frame(b"second");

        assert_eq!(t.get_frame(), Some(&b"first"[..]));
        assert_eq!(t.get_frame(), Some(&b"first"[..]));

        t.restart_capture();
        assert_eq!(t.get_frame(), None);
        assert_eq!(t.get_frame(), Some(&b"second"[..]));

        t.restart_capture();
        assert_eq!(t.get_frame(), None);
        assert_eq!(t.restart_count(), 2);
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn test_memory_transport_records_sent() {
        let mut t = MemoryTransport::new();
        t.transmit(&[1, 2]);
        (&mut t).transmit(&[3]);
        assert_eq!(t.sent(), &[vec![1, 2], vec![3]]);
    }
}
