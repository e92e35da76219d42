use crate::{constants::SERIAL_RX_BUF_SIZE, transport::Transport};
use log::{error, trace, warn};
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Gap after which a burst of received bytes counts as a complete frame
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(10);

/// [`Transport`] over a host serial port.
///
/// Bytes are accumulated until a read times out with data already buffered,
/// which emulates the idle-line detection of a UART.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    buf: [u8; SERIAL_RX_BUF_SIZE],
    len: usize,
    complete: bool,
}

impl SerialTransport {
    /// Takes ownership of an already opened port. The port read timeout
    /// becomes the idle gap that terminates a frame.
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            port,
            buf: [0; SERIAL_RX_BUF_SIZE],
            len: 0,
            complete: false,
        }
    }

    /// Opens `path` at `baud_rate`, 8N1 without flow control
    pub fn open(path: &str, baud_rate: u32) -> serialport::Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(DEFAULT_IDLE_TIMEOUT)
            .open()?;
        Ok(Self::new(port))
    }

    pub fn set_idle_timeout(&mut self, idle: Duration) -> serialport::Result<()> {
        self.port.set_timeout(idle)
    }

    /// Changes the host side baud rate, after reconfiguring the receiver
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> serialport::Result<()> {
        self.port.set_baud_rate(baud_rate)
    }

    /// Reads the serial port, converting timeouts into "no data received"
    fn read_port(&mut self, output: &mut [u8]) -> io::Result<usize> {
        match self.port.read(output) {
            Ok(b) => Ok(b),
            Err(e) => {
                if e.kind() == io::ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            },
        }
    }

    fn store(&mut self, bytes: &[u8]) {
        for b in bytes {
            if self.len >= SERIAL_RX_BUF_SIZE {
                warn!("Receive buffer overflow, dropping {} bytes", self.len);
                self.len = 0;
            }
            self.buf[self.len] = *b;
            self.len += 1;
        }
    }

    fn poll_port(&mut self) {
        let mut local_buf = [0u8; 256];
        loop {
            match self.read_port(&mut local_buf) {
                Ok(0) => {
                    if self.len > 0 {
                        trace!("Frame of {} bytes captured", self.len);
                        self.complete = true;
                    }
                    return;
                },
                Ok(n) => self.store(&local_buf[..n]),
                Err(e) => {
                    error!("Serial read failed: {e}");
                    return;
                },
            }
        }
    }
}

impl Transport for SerialTransport {
    fn transmit(&mut self, bytes: &[u8]) {
        if let Err(e) = self.port.write_all(bytes) {
            error!("Serial write failed: {e}");
        }
    }

    fn restart_capture(&mut self) {
        if let Err(e) = self.port.clear(ClearBuffer::Input) {
            warn!("Could not flush serial input: {e}");
        }
        self.len = 0;
        self.complete = false;
    }

    fn get_frame(&mut self) -> Option<&[u8]> {
        if !self.complete {
            self.poll_port();
        }
        if self.complete {
            Some(&self.buf[..self.len])
        } else {
            None
        }
    }
}
