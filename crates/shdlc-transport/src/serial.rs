//! Serial port realization of the SHDLC [`Port`] trait.
//!
//! [`SerialPort`] drives SHDLC slaves over UART/RS232/RS485 links and USB
//! virtual COM ports. SHDLC devices universally use 8 data bits, 1 stop
//! bit, no parity, and no flow control; only the bitrate varies (common
//! values are 9600, 19200, and 115200 bit/s).
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use shdlc_core::port::Port;
//! use shdlc_transport::SerialPort;
//!
//! # fn example() -> shdlc_core::Result<()> {
//! let port = SerialPort::open("/dev/ttyUSB0", 115_200)?;
//!
//! // "Get Version" request to slave 0 with a 500 ms response timeout.
//! let frame = port.transceive(0x00, 0xD1, &[], Duration::from_millis(500))?;
//! println!("state: 0x{:02X}, payload: {:02X?}", frame.state, frame.data);
//! # Ok(())
//! # }
//! ```

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serialport::SerialPort as _;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, StopBits};
use tracing::{debug, error, trace};

use shdlc_core::error::{Error, Result};
use shdlc_core::frame::{build_mosi_frame, MisoFrame, MisoFrameDecoder};
use shdlc_core::port::{Port, PortGuard, PortLock};

/// Default slack added to every response timeout, absorbing driver and OS
/// buffering jitter before the first byte arrives.
const DEFAULT_ADDITIONAL_RESPONSE_TIME: Duration = Duration::from_millis(100);

/// Fixed inter-byte margin added on top of the worst-case frame
/// transmission time.
const INTER_BYTE_MARGIN: Duration = Duration::from_millis(50);

/// Worst-case time a maximally stuffed response frame needs on the wire:
/// 600 bytes at 10 bits per byte (start bit, 8 data bits, stop bit).
fn max_frame_transmission_time(bitrate: u32) -> Duration {
    Duration::from_secs_f64(600.0 * 10.0 / bitrate.max(1) as f64) + INTER_BYTE_MARGIN
}

/// SHDLC port realization for serial links.
///
/// Implements the [`Port`] trait with full bitrate control. The bus lock
/// serializes exchanges from any number of threads; bitrate changes take
/// effect immediately for subsequent exchanges.
pub struct SerialPort {
    lock: PortLock,
    inner: Mutex<SerialInner>,
}

struct SerialInner {
    path: String,
    bitrate: u32,
    additional_response_time: Duration,
    serial: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialPort {
    /// Create a serial port without opening it.
    ///
    /// # Arguments
    ///
    /// * `path` - Serial port path (e.g. `"/dev/ttyUSB0"` on Linux,
    ///   `"COM3"` on Windows)
    /// * `bitrate` - Bitrate in bit/s (e.g. 9600, 19200, 115200)
    pub fn new(path: &str, bitrate: u32) -> Self {
        SerialPort {
            lock: PortLock::new(()),
            inner: Mutex::new(SerialInner {
                path: path.to_string(),
                bitrate,
                additional_response_time: DEFAULT_ADDITIONAL_RESPONSE_TIME,
                serial: None,
            }),
        }
    }

    /// Create and immediately open a serial port.
    pub fn open(path: &str, bitrate: u32) -> Result<Self> {
        let port = Self::new(path, bitrate);
        Port::open(&port)?;
        Ok(port)
    }

    /// The slack added to every response timeout before the first byte.
    pub fn additional_response_time(&self) -> Duration {
        self.inner.lock().additional_response_time
    }

    /// Change the response timeout slack.
    pub fn set_additional_response_time(&self, time: Duration) {
        self.inner.lock().additional_response_time = time;
    }
}

impl Port for SerialPort {
    fn description(&self) -> String {
        let _bus = self.lock.lock();
        let inner = self.inner.lock();
        format!("{}@{}", inner.path, inner.bitrate)
    }

    fn bitrate(&self) -> Result<u32> {
        let _bus = self.lock.lock();
        Ok(self.inner.lock().bitrate)
    }

    fn set_bitrate(&self, bitrate: u32) -> Result<()> {
        let _bus = self.lock.lock();
        let mut inner = self.inner.lock();
        if let Some(serial) = inner.serial.as_mut() {
            serial
                .set_baud_rate(bitrate)
                .map_err(|e| map_serial_error(&inner.path, e))?;
        }
        debug!(port = %inner.path, bitrate, "serial bitrate changed");
        inner.bitrate = bitrate;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().serial.is_some()
    }

    fn open(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.serial.is_some() {
            return Ok(());
        }
        debug!(port = %inner.path, bitrate = inner.bitrate, "opening serial port");
        let serial = serialport::new(&inner.path, inner.bitrate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(DEFAULT_ADDITIONAL_RESPONSE_TIME)
            .open()
            .map_err(|e| {
                error!(port = %inner.path, error = %e, "failed to open serial port");
                Error::Transport(format!(
                    "failed to open serial port {}: {}",
                    inner.path, e
                ))
            })?;
        inner.serial = Some(serial);
        debug!(port = %inner.path, "serial port opened");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.serial.take().is_some() {
            debug!(port = %inner.path, "serial port closed");
        }
        Ok(())
    }

    fn lock(&self) -> PortGuard<'_> {
        self.lock.lock()
    }

    fn transceive(
        &self,
        slave_address: u8,
        command_id: u8,
        data: &[u8],
        response_timeout: Duration,
    ) -> Result<MisoFrame> {
        let _bus = self.lock.lock();
        let mut inner = self.inner.lock();
        inner.send_frame(slave_address, command_id, data)?;
        inner.receive_frame(response_timeout)
    }
}

impl SerialInner {
    /// Discard stale inbound bytes and write one MOSI frame.
    fn send_frame(&mut self, slave_address: u8, command_id: u8, data: &[u8]) -> Result<()> {
        let raw = build_mosi_frame(slave_address, command_id, data);
        let serial = self.serial.as_mut().ok_or(Error::NotOpen)?;
        serial
            .clear(ClearBuffer::Input)
            .map_err(|e| map_serial_error(&self.path, e))?;
        trace!(port = %self.path, data = ?raw, "sending frame");
        serial.write_all(&raw)?;
        serial.flush()?;
        Ok(())
    }

    /// Read until a complete response frame is decoded or the timeout
    /// budget is exhausted.
    ///
    /// The budget for the first byte is `response_timeout` plus the
    /// configured slack; once the start sentinel has been seen it extends
    /// by the worst-case frame transmission time at the current bitrate.
    fn receive_frame(&mut self, response_timeout: Duration) -> Result<MisoFrame> {
        let slack = self.additional_response_time;
        let frame_time = max_frame_transmission_time(self.bitrate);
        let start = Instant::now();
        let mut decoder = MisoFrameDecoder::new();
        let mut frame_under_way = false;

        loop {
            let mut budget = response_timeout + slack;
            if frame_under_way {
                budget += frame_time;
            }
            let elapsed = start.elapsed();
            if elapsed >= budget {
                trace!(port = %self.path, data = ?decoder.raw(), "receive timed out");
                return Err(Error::Timeout);
            }
            let remaining = budget - elapsed;

            let serial = self.serial.as_mut().ok_or(Error::NotOpen)?;
            serial
                .set_timeout(remaining)
                .map_err(|e| map_serial_error(&self.path, e))?;

            // Fetch all buffered bytes at once, or block for at least one.
            let available = serial.bytes_to_read().map(|n| n as usize).unwrap_or(0);
            let mut buf = vec![0u8; available.max(1)];
            let read = match serial.read(&mut buf) {
                // A blocking read returning zero bytes means the stream
                // is gone (e.g. USB adapter unplugged).
                Ok(0) => return Err(Error::Timeout),
                Ok(n) => n,
                Err(e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    // Deadline re-checked at the top of the loop; it may
                    // have been extended since the read began.
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if decoder.add_data(&buf[..read])? {
                trace!(port = %self.path, data = ?decoder.raw(), "received raw frame");
                return decoder.interpret();
            }
            if !frame_under_way && decoder.start_received() {
                frame_under_way = true;
            }
        }
    }
}

/// Map a serialport error to the driver's transport error variant.
fn map_serial_error(path: &str, e: serialport::Error) -> Error {
    Error::Transport(format!("serial port {path}: {e}"))
}
