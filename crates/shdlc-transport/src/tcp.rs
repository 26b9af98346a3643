//! TCP port realization of the SHDLC [`Port`] trait.
//!
//! [`TcpPort`] drives SHDLC slaves reachable through a TCP-tunneled serial
//! link (e.g. an RS485 bus behind an Ethernet serial-device server). The
//! framing is identical to the plain serial port; only the read mechanics
//! differ: a connection-oriented socket with a base socket timeout that is
//! summed with the per-call response timeout, and a receive loop reading
//! fixed-size chunks.
//!
//! Bitrate control is not available on this realization -- the bitrate of
//! the tunneled serial segment belongs to the device server, not to this
//! driver -- so [`Port::bitrate`] and [`Port::set_bitrate`] return
//! [`Error::Unsupported`]. Sequences that must change the bitrate (firmware
//! updates) probe for this *before* their first device-visible step.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use shdlc_core::port::Port;
//! use shdlc_transport::TcpPort;
//!
//! # fn example() -> shdlc_core::Result<()> {
//! let port = TcpPort::connect("192.168.1.50:10001")?;
//! let frame = port.transceive(0x00, 0xD1, &[], Duration::from_millis(500))?;
//! println!("payload: {:02X?}", frame.data);
//! # Ok(())
//! # }
//! ```

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use shdlc_core::error::{Error, Result};
use shdlc_core::frame::{build_mosi_frame, MisoFrame, MisoFrameDecoder};
use shdlc_core::port::{Port, PortGuard, PortLock};

/// Default base socket timeout, added to every per-call response timeout.
const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed read chunk size for the receive loop.
const RECEIVE_CHUNK_SIZE: usize = 1024;

/// SHDLC port realization for TCP-tunneled serial links.
pub struct TcpPort {
    lock: PortLock,
    inner: Mutex<TcpInner>,
}

struct TcpInner {
    addr: String,
    socket_timeout: Duration,
    stream: Option<TcpStream>,
}

impl TcpPort {
    /// Create a TCP port without connecting it.
    ///
    /// The `addr` parameter is a `host:port` string, e.g.
    /// `"192.168.1.50:10001"`.
    pub fn new(addr: &str) -> Self {
        TcpPort {
            lock: PortLock::new(()),
            inner: Mutex::new(TcpInner {
                addr: addr.to_string(),
                socket_timeout: DEFAULT_SOCKET_TIMEOUT,
                stream: None,
            }),
        }
    }

    /// Create a TCP port and immediately connect it.
    pub fn connect(addr: &str) -> Result<Self> {
        let port = Self::new(addr);
        Port::open(&port)?;
        Ok(port)
    }

    /// The base socket timeout added to every response timeout.
    pub fn socket_timeout(&self) -> Duration {
        self.inner.lock().socket_timeout
    }

    /// Change the base socket timeout.
    pub fn set_socket_timeout(&self, timeout: Duration) {
        self.inner.lock().socket_timeout = timeout;
    }
}

impl Port for TcpPort {
    fn description(&self) -> String {
        format!("tcp://{}", self.inner.lock().addr)
    }

    fn bitrate(&self) -> Result<u32> {
        Err(Error::Unsupported(
            "bitrate control on a TCP-tunneled port".into(),
        ))
    }

    fn set_bitrate(&self, _bitrate: u32) -> Result<()> {
        Err(Error::Unsupported(
            "bitrate control on a TCP-tunneled port".into(),
        ))
    }

    fn is_open(&self) -> bool {
        self.inner.lock().stream.is_some()
    }

    fn open(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.stream.is_some() {
            return Ok(());
        }
        debug!(addr = %inner.addr, "connecting TCP port");
        let addr = inner
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::Transport(format!("cannot resolve {}", inner.addr)))?;
        let stream = TcpStream::connect_timeout(&addr, inner.socket_timeout).map_err(|e| {
            error!(addr = %inner.addr, error = %e, "TCP connection failed");
            map_connect_error(e, &inner.addr)
        })?;
        // Exchanges are small and latency-sensitive.
        if let Err(e) = stream.set_nodelay(true) {
            warn!(addr = %inner.addr, error = %e, "failed to set TCP_NODELAY (continuing anyway)");
        }
        inner.stream = Some(stream);
        debug!(addr = %inner.addr, "TCP port connected");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(stream) = inner.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                warn!(addr = %inner.addr, error = %e, "failed to shut down TCP stream (continuing anyway)");
            }
            debug!(addr = %inner.addr, "TCP port closed");
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

impl TcpInner {
    /// Discard stale inbound bytes and write one MOSI frame.
    fn send_frame(&mut self, slave_address: u8, command_id: u8, data: &[u8]) -> Result<()> {
        let raw = build_mosi_frame(slave_address, command_id, data);
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        discard_stale_input(stream)?;
        trace!(addr = %self.addr, data = ?raw, "sending frame");
        stream.write_all(&raw)?;
        stream.flush()?;
        Ok(())
    }

    /// Read fixed-size chunks until a complete response frame is decoded.
    ///
    /// Each read is bounded by the base socket timeout plus the per-call
    /// response timeout; socket-level timeouts are reported as
    /// [`Error::Timeout`]. Runaway input is bounded by the decoder's
    /// maximum frame length.
    fn receive_frame(&mut self, response_timeout: Duration) -> Result<MisoFrame> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        stream.set_read_timeout(Some(self.socket_timeout + response_timeout))?;

        let mut decoder = MisoFrameDecoder::new();
        let mut chunk = [0u8; RECEIVE_CHUNK_SIZE];
        loop {
            let read = match stream.read(&mut chunk) {
                // The peer closed the tunnel; no response is coming.
                Ok(0) => return Err(Error::Timeout),
                Ok(n) => n,
                Err(e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    trace!(addr = %self.addr, data = ?decoder.raw(), "receive timed out");
                    return Err(Error::Timeout);
                }
                Err(e) => return Err(e.into()),
            };
            if decoder.add_data(&chunk[..read])? {
                trace!(addr = %self.addr, data = ?decoder.raw(), "received raw frame");
                return decoder.interpret();
            }
        }
    }
}

/// Drain bytes buffered from prior exchanges without blocking.
fn discard_stale_input(stream: &mut TcpStream) -> Result<()> {
    stream.set_nonblocking(true)?;
    let mut discarded = 0usize;
    let mut chunk = [0u8; RECEIVE_CHUNK_SIZE];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => {
                stream.set_nonblocking(false)?;
                return Err(e.into());
            }
        }
    }
    stream.set_nonblocking(false)?;
    if discarded > 0 {
        trace!(bytes = discarded, "discarded stale input");
    }
    Ok(())
}

/// Map a connection-time I/O error to the appropriate [`Error`] variant.
fn map_connect_error(e: io::Error, addr: &str) -> Error {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => {
            Error::Transport(format!("connection refused: {addr}"))
        }
        io::ErrorKind::TimedOut => Error::Timeout,
        _ => Error::Io(e),
    }
}
