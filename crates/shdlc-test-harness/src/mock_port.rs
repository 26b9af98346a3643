//! Mock port for deterministic testing of the SHDLC protocol layers.
//!
//! [`MockPort`] implements the [`Port`] trait with pre-loaded
//! request/response pairs. Each `transceive` call encodes the real MOSI
//! frame, matches it against the next expectation, and feeds the canned
//! response bytes through the real [`MisoFrameDecoder`] -- so the full
//! codec path is exercised, including deliberately malformed responses.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use shdlc_core::frame::build_mosi_frame;
//! use shdlc_core::port::Port;
//! use shdlc_test_harness::{build_miso_frame, MockPort};
//!
//! let port = MockPort::new();
//! port.expect(
//!     &build_mosi_frame(0x2A, 0xD1, &[]),
//!     &build_miso_frame(0x2A, 0xD1, 0x00, &[0x01]),
//! );
//!
//! let frame = port
//!     .transceive(0x2A, 0xD1, &[], Duration::from_millis(50))
//!     .unwrap();
//! assert_eq!(frame.data, vec![0x01]);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use shdlc_core::error::{Error, Result};
use shdlc_core::frame::{
    build_mosi_frame, checksum, MisoFrame, MisoFrameDecoder, ESCAPE, ESCAPED_BYTES, ESCAPE_XOR,
    START_STOP,
};
use shdlc_core::port::{Port, PortGuard, PortLock};

/// Build a raw MISO frame the way a slave device would.
///
/// Produces the full wire format (sentinels, stuffing, checksum) for use as
/// a canned [`MockPort`] response or as test input for the decoder.
pub fn build_miso_frame(address: u8, command_id: u8, state: u8, data: &[u8]) -> Vec<u8> {
    let mut content = vec![address, command_id, state, data.len() as u8];
    content.extend_from_slice(data);
    content.push(checksum(&content));

    let mut raw = Vec::with_capacity(2 * content.len() + 2);
    raw.push(START_STOP);
    for &byte in &content {
        if ESCAPED_BYTES.contains(&byte) {
            raw.push(ESCAPE);
            raw.push(byte ^ ESCAPE_XOR);
        } else {
            raw.push(byte);
        }
    }
    raw.push(START_STOP);
    raw
}

/// A pre-loaded request/response pair.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact raw MOSI bytes expected on the wire.
    request: Vec<u8>,
    /// The raw bytes the "slave" answers with.
    response: Vec<u8>,
}

struct MockInner {
    expectations: VecDeque<Expectation>,
    sent_log: Vec<Vec<u8>>,
    bitrate: Option<u32>,
    bitrate_log: Vec<u32>,
    open: bool,
}

/// A mock [`Port`] for testing protocol layers without hardware.
///
/// Expectations are consumed in order: each `transceive` call matches its
/// encoded request frame against the next expectation and decodes the
/// corresponding canned response. Running out of expectations, or sending
/// something unexpected, fails the exchange with a transport error.
pub struct MockPort {
    lock: PortLock,
    inner: Mutex<MockInner>,
}

impl MockPort {
    /// Create an open mock port with bitrate control, at 115200 bit/s.
    pub fn new() -> Self {
        MockPort {
            lock: PortLock::new(()),
            inner: Mutex::new(MockInner {
                expectations: VecDeque::new(),
                sent_log: Vec::new(),
                bitrate: Some(115_200),
                bitrate_log: Vec::new(),
                open: true,
            }),
        }
    }

    /// Create an open mock port *without* bitrate control, mimicking a
    /// TCP-tunneled port for capability-probe tests.
    pub fn without_bitrate_control() -> Self {
        let port = Self::new();
        port.inner.lock().bitrate = None;
        port
    }

    /// Add an expected raw request and the raw response to answer with.
    pub fn expect(&self, request: &[u8], response: &[u8]) {
        self.inner.lock().expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Add an expectation at the frame level: a request to `slave_address`
    /// with `command_id` and `request_data`, answered with `state` and
    /// `response_data`.
    pub fn expect_exchange(
        &self,
        slave_address: u8,
        command_id: u8,
        request_data: &[u8],
        state: u8,
        response_data: &[u8],
    ) {
        self.expect(
            &build_mosi_frame(slave_address, command_id, request_data),
            &build_miso_frame(slave_address, command_id, state, response_data),
        );
    }

    /// All raw frames sent through this port, one entry per exchange.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.inner.lock().sent_log.clone()
    }

    /// The number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.inner.lock().expectations.len()
    }

    /// Every bitrate that has been set on this port, in order.
    pub fn bitrate_log(&self) -> Vec<u32> {
        self.inner.lock().bitrate_log.clone()
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Port for MockPort {
    fn description(&self) -> String {
        "mock".into()
    }

    fn bitrate(&self) -> Result<u32> {
        self.inner
            .lock()
            .bitrate
            .ok_or_else(|| Error::Unsupported("bitrate control on this mock port".into()))
    }

    fn set_bitrate(&self, bitrate: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.bitrate.is_none() {
            return Err(Error::Unsupported(
                "bitrate control on this mock port".into(),
            ));
        }
        inner.bitrate = Some(bitrate);
        inner.bitrate_log.push(bitrate);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn open(&self) -> Result<()> {
        self.inner.lock().open = true;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.inner.lock().open = false;
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
        _response_timeout: Duration,
    ) -> Result<MisoFrame> {
        let _bus = self.lock.lock();
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(Error::NotOpen);
        }

        let raw = build_mosi_frame(slave_address, command_id, data);
        inner.sent_log.push(raw.clone());

        let expectation = inner.expectations.pop_front().ok_or_else(|| {
            Error::Transport("no more expectations in mock port".into())
        })?;
        if raw != expectation.request {
            return Err(Error::Transport(format!(
                "unexpected request: expected {:02X?}, got {:02X?}",
                expectation.request, raw
            )));
        }

        let mut decoder = MisoFrameDecoder::new();
        if !decoder.add_data(&expectation.response)? {
            return Err(Error::Timeout);
        }
        decoder.interpret()
    }
}
