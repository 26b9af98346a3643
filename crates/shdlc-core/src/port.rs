//! Port trait for SHDLC frame transception.
//!
//! The [`Port`] trait abstracts over the physical link to an SHDLC bus.
//! Implementations exist for serial ports (UART/RS232/RS485), TCP-tunneled
//! serial links, and mock ports for testing.
//!
//! A port is the single shared resource on a bus that may carry several
//! slave devices; every method is safe to call from multiple threads, and
//! all frame exchanges serialize through the port's re-entrant bus lock.
//! Protocol-level concerns (request/response validation, device error
//! handling) live in [`Connection`](crate::connection::Connection), which
//! operates on a `Port` rather than directly on a serial handle.

use std::time::Duration;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::error::Result;
use crate::frame::MisoFrame;

/// The re-entrant bus lock owned by every port realization.
pub type PortLock = ReentrantMutex<()>;

/// Scoped guard for exclusive access to a port across multiple calls.
///
/// Re-entrant: the owning thread may call [`Port::lock`] (and
/// [`Port::transceive`], which locks internally) again while holding a
/// guard. Released on drop, on every exit path.
pub type PortGuard<'a> = ReentrantMutexGuard<'a, ()>;

/// Synchronous byte-channel port for transceiving SHDLC frames.
///
/// All methods block the calling thread; there are no background tasks and
/// no cancellation beyond the receive timeout expiring.
pub trait Port: Send + Sync {
    /// A short human-readable description of the port (for log messages).
    fn description(&self) -> String;

    /// The currently configured bitrate in bit/s.
    ///
    /// Returns [`Error::Unsupported`](crate::error::Error::Unsupported) on
    /// realizations without bitrate control (e.g. TCP-tunneled links).
    /// Callers about to run multi-step sequences that must change the
    /// bitrate (firmware update) should probe this *before* the first
    /// device-visible step; see [`probe_bitrate_control`](Port::probe_bitrate_control).
    fn bitrate(&self) -> Result<u32>;

    /// Change the bitrate.
    ///
    /// Takes effect immediately for subsequent reads and writes. Returns
    /// [`Error::Unsupported`](crate::error::Error::Unsupported) on
    /// realizations without bitrate control.
    fn set_bitrate(&self, bitrate: u32) -> Result<()>;

    /// Whether the underlying channel is currently open.
    fn is_open(&self) -> bool;

    /// Open the underlying channel. Idempotent: opening an open port is a
    /// no-op.
    fn open(&self) -> Result<()>;

    /// Close the underlying channel. Idempotent: closing a closed port is
    /// a no-op.
    fn close(&self) -> Result<()>;

    /// Acquire the port's bus lock for exclusive access across multiple
    /// exchanges.
    ///
    /// Hold the returned guard to keep other threads off the bus for a
    /// whole sequence of transceptions and bitrate changes (e.g. a
    /// firmware update). Single exchanges do not need an explicit guard;
    /// [`transceive`](Port::transceive) locks internally.
    fn lock(&self) -> PortGuard<'_>;

    /// Send a MOSI frame and receive the matching MISO frame.
    ///
    /// Under the bus lock for the whole call: discards stale inbound
    /// bytes, writes the encoded request, then reads until a complete
    /// response frame is decoded or the timeout budget is exhausted.
    /// `response_timeout` bounds the wait for the *first* response byte;
    /// once a frame is under way the deadline extends by the worst-case
    /// frame transmission time at the configured bitrate.
    ///
    /// Returns the decoded frame without any protocol-level validation;
    /// address/command-id checks and status handling are the
    /// [`Connection`](crate::connection::Connection)'s job.
    fn transceive(
        &self,
        slave_address: u8,
        command_id: u8,
        data: &[u8],
        response_timeout: Duration,
    ) -> Result<MisoFrame>;

    /// Check that this port supports bitrate control.
    ///
    /// Reads the current bitrate and writes it back unchanged, so the
    /// check exercises both accessors without altering the configuration.
    /// Callers must run this probe *before* starting sequences that would
    /// strand a device if the bitrate could not be changed afterwards.
    fn probe_bitrate_control(&self) -> Result<()> {
        let bitrate = self.bitrate()?;
        self.set_bitrate(bitrate)
    }
}
