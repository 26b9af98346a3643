//! shdlc-transport: Serial and TCP port realizations for the SHDLC master
//! driver.
//!
//! Both realizations implement the [`Port`](shdlc_core::port::Port) trait
//! from `shdlc-core` and share the same frame codec; they differ only in
//! the read-loop and timeout mechanics of the underlying channel.
//!
//! | Type         | Channel                          | Bitrate control |
//! |--------------|----------------------------------|-----------------|
//! | [`SerialPort`] | UART/RS232/RS485, USB COM ports | yes             |
//! | [`TcpPort`]    | TCP-tunneled serial links       | no              |
//!
//! Each realization is gated behind a feature flag (`serial`, `tcp`); both
//! are enabled by default.

#[cfg(feature = "serial")]
pub mod serial;
#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "serial")]
pub use serial::SerialPort;
#[cfg(feature = "tcp")]
pub use tcp::TcpPort;
