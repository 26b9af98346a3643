//! shdlc-test-harness: Mock port and frame fixtures for deterministic
//! testing of the SHDLC protocol layers without hardware.
//!
//! [`MockPort`] implements the [`Port`](shdlc_core::port::Port) trait with
//! pre-loaded request/response pairs, letting tests exercise command
//! encoding, response parsing, and error handling end to end -- canned
//! responses flow through the real frame decoder.

mod mock_port;

pub use mock_port::{build_miso_frame, MockPort};
