//! SHDLC command 0x93: "Get System Up Time".

use std::time::Duration;

use byteorder::{BigEndian, ByteOrder};

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0x93;

/// Read the time since the last power-on or device reset, in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetSystemUpTime;

impl Command for GetSystemUpTime {
    type Response = u32;

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn min_response_length(&self) -> usize {
        4
    }

    fn max_response_length(&self) -> usize {
        4
    }

    /// System up time in seconds.
    fn interpret(&self, data: &[u8]) -> Result<u32> {
        Ok(BigEndian::read_u32(data))
    }
}
