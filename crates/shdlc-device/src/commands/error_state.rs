//! SHDLC command 0xD2: "Device Error State".

use std::time::Duration;

use byteorder::{BigEndian, ByteOrder};

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0xD2;

/// Read (and optionally clear) the device error state.
///
/// The response carries the device state as 32 error flags plus the code
/// of the last error which occurred on the device; the interpretation of
/// both depends on the connected product type.
#[derive(Debug, Clone, Copy)]
pub struct GetErrorState {
    data: [u8; 1],
}

impl GetErrorState {
    /// Encode the request; with `clear` set the error state on the device
    /// is cleared after being read.
    pub fn new(clear: bool) -> Self {
        GetErrorState {
            data: [clear as u8],
        }
    }
}

impl Command for GetErrorState {
    /// Device state (32 flags) and the last error code.
    type Response = (u32, u8);

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn min_response_length(&self) -> usize {
        5
    }

    fn max_response_length(&self) -> usize {
        5
    }

    fn interpret(&self, data: &[u8]) -> Result<(u32, u8)> {
        Ok((BigEndian::read_u32(&data[0..4]), data[4]))
    }
}
