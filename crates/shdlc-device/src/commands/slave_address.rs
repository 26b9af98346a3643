//! SHDLC command 0x90: "Get/Set Slave Address".

use std::time::Duration;

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0x90;

/// Read the slave address stored on the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetSlaveAddress;

impl Command for GetSlaveAddress {
    type Response = u8;

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
        1
    }

    fn max_response_length(&self) -> usize {
        1
    }

    fn interpret(&self, data: &[u8]) -> Result<u8> {
        Ok(data[0])
    }
}

/// Store a new slave address on the device.
///
/// The setting is persisted in non-volatile device memory, so the driver's
/// cached address must be updated to keep the device reachable (see
/// `Device::set_slave_address`).
#[derive(Debug, Clone, Copy)]
pub struct SetSlaveAddress {
    data: [u8; 1],
}

impl SetSlaveAddress {
    /// Encode a set-slave-address request for the new address (0..=254;
    /// 255 is reserved for broadcast).
    pub fn new(slave_address: u8) -> Self {
        SetSlaveAddress {
            data: [slave_address],
        }
    }
}

impl Command for SetSlaveAddress {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}
