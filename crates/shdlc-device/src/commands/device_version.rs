//! SHDLC command 0xD1: "Get Version".

use std::time::Duration;

use shdlc_core::command::Command;
use shdlc_core::error::Result;
use shdlc_core::types::{FirmwareVersion, HardwareVersion, ProtocolVersion, Version};

const ID: u8 = 0xD1;

/// Read the firmware, hardware, and SHDLC protocol versions of the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetVersion;

impl Command for GetVersion {
    type Response = Version;

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn min_response_length(&self) -> usize {
        7
    }

    fn max_response_length(&self) -> usize {
        7
    }

    fn interpret(&self, data: &[u8]) -> Result<Version> {
        Ok(Version {
            firmware: FirmwareVersion {
                major: data[0],
                minor: data[1],
                debug: data[2] != 0,
            },
            hardware: HardwareVersion {
                major: data[3],
                minor: data[4],
            },
            protocol: ProtocolVersion {
                major: data[5],
                minor: data[6],
            },
        })
    }
}
