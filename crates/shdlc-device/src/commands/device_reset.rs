//! SHDLC command 0xD3: "Device Reset".

use std::time::Duration;

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0xD3;

/// Reboot the device firmware, similar to a power cycle.
///
/// The reset is executed *after* the response is sent, hence the
/// post-processing time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceReset;

impl Command for DeviceReset {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn post_processing_time(&self) -> Duration {
        Duration::from_secs(2)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract() {
        let cmd = DeviceReset;
        assert_eq!(cmd.id(), 0xD3);
        assert!(cmd.data().is_empty());
        assert_eq!(cmd.max_response_time(), Duration::from_millis(500));
        assert_eq!(cmd.post_processing_time(), Duration::from_secs(2));
        assert_eq!(cmd.max_response_length(), 0);
    }
}
