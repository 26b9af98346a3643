//! SHDLC command 0x92: "Factory Reset".

use std::time::Duration;

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0x92;

/// Restore the off-the-shelf factory configuration.
///
/// This may change communication parameters (baudrate, slave address), in
/// which case the driver's settings must be adjusted before further
/// communication. Executed after the response is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryReset;

impl Command for FactoryReset {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_secs(2)
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
        let cmd = FactoryReset;
        assert_eq!(cmd.id(), 0x92);
        assert!(cmd.data().is_empty());
        assert_eq!(cmd.max_response_time(), Duration::from_secs(2));
        assert_eq!(cmd.post_processing_time(), Duration::from_secs(2));
        assert_eq!(cmd.max_response_length(), 0);
    }
}
