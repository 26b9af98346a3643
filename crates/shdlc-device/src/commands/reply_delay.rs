//! SHDLC command 0x95: "Get/Set Reply Delay".
//!
//! The reply delay raises the minimum response time of a slave, for RS485
//! masters that need time to switch from driving the bus to receiving.

use std::time::Duration;

use byteorder::{BigEndian, ByteOrder};

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0x95;

/// Read the reply delay of the device in microseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetReplyDelay;

impl Command for GetReplyDelay {
    type Response = u16;

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
        2
    }

    fn max_response_length(&self) -> usize {
        2
    }

    /// Reply delay in microseconds.
    fn interpret(&self, data: &[u8]) -> Result<u16> {
        Ok(BigEndian::read_u16(data))
    }
}

/// Store a new reply delay on the device.
#[derive(Debug, Clone, Copy)]
pub struct SetReplyDelay {
    data: [u8; 2],
}

impl SetReplyDelay {
    /// Encode a set-reply-delay request for the given delay in
    /// microseconds.
    pub fn new(reply_delay_us: u16) -> Self {
        let mut data = [0u8; 2];
        BigEndian::write_u16(&mut data, reply_delay_us);
        SetReplyDelay { data }
    }
}

impl Command for SetReplyDelay {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reply_delay_contract() {
        let cmd = GetReplyDelay;
        assert_eq!(cmd.id(), 0x95);
        assert!(cmd.data().is_empty());
        assert_eq!(cmd.min_response_length(), 2);
        assert_eq!(cmd.max_response_length(), 2);
    }

    #[test]
    fn get_reply_delay_interpret() {
        let cmd = GetReplyDelay;
        assert_eq!(cmd.interpret(&[0x00, 0x00]).unwrap(), 0);
        assert_eq!(cmd.interpret(&[0x01, 0x2C]).unwrap(), 300);
        assert_eq!(cmd.interpret(&[0xFF, 0xFF]).unwrap(), 0xFFFF);
    }

    #[test]
    fn set_reply_delay_encodes_big_endian() {
        let cmd = SetReplyDelay::new(300);
        assert_eq!(cmd.data(), &[0x01, 0x2C]);
        assert_eq!(cmd.max_response_length(), 0);
    }
}
