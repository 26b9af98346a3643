//! Version types reported by SHDLC devices.
//!
//! The "Get Version" command returns the firmware, hardware, and protocol
//! versions of a device in one response; these types carry the decoded
//! values.

use std::fmt;

/// Firmware version of an SHDLC device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// Major version (0..=255).
    pub major: u8,
    /// Minor version (0..=99).
    pub minor: u8,
    /// Debug flag; `false` for official releases.
    pub debug: bool,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}",
            self.major,
            self.minor,
            if self.debug { "-debug" } else { "" }
        )
    }
}

/// Hardware version of an SHDLC device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareVersion {
    /// Major version (0..=255).
    pub major: u8,
    /// Minor version (0..=99).
    pub minor: u8,
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// SHDLC protocol version spoken by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    /// Major version (0..=255).
    pub major: u8,
    /// Minor version (0..=99).
    pub minor: u8,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// All version numbers of an SHDLC device, as returned by "Get Version".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Firmware version.
    pub firmware: FirmwareVersion,
    /// Hardware version.
    pub hardware: HardwareVersion,
    /// SHDLC protocol version.
    pub protocol: ProtocolVersion,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Firmware {}, Hardware {}, Protocol {}",
            self.firmware, self.hardware, self.protocol
        )
    }
}
