//! The SHDLC common command catalogue.
//!
//! Every SHDLC device understands these commands; they are thin leaves over
//! the [`Command`](shdlc_core::command::Command) contract, each fixing its
//! command id and supplying the fixed-format binary encoding of its
//! payload (big-endian multi-byte integers, NUL-padded ASCII strings).
//!
//! The [`Device`](crate::device::Device) layer wraps each of these in a
//! method; applications only need the command types directly for unusual
//! call patterns (e.g. broadcasting, or executing against a raw
//! [`Connection`](shdlc_core::connection::Connection)).

pub mod baudrate;
pub mod bootloader;
pub mod device_info;
pub mod device_reset;
pub mod device_version;
pub mod error_state;
pub mod factory_reset;
pub mod reply_delay;
pub mod slave_address;
pub mod system_up_time;

pub use baudrate::{GetBaudrate, SetBaudrate};
pub use bootloader::{
    EnterBootloader, FirmwareUpdateData, FirmwareUpdateStart, FirmwareUpdateStop,
};
pub use device_info::{
    GetArticleCode, GetProductName, GetProductSubType, GetProductType, GetSerialNumber,
};
pub use device_reset::DeviceReset;
pub use device_version::GetVersion;
pub use error_state::GetErrorState;
pub use factory_reset::FactoryReset;
pub use reply_delay::{GetReplyDelay, SetReplyDelay};
pub use slave_address::{GetSlaveAddress, SetSlaveAddress};
pub use system_up_time::GetSystemUpTime;
