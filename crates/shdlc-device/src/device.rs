//! The SHDLC device layer.
//!
//! [`Device`] sequences command execution against one slave address on a
//! shared bus, caches the error-state flag received with every response,
//! and upgrades numeric device error codes into rich
//! [`DeviceError`](shdlc_core::error::DeviceError) values through an
//! instance-owned, registrable table.
//!
//! This is a low-level driver: calling a method sends one SHDLC request
//! and interprets its response; there is (nearly) no caching. The only
//! driver-side state is the slave address, the last error flag, and the
//! error table.

use std::collections::HashMap;

use tracing::debug;

use shdlc_core::command::Command;
use shdlc_core::connection::Connection;
use shdlc_core::error::{DeviceError, Error, Result};
use shdlc_core::frame::BROADCAST_ADDRESS;
use shdlc_core::types::Version;

use crate::commands::{
    DeviceReset, FactoryReset, GetArticleCode, GetBaudrate, GetErrorState, GetProductName,
    GetProductSubType, GetProductType, GetReplyDelay, GetSerialNumber, GetSlaveAddress,
    GetSystemUpTime, GetVersion, SetBaudrate, SetReplyDelay, SetSlaveAddress,
};

/// One SHDLC slave device on a bus.
///
/// Constructing a device exchanges no data, so an instance can be created
/// before the device is connected or powered. The slave address is cached
/// driver-side and never re-read from the device.
pub struct Device<'a> {
    connection: &'a Connection,
    slave_address: u8,
    last_error_flag: bool,
    device_errors: HashMap<u8, DeviceError>,
}

impl<'a> Device<'a> {
    /// Create a device instance on a connection.
    ///
    /// The standard SHDLC error codes are pre-registered; device-specific
    /// codes can be added with
    /// [`register_device_errors`](Device::register_device_errors).
    /// `slave_address` 255 is reserved for broadcast and will not work for
    /// point-to-point exchanges.
    pub fn new(connection: &'a Connection, slave_address: u8) -> Self {
        let mut device = Device {
            connection,
            slave_address,
            last_error_flag: false,
            device_errors: HashMap::new(),
        };
        device.register_device_errors(DeviceError::standard_errors());
        device
    }

    /// The connection this device communicates through.
    pub fn connection(&self) -> &'a Connection {
        self.connection
    }

    /// The cached slave address (not read from the device).
    pub fn slave_address(&self) -> u8 {
        self.slave_address
    }

    /// The error-state flag received with the last response.
    ///
    /// Initialized to `false` and updated with every executed command; if
    /// set, the exact reason can be read with
    /// [`get_error_state`](Device::get_error_state).
    pub fn last_error_flag(&self) -> bool {
        self.last_error_flag
    }

    /// Register device-specific error codes for the connected device type.
    ///
    /// Later registrations override earlier ones for the same code.
    pub fn register_device_errors(&mut self, errors: impl IntoIterator<Item = DeviceError>) {
        for error in errors {
            self.device_errors.insert(error.code(), error);
        }
    }

    /// Execute a command on this device and return its interpreted
    /// response.
    ///
    /// Caches the received error-state flag; a device-reported error code
    /// is upgraded to the registered [`DeviceError`] (or a generic one
    /// preserving the code) before propagating.
    pub fn execute<C: Command>(&mut self, command: &C) -> Result<C::Response> {
        match self.connection.execute(self.slave_address, command, true) {
            Ok((response, error_flag)) => {
                self.last_error_flag = error_flag;
                Ok(response)
            }
            Err(Error::Device(raw)) => Err(Error::Device(self.lookup_device_error(raw.code()))),
            Err(e) => Err(e),
        }
    }

    /// The registered error for `code`, or a generic one if unknown.
    fn lookup_device_error(&self, code: u8) -> DeviceError {
        self.device_errors
            .get(&code)
            .cloned()
            .unwrap_or_else(|| DeviceError::with_code(code))
    }

    /// Read the product type as a string of hexadecimal digits.
    pub fn get_product_type(&mut self) -> Result<String> {
        self.execute(&GetProductType)
    }

    /// Read the product type as an integer.
    pub fn get_product_type_as_int(&mut self) -> Result<u32> {
        let text = self.get_product_type()?;
        u32::from_str_radix(&text, 16).map_err(|_| {
            Error::response(format!("product type '{text}' is not a hexadecimal number"))
        })
    }

    /// Read the product subtype. Not supported by every product type.
    pub fn get_product_subtype(&mut self) -> Result<u8> {
        self.execute(&GetProductSubType)
    }

    /// Read the product name. Not supported by every product type.
    pub fn get_product_name(&mut self) -> Result<String> {
        self.execute(&GetProductName)
    }

    /// Read the article code. Not supported by every product type.
    pub fn get_article_code(&mut self) -> Result<String> {
        self.execute(&GetArticleCode)
    }

    /// Read the serial number.
    pub fn get_serial_number(&mut self) -> Result<String> {
        self.execute(&GetSerialNumber)
    }

    /// Read the firmware, hardware, and SHDLC protocol versions.
    pub fn get_version(&mut self) -> Result<Version> {
        self.execute(&GetVersion)
    }

    /// Read (and optionally clear) the device error state.
    ///
    /// Returns the device state flags and the last error that occurred on
    /// the device, translated through the error table (`None` if the code
    /// is zero).
    pub fn get_error_state(&mut self, clear: bool) -> Result<(u32, Option<DeviceError>)> {
        let (state, code) = self.execute(&GetErrorState::new(clear))?;
        let error = (code != 0).then(|| self.lookup_device_error(code));
        Ok((state, error))
    }

    /// Read the slave address from the device.
    ///
    /// This really sends a command, even though the address is already
    /// known driver-side; see [`slave_address`](Device::slave_address) for
    /// the cached value.
    pub fn get_slave_address(&mut self) -> Result<u8> {
        self.execute(&GetSlaveAddress)
    }

    /// Store a new slave address on the device (persisted in non-volatile
    /// memory).
    ///
    /// With `update_driver` set, the cached address of this instance is
    /// updated as well; this is needed to keep the device reachable after
    /// the change. Make sure no other slave on the bus already uses the
    /// new address.
    pub fn set_slave_address(&mut self, slave_address: u8, update_driver: bool) -> Result<()> {
        if slave_address == BROADCAST_ADDRESS {
            return Err(Error::InvalidParameter(format!(
                "slave address {BROADCAST_ADDRESS} is reserved for broadcast"
            )));
        }
        self.execute(&SetSlaveAddress::new(slave_address))?;
        if update_driver {
            debug!(slave_address, "updating cached slave address");
            self.slave_address = slave_address;
        }
        Ok(())
    }

    /// Read the baudrate from the device.
    ///
    /// This really sends a command, even though the bitrate is already
    /// known by the underlying port.
    pub fn get_baudrate(&mut self) -> Result<u32> {
        self.execute(&GetBaudrate)
    }

    /// Store a new baudrate on the device (persisted in non-volatile
    /// memory).
    ///
    /// With `update_driver` set, the underlying port's bitrate is changed
    /// as well -- a driver-side change only, affecting the whole bus. When
    /// several slaves share the bus, change their baudrates consecutively
    /// and pass `update_driver` only on the last call.
    pub fn set_baudrate(&mut self, baudrate: u32, update_driver: bool) -> Result<()> {
        self.execute(&SetBaudrate::new(baudrate))?;
        if update_driver {
            debug!(baudrate, "updating port bitrate");
            self.connection.port().set_bitrate(baudrate)?;
        }
        Ok(())
    }

    /// Read the reply delay of the device in microseconds.
    pub fn get_reply_delay(&mut self) -> Result<u16> {
        self.execute(&GetReplyDelay)
    }

    /// Store a new reply delay on the device, in microseconds.
    pub fn set_reply_delay(&mut self, reply_delay_us: u16) -> Result<()> {
        self.execute(&SetReplyDelay::new(reply_delay_us))
    }

    /// Read the time since the last power-on or device reset, in seconds.
    pub fn get_system_up_time(&mut self) -> Result<u32> {
        self.execute(&GetSystemUpTime)
    }

    /// Execute a device reset (reboot the firmware, similar to a power
    /// cycle). Clears the cached error flag.
    pub fn device_reset(&mut self) -> Result<()> {
        self.execute(&DeviceReset)?;
        self.last_error_flag = false;
        Ok(())
    }

    /// Perform a factory reset (restore the off-the-shelf configuration).
    ///
    /// This resets any configuration done after leaving the factory --
    /// possibly including baudrate and slave address, in which case the
    /// driver's parameters must be adjusted for further communication.
    /// Clears the cached error flag.
    pub fn factory_reset(&mut self) -> Result<()> {
        self.execute(&FactoryReset)?;
        self.last_error_flag = false;
        Ok(())
    }
}
