//! The connection to an SHDLC bus.
//!
//! One [`Connection`] is instantiated per bus, no matter how many slave
//! devices share it. It maps [`Command`]s onto raw frame transceptions and
//! handles the protocol-level validation of responses: address and
//! command-id matching, status byte splitting, and device-reported errors.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::command::Command;
use crate::error::{DeviceError, Error, Result};
use crate::port::Port;

/// Protocol-layer handle for executing commands on an SHDLC bus.
///
/// The connection shares the [`Port`] with any number of other connections
/// or devices; it does not control the port's lifecycle. Constructing a
/// connection exchanges no data with the bus.
pub struct Connection {
    port: Arc<dyn Port>,
}

impl Connection {
    /// Create a connection on a port.
    pub fn new(port: Arc<dyn Port>) -> Self {
        debug!(port = %port.description(), "opened SHDLC connection");
        Connection { port }
    }

    /// The underlying port.
    pub fn port(&self) -> &Arc<dyn Port> {
        &self.port
    }

    /// Execute a command and return its interpreted response together with
    /// the device's error-state flag.
    ///
    /// Executing a command means: send the request frame, receive and
    /// validate the response frame, interpret the response payload, and --
    /// if `wait_post_process` is set and the command declares a
    /// post-processing time -- block until the device is ready for the
    /// next command. No data is exchanged during that wait.
    ///
    /// A non-zero device error code in the response status byte takes
    /// precedence over payload interpretation and is returned as
    /// [`Error::Device`].
    pub fn execute<C: Command>(
        &self,
        slave_address: u8,
        command: &C,
        wait_post_process: bool,
    ) -> Result<(C::Response, bool)> {
        let (data, error_state) = self.transceive(
            slave_address,
            command.id(),
            command.data(),
            command.max_response_time(),
        )?;
        if wait_post_process && command.post_processing_time() > Duration::ZERO {
            // Wait for post processing in the device to be sure it is
            // ready for receiving the next command.
            thread::sleep(command.post_processing_time());
        }
        command.check_response_length(&data)?;
        Ok((command.interpret(&data)?, error_state))
    }

    /// Send a raw command and return the received raw response payload and
    /// the device's error-state flag.
    ///
    /// Validates that the response echoes the requested address and
    /// command id (a mismatch means the bus is desynchronized) and raises
    /// [`Error::Device`] if the device reported a command execution error.
    pub fn transceive(
        &self,
        slave_address: u8,
        command_id: u8,
        data: &[u8],
        response_timeout: Duration,
    ) -> Result<(Vec<u8>, bool)> {
        let frame = self
            .port
            .transceive(slave_address, command_id, data, response_timeout)?;
        if frame.address != slave_address {
            return Err(Error::response(format!(
                "received slave address {} instead of {}",
                frame.address, slave_address
            )));
        }
        if frame.command_id != command_id {
            return Err(Error::response(format!(
                "received command id 0x{:02X} instead of 0x{:02X}",
                frame.command_id, command_id
            )));
        }
        let error_state = frame.error_state();
        if error_state {
            warn!(
                slave_address,
                "SHDLC device is in error state"
            );
        }
        let error_code = frame.error_code();
        if error_code != 0 {
            // Command failed to execute on the device.
            warn!(slave_address, error_code, "SHDLC device returned an error");
            return Err(Error::Device(DeviceError::with_code(error_code)));
        }
        Ok((frame.data, error_state))
    }
}
