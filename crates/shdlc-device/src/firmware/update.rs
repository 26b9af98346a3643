//! Firmware update orchestration over the SHDLC bootloader.

use std::sync::Arc;

use tracing::debug;

use shdlc_core::error::{Error, Result};

use crate::commands::bootloader::{
    EnterBootloader, FirmwareUpdateData, FirmwareUpdateStart, FirmwareUpdateStop,
    MAX_UPDATE_CHUNK_LEN,
};
use crate::device::Device;
use crate::firmware::image::FirmwareImage;

/// The SHDLC bootloader listens at a fixed bitrate, independent of the
/// device settings.
pub const BOOTLOADER_BITRATE: u32 = 115_200;

/// The SHDLC bootloader listens at a fixed slave address, independent of
/// the device settings.
pub const BOOTLOADER_SLAVE_ADDRESS: u8 = 0;

/// Drives a firmware update on one device.
///
/// The whole procedure runs under the port's bus lock: compatibility
/// check, bootloader entry, the switch to the bootloader bitrate, the
/// start/data/stop command sequence, and the restoration of the original
/// bitrate -- which happens on every exit path, success or failure.
///
/// Bitrate control is probed *before* the first device-visible step; a
/// device sent into its bootloader over a port that cannot change the
/// bitrate could not be recovered from there.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use shdlc_core::connection::Connection;
/// use shdlc_device::device::Device;
/// use shdlc_device::firmware::{FirmwareImage, FirmwareUpdate};
/// use shdlc_transport::SerialPort;
///
/// # fn example(application_bytes: &[u8]) -> shdlc_core::Result<()> {
/// let port = Arc::new(SerialPort::open("/dev/ttyUSB0", 115_200)?);
/// let connection = Connection::new(port);
/// let mut device = Device::new(&connection, 0);
///
/// let image = FirmwareImage::new(application_bytes)?;
/// FirmwareUpdate::new(&mut device, image)
///     .with_status_callback(|status| println!("{status}"))
///     .execute(false)?;
/// # Ok(())
/// # }
/// ```
pub struct FirmwareUpdate<'a, 'c> {
    device: &'a mut Device<'c>,
    image: FirmwareImage,
    status_callback: Option<Box<dyn FnMut(&str) + 'a>>,
    progress_callback: Option<Box<dyn FnMut(f32) + 'a>>,
}

impl<'a, 'c> FirmwareUpdate<'a, 'c> {
    /// Prepare a firmware update of `device` with `image`.
    pub fn new(device: &'a mut Device<'c>, image: FirmwareImage) -> Self {
        FirmwareUpdate {
            device,
            image,
            status_callback: None,
            progress_callback: None,
        }
    }

    /// Report status messages to `callback` while the update runs.
    pub fn with_status_callback(mut self, callback: impl FnMut(&str) + 'a) -> Self {
        self.status_callback = Some(Box::new(callback));
        self
    }

    /// Report progress (in percent) to `callback` while the update runs.
    pub fn with_progress_callback(mut self, callback: impl FnMut(f32) + 'a) -> Self {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Perform the firmware update.
    ///
    /// This can take several minutes; do not abort it. An aborted update
    /// leaves the device in the bootloader, from where it can be recovered
    /// by running the update again with `emergency` set (which skips the
    /// compatibility check and the bootloader entry, since the application
    /// firmware is no longer running).
    pub fn execute(mut self, emergency: bool) -> Result<()> {
        let port = Arc::clone(self.device.connection().port());
        // The port stays locked for the whole procedure; the lock is
        // re-entrant, so the individual exchanges below nest freely.
        let _bus = port.lock();

        // Probe bitrate control before the first device-visible step.
        port.probe_bitrate_control()?;
        let old_bitrate = port.bitrate()?;

        if !emergency {
            self.check_product_type()?;
            self.enter_bootloader()?;
        }

        port.set_bitrate(BOOTLOADER_BITRATE)?;
        let result = self.flash();
        // Restored on success and failure alike.
        let restored = port.set_bitrate(old_bitrate);
        result?;
        restored?;

        self.status("Finished!");
        Ok(())
    }

    /// Check that the image matches the connected product type.
    fn check_product_type(&mut self) -> Result<()> {
        self.status("Check compatibility...");
        let actual = self.device.get_product_type_as_int()?;
        let expected = self.image.product_type();
        if actual != expected {
            return Err(Error::FirmwareImageIncompatibility { expected, actual });
        }
        self.progress(4.0);
        Ok(())
    }

    /// Switch the device from the application firmware into the
    /// bootloader.
    fn enter_bootloader(&mut self) -> Result<()> {
        self.status("Enter bootloader...");
        self.device.execute(&EnterBootloader)?;
        self.progress(7.0);
        Ok(())
    }

    /// Send the start/data/stop sequence to the bootloader.
    fn flash(&mut self) -> Result<()> {
        self.status("Clear flash...");
        self.execute_bootloader(&FirmwareUpdateStart)?;
        self.progress(10.0);

        let total = self.image.size();
        while self.image.available_bytes() > 0 {
            let chunk = self.image.read(MAX_UPDATE_CHUNK_LEN).to_vec();
            self.execute_bootloader(&FirmwareUpdateData::new(&chunk))?;
            let written = total - self.image.available_bytes();
            self.status(&format!(
                "Write new firmware: {:.2} kB of {:.2} kB",
                written as f32 / 1024.0,
                total as f32 / 1024.0
            ));
            self.progress(10.0 + 80.0 * written as f32 / total as f32);
        }

        self.status("Verify checksum...");
        self.execute_bootloader(&FirmwareUpdateStop::new(self.image.checksum()))?;
        self.progress(100.0);
        Ok(())
    }

    /// Execute a command against the fixed bootloader slave address.
    fn execute_bootloader<C>(&mut self, command: &C) -> Result<()>
    where
        C: shdlc_core::command::Command<Response = ()>,
    {
        let ((), _) = self
            .device
            .connection()
            .execute(BOOTLOADER_SLAVE_ADDRESS, command, true)?;
        Ok(())
    }

    fn status(&mut self, status: &str) {
        debug!(status, "firmware update");
        if let Some(callback) = self.status_callback.as_mut() {
            callback(status);
        }
    }

    fn progress(&mut self, percent: f32) {
        if let Some(callback) = self.progress_callback.as_mut() {
            callback(percent);
        }
    }
}
