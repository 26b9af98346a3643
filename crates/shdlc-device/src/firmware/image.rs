//! Firmware image container for SHDLC bootloader updates.

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use shdlc_core::error::{Error, Result};
use shdlc_core::types::FirmwareVersion;

/// Signature word identifying firmware images compatible with the SHDLC
/// bootloader, stored little-endian at the application base address.
pub const FIRMWARE_IMAGE_SIGNATURE: u32 = 0x4B4F474A;

/// Offset of the product type word within the application region.
const PRODUCT_TYPE_OFFSET: usize = 0x04;

/// Offset of the application minor version byte.
const APP_VERSION_MINOR_OFFSET: usize = 0x08;

/// Offset of the application major version byte.
const APP_VERSION_MAJOR_OFFSET: usize = 0x09;

/// A validated firmware image for an SHDLC device.
///
/// Wraps the flat application memory region of a firmware file (starting
/// at the application base address), validates its signature, and exposes
/// the metadata and chunked read access the bootloader sequence needs.
/// Since SHDLC devices use different memory layouts, extracting that
/// region from a hex file is left to device-specific tooling.
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    product_type: u32,
    application_version: FirmwareVersion,
    data: Vec<u8>,
    checksum: u8,
    read_index: usize,
}

impl FirmwareImage {
    /// Build and validate an image from the application memory region.
    ///
    /// The region must begin with the [`FIRMWARE_IMAGE_SIGNATURE`] word;
    /// an [`Error::FirmwareImageSignature`] is returned otherwise. The
    /// signature itself is excluded from the data sent to the bootloader.
    pub fn new(application: &[u8]) -> Result<Self> {
        if application.len() <= APP_VERSION_MAJOR_OFFSET {
            return Err(Error::InvalidParameter(format!(
                "firmware image too small ({} bytes)",
                application.len()
            )));
        }
        let signature = LittleEndian::read_u32(&application[..4]);
        if signature != FIRMWARE_IMAGE_SIGNATURE {
            return Err(Error::FirmwareImageSignature { actual: signature });
        }
        let product_type = LittleEndian::read_u32(&application[PRODUCT_TYPE_OFFSET..]);
        let application_version = FirmwareVersion {
            major: application[APP_VERSION_MAJOR_OFFSET],
            minor: application[APP_VERSION_MINOR_OFFSET],
            // The image format has no debug flag.
            debug: false,
        };
        // The signature must not be sent to the bootloader.
        let data = application[4..].to_vec();
        let checksum = application_checksum(&data);
        debug!(
            product_type,
            version = %application_version,
            size = data.len(),
            checksum,
            "loaded firmware image"
        );
        Ok(FirmwareImage {
            product_type,
            application_version,
            data,
            checksum,
            read_index: 0,
        })
    }

    /// The product type this firmware is built for.
    pub fn product_type(&self) -> u32 {
        self.product_type
    }

    /// The application firmware version contained in the image.
    pub fn application_version(&self) -> FirmwareVersion {
        self.application_version
    }

    /// The checksum over the application data, as verified by the
    /// bootloader after the transfer.
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Total size of the application data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Count of bytes not yet consumed by [`read`](FirmwareImage::read).
    pub fn available_bytes(&self) -> usize {
        self.data.len() - self.read_index
    }

    /// Read up to `max_len` of the next application data bytes.
    ///
    /// Returns an empty slice once the image is exhausted.
    pub fn read(&mut self, max_len: usize) -> &[u8] {
        let len = max_len.min(self.available_bytes());
        let chunk = &self.data[self.read_index..self.read_index + len];
        self.read_index += len;
        chunk
    }
}

/// Checksum over the application data, as expected by the bootloader's
/// update-stop command: the 8-bit sum, inverted.
fn application_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b)) ^ 0xFF
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal valid application region: signature, product type,
    /// version bytes, and some payload.
    fn test_application(product_type: u32, payload: &[u8]) -> Vec<u8> {
        let mut region = vec![0u8; 10];
        LittleEndian::write_u32(&mut region[..4], FIRMWARE_IMAGE_SIGNATURE);
        LittleEndian::write_u32(&mut region[4..8], product_type);
        region[8] = 3; // minor
        region[9] = 1; // major
        region.extend_from_slice(payload);
        region
    }

    #[test]
    fn parses_valid_image() {
        let image = FirmwareImage::new(&test_application(0x0008_0000, &[0xAA, 0xBB])).unwrap();
        assert_eq!(image.product_type(), 0x0008_0000);
        assert_eq!(image.application_version().major, 1);
        assert_eq!(image.application_version().minor, 3);
        assert!(!image.application_version().debug);
        // Signature word is excluded from the data.
        assert_eq!(image.size(), 8);
        assert_eq!(image.available_bytes(), 8);
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut region = test_application(0x0008_0000, &[]);
        region[0] ^= 0x01;
        let err = FirmwareImage::new(&region).unwrap_err();
        match err {
            Error::FirmwareImageSignature { actual } => {
                assert_eq!(actual, FIRMWARE_IMAGE_SIGNATURE ^ 0x01);
            }
            other => panic!("expected FirmwareImageSignature, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_region() {
        let err = FirmwareImage::new(&[0x4A, 0x47]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn checksum_is_inverted_byte_sum() {
        // Data after the signature: 4 product type bytes + version bytes
        // + payload; sum them manually.
        let region = test_application(0x01, &[0x02, 0x03]);
        let image = FirmwareImage::new(&region).unwrap();
        let expected: u8 = region[4..]
            .iter()
            .fold(0u8, |sum, &b| sum.wrapping_add(b))
            ^ 0xFF;
        assert_eq!(image.checksum(), expected);
    }

    #[test]
    fn chunked_read_consumes_data() {
        let mut image =
            FirmwareImage::new(&test_application(0x01, &[0x10, 0x11, 0x12, 0x13])).unwrap();
        assert_eq!(image.size(), 10);

        let first = image.read(6).to_vec();
        assert_eq!(first.len(), 6);
        assert_eq!(image.available_bytes(), 4);

        let second = image.read(6).to_vec();
        assert_eq!(second, vec![0x10, 0x11, 0x12, 0x13]);
        assert_eq!(image.available_bytes(), 0);

        assert!(image.read(6).is_empty());
    }
}
