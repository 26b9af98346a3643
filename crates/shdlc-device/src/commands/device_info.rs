//! SHDLC command 0xD0: "Device Information".
//!
//! One command id serves several information items, selected by the first
//! payload byte. String items are returned as NUL-padded ASCII and trimmed
//! on interpretation.

use std::time::Duration;

use shdlc_core::command::Command;
use shdlc_core::error::{Error, Result};

const ID: u8 = 0xD0;

/// Decode a NUL-padded ASCII response into a `String`.
fn interpret_string(data: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::response_with_raw("response is not valid ASCII", data))?;
    Ok(text.trim_end_matches('\0').to_string())
}

macro_rules! info_string_command {
    ($(#[$doc:meta])* $name:ident, $subcommand:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Command for $name {
            type Response = String;

            fn id(&self) -> u8 {
                ID
            }

            fn data(&self) -> &[u8] {
                &[$subcommand]
            }

            fn max_response_time(&self) -> Duration {
                Duration::from_millis(500)
            }

            fn interpret(&self, data: &[u8]) -> Result<String> {
                interpret_string(data)
            }
        }
    };
}

info_string_command!(
    /// Read the product type, a string of hexadecimal digits identifying
    /// what kind of SHDLC product is connected (sometimes called "device
    /// type").
    GetProductType,
    0x00
);

info_string_command!(
    /// Read the product name.
    ///
    /// Not supported by every product type.
    GetProductName,
    0x01
);

info_string_command!(
    /// Read the article code.
    ///
    /// Not supported by every product type.
    GetArticleCode,
    0x02
);

info_string_command!(
    /// Read the serial number.
    GetSerialNumber,
    0x03
);

/// Read the product subtype, distinguishing variants of one product type.
///
/// Not supported by every product type.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetProductSubType;

impl Command for GetProductSubType {
    type Response = u8;

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[0x04]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn min_response_length(&self) -> usize {
        1
    }

    fn max_response_length(&self) -> usize {
        1
    }

    fn interpret(&self, data: &[u8]) -> Result<u8> {
        Ok(data[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommand_bytes() {
        assert_eq!(GetProductType.data(), &[0x00]);
        assert_eq!(GetProductName.data(), &[0x01]);
        assert_eq!(GetArticleCode.data(), &[0x02]);
        assert_eq!(GetSerialNumber.data(), &[0x03]);
        assert_eq!(GetProductSubType.data(), &[0x04]);
    }

    #[test]
    fn all_use_device_info_id() {
        assert_eq!(GetProductType.id(), 0xD0);
        assert_eq!(GetProductName.id(), 0xD0);
        assert_eq!(GetArticleCode.id(), 0xD0);
        assert_eq!(GetSerialNumber.id(), 0xD0);
        assert_eq!(GetProductSubType.id(), 0xD0);
    }

    #[test]
    fn interpret_trims_nul_padding() {
        let cmd = GetSerialNumber;
        assert_eq!(
            cmd.interpret(b"18082A1F\0\0\0\0").unwrap(),
            "18082A1F"
        );
        assert_eq!(cmd.interpret(b"").unwrap(), "");
    }

    #[test]
    fn interpret_product_type_hex_string() {
        let cmd = GetProductType;
        assert_eq!(cmd.interpret(b"00080000\0").unwrap(), "00080000");
    }

    #[test]
    fn interpret_rejects_invalid_encoding() {
        let cmd = GetProductName;
        let err = cmd.interpret(&[0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, Error::Response { .. }));
    }

    #[test]
    fn product_subtype_is_single_byte() {
        let cmd = GetProductSubType;
        assert_eq!(cmd.min_response_length(), 1);
        assert_eq!(cmd.max_response_length(), 1);
        assert_eq!(cmd.interpret(&[0x07]).unwrap(), 0x07);
    }
}
