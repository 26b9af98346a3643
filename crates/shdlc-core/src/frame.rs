//! SHDLC frame encoder/decoder.
//!
//! SHDLC frames are sentinel-delimited, byte-stuffed, and checksummed. This
//! module handles the pure byte-level encoding of MOSI (master out, slave in)
//! request frames and the incremental decoding of MISO (master in, slave out)
//! response frames.
//!
//! # Frame format
//!
//! ```text
//! MOSI: 0x7E [stuffed: ADDR CMD LEN DATA... CHECKSUM] 0x7E
//! MISO: 0x7E [stuffed: ADDR CMD STATE LEN DATA... CHECKSUM] 0x7E
//! ```
//!
//! - Sentinel: `0x7E` delimits the frame at both ends
//! - `ADDR`: slave address (255 is reserved for broadcast)
//! - `CMD`: command id
//! - `STATE`: status byte, responses only (bit 7 = error-state flag,
//!   bits 0-6 = device error code)
//! - `LEN`: payload length (0..=255), must match the actual payload length
//! - Checksum: one's complement of the 8-bit sum of the unstuffed interior
//!
//! Reserved byte values inside the interior are escaped with `0x7D` followed
//! by the byte XOR `0x20`, so the sentinel value can never appear between
//! the delimiters.

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};

/// Sentinel byte marking the start and end of every frame.
pub const START_STOP: u8 = 0x7E;

/// Escape byte introducing a stuffed (escaped) byte.
pub const ESCAPE: u8 = 0x7D;

/// Value XOR-ed onto an escaped byte.
pub const ESCAPE_XOR: u8 = 0x20;

/// Slave address reserved for broadcast frames.
///
/// Broadcasts are never answered, so this address is invalid for
/// point-to-point request/response exchanges.
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// Maximum payload length, limited by the one-byte length field.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Maximum length of a raw MISO frame when every interior byte is stuffed:
/// START + 2 * (ADDRESS + COMMAND + STATE + LENGTH + DATA + CHECKSUM) + STOP.
pub const MAX_RAW_FRAME_LEN: usize = 1 + 2 * (1 + 1 + 1 + 1 + MAX_PAYLOAD_LEN + 1) + 1;

/// Mask for the error-state flag in the status byte.
pub const STATE_ERROR_FLAG: u8 = 0x80;

/// Mask for the device error code in the status byte.
pub const STATE_ERROR_CODE: u8 = 0x7F;

/// Byte values that must be escaped inside the frame interior: the sentinel,
/// the escape byte itself, and the XON/XOFF flow-control characters.
pub const ESCAPED_BYTES: [u8; 4] = [START_STOP, ESCAPE, 0x11, 0x13];

/// Calculate the checksum over the unstuffed frame interior.
///
/// The checksum is the one's complement of the 8-bit wrapping sum of all
/// interior bytes (everything between the sentinels except the checksum
/// byte itself).
pub fn checksum(frame: &[u8]) -> u8 {
    !frame.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Encode a MOSI frame into raw bytes ready for transmission.
///
/// Produces the full wire format including both sentinels, with all
/// reserved interior bytes escaped.
///
/// # Panics
///
/// Panics if `data` is longer than [`MAX_PAYLOAD_LEN`] bytes; the one-byte
/// length field cannot represent larger payloads.
///
/// # Example
///
/// ```
/// use shdlc_core::frame::build_mosi_frame;
///
/// // "Get Version" request to slave 0x2A with no payload
/// let raw = build_mosi_frame(0x2A, 0xD1, &[]);
/// assert_eq!(raw, vec![0x7E, 0x2A, 0xD1, 0x00, 0x04, 0x7E]);
/// ```
pub fn build_mosi_frame(address: u8, command_id: u8, data: &[u8]) -> Vec<u8> {
    assert!(
        data.len() <= MAX_PAYLOAD_LEN,
        "SHDLC payload must not exceed {MAX_PAYLOAD_LEN} bytes"
    );

    let mut content = BytesMut::with_capacity(4 + data.len());
    content.put_u8(address);
    content.put_u8(command_id);
    content.put_u8(data.len() as u8);
    content.put_slice(data);
    let check = checksum(&content);
    content.put_u8(check);

    let mut raw = BytesMut::with_capacity(2 * content.len() + 2);
    raw.put_u8(START_STOP);
    for &byte in content.iter() {
        if ESCAPED_BYTES.contains(&byte) {
            raw.put_u8(ESCAPE);
            raw.put_u8(byte ^ ESCAPE_XOR);
        } else {
            raw.put_u8(byte);
        }
    }
    raw.put_u8(START_STOP);
    raw.to_vec()
}

/// A decoded and validated MISO (response) frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisoFrame {
    /// Slave address the response came from.
    pub address: u8,
    /// Command id echoed by the slave.
    pub command_id: u8,
    /// Status byte (error-state flag + device error code).
    pub state: u8,
    /// Response payload (may be empty).
    pub data: Vec<u8>,
}

impl MisoFrame {
    /// Returns `true` if the device signals an unacknowledged error
    /// condition (bit 7 of the status byte).
    ///
    /// This flag is independent of the current command's success.
    pub fn error_state(&self) -> bool {
        self.state & STATE_ERROR_FLAG != 0
    }

    /// The device error code for the executed command (bits 0-6 of the
    /// status byte). Zero means the command executed successfully.
    pub fn error_code(&self) -> u8 {
        self.state & STATE_ERROR_CODE
    }
}

/// Incremental, restartable decoder for MISO frames.
///
/// Serial and socket reads return partial data, so the decoder accumulates
/// bytes across an arbitrary number of [`add_data`](MisoFrameDecoder::add_data)
/// calls without re-parsing from scratch. Once a complete start...stop span
/// has been received, [`interpret`](MisoFrameDecoder::interpret) un-stuffs
/// and validates the frame.
///
/// A fresh decoder is used per exchange; it is not reset between frames.
///
/// # Example
///
/// ```
/// use shdlc_core::frame::MisoFrameDecoder;
///
/// let mut decoder = MisoFrameDecoder::new();
/// // Response from slave 0, command 0, no error, empty payload.
/// assert!(!decoder.add_data(&[0x7E, 0x00, 0x00]).unwrap());
/// assert!(decoder.add_data(&[0x00, 0x00, 0xFF, 0x7E]).unwrap());
/// let frame = decoder.interpret().unwrap();
/// assert_eq!(frame.address, 0);
/// assert!(frame.data.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MisoFrameDecoder {
    buf: Vec<u8>,
}

impl MisoFrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw bytes received so far (for logging and error diagnostics).
    pub fn raw(&self) -> &[u8] {
        &self.buf
    }

    /// Returns `true` once the start sentinel has been received.
    ///
    /// The transport layer uses this to extend its receive deadline by the
    /// worst-case frame transmission time once a frame is under way.
    pub fn start_received(&self) -> bool {
        self.buf.contains(&START_STOP)
    }

    /// Append newly received bytes and check for a complete frame.
    ///
    /// Returns `Ok(true)` once the buffer contains a full start...stop span
    /// (two sentinel occurrences), `Ok(false)` if the frame is still
    /// incomplete. If the buffer grows beyond [`MAX_RAW_FRAME_LEN`] without
    /// completing, the input cannot be a valid frame and a
    /// [`Error::Response`] is returned with the accumulated bytes attached.
    pub fn add_data(&mut self, data: &[u8]) -> Result<bool> {
        self.buf.extend_from_slice(data);

        if self.buf.iter().filter(|&&b| b == START_STOP).count() >= 2 {
            return Ok(true);
        }
        if self.buf.len() > MAX_RAW_FRAME_LEN {
            // Abort condition in case we are receiving endless rubbish.
            return Err(Error::response_with_raw(
                "response is too long",
                self.buf.clone(),
            ));
        }
        Ok(false)
    }

    /// Un-stuff, validate, and return the received frame.
    ///
    /// Must only be called after [`add_data`](MisoFrameDecoder::add_data)
    /// returned `Ok(true)`. Validation failures (undersize frame, length
    /// field mismatch, checksum mismatch) are returned as
    /// [`Error::Response`] with the raw bytes attached.
    pub fn interpret(&self) -> Result<MisoFrame> {
        let stuffed = self.stuffed_interior()?;
        let unstuffed = unstuff(stuffed);

        // Minimum frame: address, command, state, length, checksum.
        if unstuffed.len() < 5 {
            return Err(Error::response_with_raw(
                "response is too short",
                self.buf.clone(),
            ));
        }

        let (frame, check) = unstuffed.split_at(unstuffed.len() - 1);
        let address = frame[0];
        let command_id = frame[1];
        let state = frame[2];
        let length = frame[3] as usize;
        let data = &frame[4..];

        if length != data.len() {
            return Err(Error::response_with_raw("wrong length", self.buf.clone()));
        }
        if check[0] != checksum(frame) {
            return Err(Error::response_with_raw("wrong checksum", self.buf.clone()));
        }

        Ok(MisoFrame {
            address,
            command_id,
            state,
            data: data.to_vec(),
        })
    }

    /// The stuffed bytes between the first and second sentinel.
    fn stuffed_interior(&self) -> Result<&[u8]> {
        let first = self.buf.iter().position(|&b| b == START_STOP);
        let interior = first.and_then(|start| {
            let rest = &self.buf[start + 1..];
            rest.iter()
                .position(|&b| b == START_STOP)
                .map(|end| &rest[..end])
        });
        interior.ok_or_else(|| {
            Error::response_with_raw("incomplete frame", self.buf.clone())
        })
    }
}

/// Undo byte-stuffing (replace escape sequences by their original value).
///
/// An escape byte marks the next byte as XOR-ed with [`ESCAPE_XOR`]; a
/// trailing escape byte with nothing following it is dropped.
fn unstuff(stuffed: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(stuffed.len());
    let mut xor = 0x00;
    for &byte in stuffed {
        if byte == ESCAPE {
            xor = ESCAPE_XOR;
        } else {
            data.push(byte ^ xor);
            xor = 0x00;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a raw MISO frame the way a slave device would, for feeding the
    /// decoder in tests.
    fn encode_miso(address: u8, command_id: u8, state: u8, data: &[u8]) -> Vec<u8> {
        let mut content = vec![address, command_id, state, data.len() as u8];
        content.extend_from_slice(data);
        content.push(checksum(&content));

        let mut raw = vec![START_STOP];
        for &byte in &content {
            if ESCAPED_BYTES.contains(&byte) {
                raw.push(ESCAPE);
                raw.push(byte ^ ESCAPE_XOR);
            } else {
                raw.push(byte);
            }
        }
        raw.push(START_STOP);
        raw
    }

    fn decode(raw: &[u8]) -> Result<MisoFrame> {
        let mut decoder = MisoFrameDecoder::new();
        assert!(decoder.add_data(raw)?);
        decoder.interpret()
    }

    // ---------------------------------------------------------------
    // Checksum
    // ---------------------------------------------------------------

    #[test]
    fn checksum_empty() {
        assert_eq!(checksum(&[]), 0xFF);
    }

    #[test]
    fn checksum_zeros() {
        assert_eq!(checksum(&[0x00, 0x00, 0x00, 0x00]), 0xFF);
    }

    #[test]
    fn checksum_known_vector() {
        // 0x2A + 0xD1 + 0x00 = 0xFB; one's complement = 0x04
        assert_eq!(checksum(&[0x2A, 0xD1, 0x00]), 0x04);
    }

    #[test]
    fn checksum_wraps_at_eight_bits() {
        // 0xFF + 0xFF = 0x1FE, low byte 0xFE; one's complement = 0x01
        assert_eq!(checksum(&[0xFF, 0xFF]), 0x01);
    }

    // ---------------------------------------------------------------
    // MOSI frame encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_empty_payload() {
        let raw = build_mosi_frame(0x2A, 0xD1, &[]);
        assert_eq!(raw, vec![0x7E, 0x2A, 0xD1, 0x00, 0x04, 0x7E]);
    }

    #[test]
    fn encode_with_payload() {
        // Interior: 00 91 04 00 01 C2 00, sum = 0x158 -> low byte 0x58,
        // checksum = 0xA7. No reserved bytes, so no stuffing.
        let raw = build_mosi_frame(0x00, 0x91, &[0x00, 0x01, 0xC2, 0x00]);
        assert_eq!(
            raw,
            vec![0x7E, 0x00, 0x91, 0x04, 0x00, 0x01, 0xC2, 0x00, 0xA7, 0x7E]
        );
    }

    #[test]
    fn encode_escapes_all_reserved_bytes() {
        let raw = build_mosi_frame(0x00, 0x00, &[0x7E, 0x7D, 0x11, 0x13]);
        // Every reserved byte in the interior must be escaped.
        let interior = &raw[1..raw.len() - 1];
        let mut escaped = false;
        for &byte in interior {
            if escaped {
                escaped = false;
                continue;
            }
            if byte == ESCAPE {
                escaped = true;
                continue;
            }
            assert!(
                !ESCAPED_BYTES.contains(&byte),
                "unescaped reserved byte 0x{byte:02X} inside frame"
            );
        }
        assert_eq!(raw[0], START_STOP);
        assert_eq!(*raw.last().unwrap(), START_STOP);
    }

    #[test]
    fn encode_escaped_payload_wire_bytes() {
        let raw = build_mosi_frame(0x00, 0x00, &[0x7E]);
        // Interior: 00 00 01 7E, checksum = !(0x7F) = 0x80.
        assert_eq!(
            raw,
            vec![0x7E, 0x00, 0x00, 0x01, 0x7D, 0x5E, 0x80, 0x7E]
        );
    }

    #[test]
    #[should_panic(expected = "must not exceed")]
    fn encode_oversize_payload_panics() {
        build_mosi_frame(0x00, 0x00, &[0u8; 256]);
    }

    // ---------------------------------------------------------------
    // MISO frame decoding -- valid frames
    // ---------------------------------------------------------------

    #[test]
    fn decode_minimal_frame() {
        let frame = decode(&[0x7E, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7E]).unwrap();
        assert_eq!(frame.address, 0);
        assert_eq!(frame.command_id, 0);
        assert_eq!(frame.state, 0);
        assert!(frame.data.is_empty());
        assert!(!frame.error_state());
        assert_eq!(frame.error_code(), 0);
    }

    #[test]
    fn decode_stuffed_frame() {
        // Address, command, state, and one payload byte are all escaped.
        let raw = [
            0x7E, 0x7D, 0x5E, 0x7D, 0x5D, 0x7D, 0x31, 0x03, 0x12, 0x7D, 0x33,
            0x14, 0xB7, 0x7E,
        ];
        let frame = decode(&raw).unwrap();
        assert_eq!(frame.address, 0x7E);
        assert_eq!(frame.command_id, 0x7D);
        assert_eq!(frame.state, 0x11);
        assert_eq!(frame.data, vec![0x12, 0x13, 0x14]);
    }

    #[test]
    fn decode_error_state_and_code() {
        let raw = encode_miso(0x05, 0xD2, 0x83, &[]);
        let frame = decode(&raw).unwrap();
        assert!(frame.error_state());
        assert_eq!(frame.error_code(), 0x03);
    }

    #[test]
    fn decode_incremental_byte_by_byte() {
        let raw = encode_miso(0x2A, 0xD1, 0x00, &[0x01, 0x02]);
        let mut decoder = MisoFrameDecoder::new();
        for (i, &byte) in raw.iter().enumerate() {
            let complete = decoder.add_data(&[byte]).unwrap();
            assert_eq!(complete, i == raw.len() - 1, "at byte {i}");
        }
        let frame = decoder.interpret().unwrap();
        assert_eq!(frame.address, 0x2A);
        assert_eq!(frame.command_id, 0xD1);
        assert_eq!(frame.data, vec![0x01, 0x02]);
    }

    #[test]
    fn start_received_tracks_sentinel() {
        let mut decoder = MisoFrameDecoder::new();
        decoder.add_data(&[0x00, 0x01]).unwrap();
        assert!(!decoder.start_received());
        decoder.add_data(&[0x7E]).unwrap();
        assert!(decoder.start_received());
    }

    // ---------------------------------------------------------------
    // Round trips
    // ---------------------------------------------------------------

    #[test]
    fn round_trip_assorted_payloads() {
        let payloads: [&[u8]; 6] = [
            &[],
            &[0x00],
            &[0x7E, 0x7D, 0x11, 0x13],
            &[0x01, 0x02, 0x03, 0x04, 0x05],
            &[0xFF; 64],
            &[0x7E; 255],
        ];
        for payload in payloads {
            let raw = encode_miso(0x2A, 0x91, 0x80, payload);
            let frame = decode(&raw).unwrap();
            assert_eq!(frame.address, 0x2A);
            assert_eq!(frame.command_id, 0x91);
            assert_eq!(frame.state, 0x80);
            assert_eq!(frame.data, payload);
        }
    }

    #[test]
    fn mosi_and_miso_stuffing_agree() {
        // The MOSI builder and the decoder must apply the same escape set:
        // strip the synthetic state byte out of a re-encoded MISO frame and
        // the stuffed bytes match the MOSI encoding of the same content.
        let payload = [0x7E, 0x42, 0x7D, 0x11, 0x13];
        let raw = encode_miso(0x01, 0x02, 0x00, &payload);
        let frame = decode(&raw).unwrap();
        assert_eq!(frame.data, payload);
    }

    // ---------------------------------------------------------------
    // Validation errors
    // ---------------------------------------------------------------

    fn assert_response_error(result: Result<MisoFrame>, expected_reason: &str) {
        match result {
            Err(Error::Response { reason, raw }) => {
                assert_eq!(reason, expected_reason);
                assert!(!raw.is_empty(), "raw bytes must be attached");
            }
            other => panic!("expected Response error, got {other:?}"),
        }
    }

    #[test]
    fn decode_too_short() {
        // Only four unstuffed bytes between the sentinels.
        assert_response_error(
            decode(&[0x7E, 0x00, 0x00, 0x00, 0xFF, 0x7E]),
            "response is too short",
        );
    }

    #[test]
    fn decode_wrong_length_field() {
        // Declared length 2, actual payload 1 byte. The checksum is valid,
        // but the length check comes first.
        let mut content = vec![0x00u8, 0x00, 0x00, 0x02, 0xAA];
        content.push(checksum(&content));
        let mut raw = vec![0x7E];
        raw.extend_from_slice(&content);
        raw.push(0x7E);
        assert_response_error(decode(&raw), "wrong length");
    }

    #[test]
    fn decode_wrong_checksum() {
        let mut raw = encode_miso(0x01, 0x02, 0x00, &[0x03]);
        let checksum_index = raw.len() - 2;
        raw[checksum_index] ^= 0xFF;
        assert_response_error(decode(&raw), "wrong checksum");
    }

    #[test]
    fn decode_detects_single_byte_corruption() {
        // Flipping a bit in any unstuffed interior byte must break the
        // checksum (none of these values collide with the escape set).
        let raw = encode_miso(0x2A, 0x91, 0x00, &[0x01, 0x02, 0x03]);
        for i in 1..raw.len() - 1 {
            let mut corrupted = raw.clone();
            corrupted[i] ^= 0x04;
            assert!(
                decode(&corrupted).is_err(),
                "corruption at byte {i} went undetected"
            );
        }
    }

    // ---------------------------------------------------------------
    // Oversize input abort
    // ---------------------------------------------------------------

    #[test]
    fn add_data_aborts_on_runaway_input() {
        let mut decoder = MisoFrameDecoder::new();
        // One sentinel then endless rubbish: must abort strictly above the
        // maximum possible stuffed frame length.
        decoder.add_data(&[0x7E]).unwrap();
        let rubbish = vec![0x55u8; MAX_RAW_FRAME_LEN - 1];
        assert!(!decoder.add_data(&rubbish).unwrap());
        assert_eq!(decoder.raw().len(), MAX_RAW_FRAME_LEN);
        match decoder.add_data(&[0x55]) {
            Err(Error::Response { reason, raw }) => {
                assert_eq!(reason, "response is too long");
                assert_eq!(raw.len(), MAX_RAW_FRAME_LEN + 1);
            }
            other => panic!("expected Response error, got {other:?}"),
        }
    }

    #[test]
    fn add_data_no_false_abort_at_boundary() {
        // A complete frame arriving exactly at the length bound must be
        // accepted: completeness is checked before the bound.
        let frame = encode_miso(0x01, 0x02, 0x00, &[0x7E; 128]);
        let garbage_len = MAX_RAW_FRAME_LEN - frame.len();
        let mut input = vec![0x55u8; garbage_len];
        input.extend_from_slice(&frame);
        assert_eq!(input.len(), MAX_RAW_FRAME_LEN);

        let mut decoder = MisoFrameDecoder::new();
        assert!(decoder.add_data(&input).unwrap());
    }

    #[test]
    fn max_raw_frame_len_value() {
        assert_eq!(MAX_RAW_FRAME_LEN, 522);
    }
}
