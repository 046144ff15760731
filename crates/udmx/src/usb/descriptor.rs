//! String descriptor retrieval
//!
//! Strings are fetched with a raw GET_DESCRIPTOR request and decoded lossily
//! to ISO Latin-1: any UTF-16 code unit with a non-zero high byte becomes `?`.

use rusb::{DeviceHandle, Direction, Recipient, RequestType, UsbContext};
use std::time::Duration;

/// bDescriptorType of a string descriptor
pub const DT_STRING: u8 = 0x03;

const REQUEST_GET_DESCRIPTOR: u8 = 0x06;
const STRING_BUFFER_LEN: usize = 256;
const STRING_TIMEOUT: Duration = Duration::from_millis(1000);

/// Read string descriptor `index` in `language`, decoded as Latin-1
pub fn read_string_latin1<T: UsbContext>(
    handle: &DeviceHandle<T>,
    index: u8,
    language: u16,
) -> rusb::Result<String> {
    let mut buffer = [0u8; STRING_BUFFER_LEN];
    let request_type = rusb::request_type(Direction::In, RequestType::Standard, Recipient::Device);

    let len = handle.read_control(
        request_type,
        REQUEST_GET_DESCRIPTOR,
        (u16::from(DT_STRING) << 8) | u16::from(index),
        language,
        &mut buffer,
        STRING_TIMEOUT,
    )?;

    Ok(decode_latin1(&buffer[..len]))
}

/// Decode a raw string descriptor
///
/// A buffer that is not a string descriptor decodes to the empty string. The
/// shorter of bLength and the received length bounds the string.
pub fn decode_latin1(raw: &[u8]) -> String {
    if raw.len() < 2 || raw[1] != DT_STRING {
        return String::new();
    }

    let len = usize::from(raw[0]).min(raw.len());
    if len <= 2 {
        return String::new();
    }

    raw[2..len]
        .chunks_exact(2)
        .map(|unit| {
            if unit[1] != 0 {
                '?'
            } else {
                char::from(unit[0])
            }
        })
        .collect()
}
