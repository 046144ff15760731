//! uDMX firmware command set
//!
//! The request codes, identification strings and timeouts below are fixed by
//! the device firmware and must not change.

use std::time::Duration;

/// Obdev's free shared vendor ID
pub const USBDEV_SHARED_VENDOR: u16 = 0x16C0;

/// Obdev's free shared product ID
pub const USBDEV_SHARED_PRODUCT: u16 = 0x05DC;

/// Manufacturer string reported by a genuine uDMX
pub const UDMX_MANUFACTURER: &str = "www.anyma.ch";

/// Product string reported by a genuine uDMX
pub const UDMX_PRODUCT: &str = "uDMX";

/// Language ID used for string descriptor queries (English, United States)
pub const LANGID_EN_US: u16 = 0x0409;

/// Set one channel: wValue = value, wIndex = zero-based channel, no payload
pub const CMD_SET_SINGLE_CHANNEL: u8 = 1;

/// Set a run of channels: wValue = count, wIndex = zero-based start, payload = values
pub const CMD_SET_CHANNEL_RANGE: u8 = 2;

/// Jump into the firmware bootloader
pub const CMD_START_BOOTLOADER: u8 = 0xF8;

/// Timeout for the channel-setting commands
pub const CHANNEL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Timeout for the bootloader command
pub const BOOTLOADER_TIMEOUT: Duration = Duration::from_millis(5000);

/// Size of the IN buffer offered to the bootloader command
pub const BOOTLOADER_REPLY_LEN: usize = 8;

// bmRequestType bits (USB 2.0 §9.3.1)
pub(crate) const ENDPOINT_IN: u8 = 0x80;
pub(crate) const ENDPOINT_OUT: u8 = 0x00;
pub(crate) const TYPE_VENDOR: u8 = 0x02 << 5;
pub(crate) const RECIPIENT_DEVICE: u8 = 0x00;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_bits() {
        assert_eq!(TYPE_VENDOR | RECIPIENT_DEVICE | ENDPOINT_OUT, 0x40);
        assert_eq!(TYPE_VENDOR | RECIPIENT_DEVICE | ENDPOINT_IN, 0xC0);
    }
}
