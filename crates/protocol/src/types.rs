//! DMX and device request type definitions
//!
//! This module defines the DMX-512 channel type, the identity a device must
//! report, and the request envelope sent to the uDMX together with its
//! control-transfer encoding.

use crate::commands::{
    BOOTLOADER_REPLY_LEN, BOOTLOADER_TIMEOUT, CHANNEL_TIMEOUT, CMD_SET_CHANNEL_RANGE,
    CMD_SET_SINGLE_CHANNEL, CMD_START_BOOTLOADER, ENDPOINT_IN, ENDPOINT_OUT, RECIPIENT_DEVICE,
    TYPE_VENDOR, UDMX_MANUFACTURER, UDMX_PRODUCT, USBDEV_SHARED_PRODUCT, USBDEV_SHARED_VENDOR,
};
use crate::error::{ProtocolError, Result};
use std::fmt;
use std::time::Duration;

/// Highest addressable DMX-512 channel
pub const MAX_CHANNEL: u16 = 512;

/// A one-based DMX-512 channel number in `1..=512`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u16);

impl Channel {
    /// Validate a channel number
    pub fn new(channel: i64) -> Result<Self> {
        if (1..=i64::from(MAX_CHANNEL)).contains(&channel) {
            Ok(Self(channel as u16))
        } else {
            Err(ProtocolError::ChannelOutOfRange {
                channel,
                max: MAX_CHANNEL,
            })
        }
    }

    /// One-based channel number as users write it
    pub fn number(self) -> u16 {
        self.0
    }

    /// Zero-based index as the firmware addresses it
    pub fn index(self) -> u16 {
        self.0 - 1
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptor data read from a candidate device during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// Manufacturer string, Latin-1 decoded
    pub manufacturer: String,
    /// Product string, Latin-1 decoded
    pub product: String,
}

impl DeviceIdentity {
    /// Whether the VID/PID pair is obdev's shared pair
    pub fn has_shared_ids(&self) -> bool {
        self.vendor_id == USBDEV_SHARED_VENDOR && self.product_id == USBDEV_SHARED_PRODUCT
    }

    /// Whether this is a genuine uDMX. Exact, case-sensitive comparison.
    pub fn is_udmx(&self) -> bool {
        self.has_shared_ids()
            && self.manufacturer == UDMX_MANUFACTURER
            && self.product == UDMX_PRODUCT
    }
}

/// Outbound device operation
///
/// One request is built per invocation and consumed by a single control
/// transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Set one channel to one value
    SetSingle { channel: Channel, value: u8 },
    /// Set consecutive channels starting at `start`
    SetRange { start: Channel, values: Vec<u8> },
    /// Enter the firmware bootloader
    StartBootloader,
}

impl Request {
    /// Build the channel-setting request for `values` starting at `channel`
    ///
    /// A single value becomes [`Request::SetSingle`], more become
    /// [`Request::SetRange`]. Every addressed channel must lie within
    /// `1..=512`.
    pub fn from_values(channel: Channel, values: Vec<u8>) -> Result<Self> {
        match values.len() {
            0 => Err(ProtocolError::NoValues),
            1 => Ok(Request::SetSingle {
                channel,
                value: values[0],
            }),
            count => {
                let end = usize::from(channel.number()) + count - 1;
                if end > usize::from(MAX_CHANNEL) {
                    return Err(ProtocolError::RangeOverflow {
                        start: channel.number(),
                        end,
                        max: MAX_CHANNEL,
                    });
                }
                Ok(Request::SetRange {
                    start: channel,
                    values,
                })
            }
        }
    }

    /// Encode the request as a vendor control transfer
    pub fn control_setup(&self) -> ControlSetup {
        match self {
            Request::SetSingle { channel, value } => ControlSetup {
                request_type: TYPE_VENDOR | RECIPIENT_DEVICE | ENDPOINT_OUT,
                request: CMD_SET_SINGLE_CHANNEL,
                value: u16::from(*value),
                index: channel.index(),
                data: ControlData::Out(Vec::new()),
                timeout: CHANNEL_TIMEOUT,
            },
            Request::SetRange { start, values } => ControlSetup {
                request_type: TYPE_VENDOR | RECIPIENT_DEVICE | ENDPOINT_OUT,
                request: CMD_SET_CHANNEL_RANGE,
                // from_values caps the count at 512
                value: values.len() as u16,
                index: start.index(),
                data: ControlData::Out(values.clone()),
                timeout: CHANNEL_TIMEOUT,
            },
            Request::StartBootloader => ControlSetup {
                request_type: TYPE_VENDOR | RECIPIENT_DEVICE | ENDPOINT_IN,
                request: CMD_START_BOOTLOADER,
                value: 0,
                index: 0,
                data: ControlData::In(BOOTLOADER_REPLY_LEN),
                timeout: BOOTLOADER_TIMEOUT,
            },
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::SetSingle { channel, value } => {
                write!(f, "Setting channel {} to {}", channel, value)
            }
            Request::SetRange { start, values } => {
                let end = usize::from(start.number()) + values.len() - 1;
                write!(f, "Setting channels {}-{} to", start, end)?;
                for value in values {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
            Request::StartBootloader => write!(f, "Starting bootloader"),
        }
    }
}

/// Data stage of a control transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlData {
    /// Host-to-device payload (may be empty)
    Out(Vec<u8>),
    /// Device-to-host, with the buffer size offered
    In(usize),
}

/// Complete setup of one control transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSetup {
    /// bmRequestType
    pub request_type: u8,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
    /// Data stage
    pub data: ControlData,
    /// Transfer timeout
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(n: i64) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_channel_bounds() {
        assert!(Channel::new(0).is_err());
        assert!(Channel::new(-4).is_err());
        assert!(Channel::new(513).is_err());
        assert_eq!(channel(1).index(), 0);
        assert_eq!(channel(512).index(), 511);
        assert_eq!(channel(120).number(), 120);
    }

    #[test]
    fn test_single_value_builds_set_single() {
        let request = Request::from_values(channel(120), vec![200]).unwrap();
        assert_eq!(
            request,
            Request::SetSingle {
                channel: channel(120),
                value: 200
            }
        );

        let setup = request.control_setup();
        assert_eq!(setup.request_type, 0x40);
        assert_eq!(setup.request, CMD_SET_SINGLE_CHANNEL);
        assert_eq!(setup.value, 200);
        assert_eq!(setup.index, 119);
        assert_eq!(setup.data, ControlData::Out(Vec::new()));
        assert_eq!(setup.timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_many_values_build_set_range() {
        let request = Request::from_values(channel(3), vec![10, 20, 30]).unwrap();
        let setup = request.control_setup();
        assert_eq!(setup.request, CMD_SET_CHANNEL_RANGE);
        assert_eq!(setup.value, 3);
        assert_eq!(setup.index, 2);
        assert_eq!(setup.data, ControlData::Out(vec![10, 20, 30]));
    }

    #[test]
    fn test_range_ending_on_last_channel_is_accepted() {
        assert!(Request::from_values(channel(510), vec![1, 2, 3]).is_ok());
    }

    #[test]
    fn test_range_past_last_channel_is_rejected() {
        // Channels past 512 are refused, never truncated
        let err = Request::from_values(channel(511), vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::RangeOverflow {
                start: 511,
                end: 513,
                max: 512
            }
        );
    }

    #[test]
    fn test_no_values_is_rejected() {
        assert_eq!(
            Request::from_values(channel(1), Vec::new()),
            Err(ProtocolError::NoValues)
        );
    }

    #[test]
    fn test_bootloader_setup() {
        let setup = Request::StartBootloader.control_setup();
        assert_eq!(setup.request_type, 0xC0);
        assert_eq!(setup.request, CMD_START_BOOTLOADER);
        assert_eq!(setup.data, ControlData::In(8));
        assert_eq!(setup.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_request_display() {
        let single = Request::from_values(channel(5), vec![7]).unwrap();
        assert_eq!(single.to_string(), "Setting channel 5 to 7");

        let range = Request::from_values(channel(5), vec![7, 8, 9]).unwrap();
        assert_eq!(range.to_string(), "Setting channels 5-7 to 7 8 9");
    }

    #[test]
    fn test_identity_match() {
        let mut identity = DeviceIdentity {
            vendor_id: 0x16C0,
            product_id: 0x05DC,
            manufacturer: "www.anyma.ch".to_string(),
            product: "uDMX".to_string(),
        };
        assert!(identity.is_udmx());

        identity.product = "udmx".to_string();
        assert!(!identity.is_udmx());

        identity.product = "uDMX".to_string();
        identity.manufacturer = "Somebody Else".to_string();
        assert!(!identity.is_udmx());
        assert!(identity.has_shared_ids());
    }
}
