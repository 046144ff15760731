//! Protocol library for the uDMX USB-DMX interface
//!
//! This crate describes the fixed command set exposed by the uDMX firmware and
//! the DMX-512 domain types used to build requests for it. It knows nothing
//! about USB enumeration: a [`Request`] is turned into a [`ControlSetup`] and
//! handed to whatever transport executes control transfers.
//!
//! # Example
//!
//! ```
//! use protocol::{Channel, Request, CMD_SET_CHANNEL_RANGE};
//!
//! let start = Channel::new(10).unwrap();
//! let request = Request::from_values(start, vec![255, 128, 0]).unwrap();
//! let setup = request.control_setup();
//!
//! assert_eq!(setup.request, CMD_SET_CHANNEL_RANGE);
//! assert_eq!(setup.value, 3); // value count
//! assert_eq!(setup.index, 9); // zero-based start channel
//! ```

pub mod commands;
pub mod error;
pub mod types;

pub use commands::{
    BOOTLOADER_REPLY_LEN, BOOTLOADER_TIMEOUT, CHANNEL_TIMEOUT, CMD_SET_CHANNEL_RANGE,
    CMD_SET_SINGLE_CHANNEL, CMD_START_BOOTLOADER, LANGID_EN_US, UDMX_MANUFACTURER, UDMX_PRODUCT,
    USBDEV_SHARED_PRODUCT, USBDEV_SHARED_VENDOR,
};
pub use error::{ProtocolError, Result};
pub use types::{Channel, ControlData, ControlSetup, DeviceIdentity, MAX_CHANNEL, Request};
