//! Command-line control for the uDMX USB-DMX512 interface
//!
//! This crate resolves channel/value arguments (optionally through aliases in
//! `~/.uDMXrc`), locates the uDMX on the USB bus and sends it one vendor
//! control transfer. The device command set lives in the `protocol` crate.

pub mod alias;
pub mod args;
pub mod config;
pub mod error;
pub mod logging;
pub mod usb;

pub use alias::{AliasClass, AliasFile, AliasSource, NoAliases};
pub use args::{ChannelValues, parse_arguments};
pub use config::{Options, UdmxConfig};
pub use error::{Error, Result};
pub use logging::setup_logging;

use protocol::{DeviceIdentity, Request, USBDEV_SHARED_PRODUCT, USBDEV_SHARED_VENDOR};
use rusb::UsbContext;
use tracing::{info, warn};

/// Resolve the arguments into a request, checked against DMX limits
pub fn resolve_request<S: AsRef<str>>(tokens: &[S], options: &Options) -> Result<Request> {
    let resolved = match &options.alias_path {
        Some(path) => parse_arguments(tokens, &AliasFile::new(path))?,
        None => parse_arguments(tokens, &NoAliases)?,
    };
    resolved.into_request()
}

/// Set channels on the first uDMX found
///
/// Arguments are resolved before the bus is touched. Returns the number of
/// payload bytes the device accepted.
pub fn set_channels<S: AsRef<str>>(tokens: &[S], options: &Options) -> Result<usize> {
    let request = resolve_request(tokens, options)?;

    let context = rusb::Context::new()?;
    let devices = context.devices()?;
    let handle = usb::find_device(devices.iter()).ok_or(Error::DeviceNotFound {
        vendor_id: USBDEV_SHARED_VENDOR,
        product_id: USBDEV_SHARED_PRODUCT,
    })?;

    // The handle closes when it goes out of scope, on success and failure alike
    usb::dispatch(&handle, &request, options)
}

/// Send the bootloader command to the first shared-VID/PID device
///
/// Manufacturer and product strings are not checked on this path.
pub fn start_bootloader(options: &Options) -> Result<()> {
    let context = rusb::Context::new()?;
    let devices = context.devices()?;

    let Some(handle) = usb::find_any_shared(devices.iter()) else {
        warn!(
            "No USB device with vid={:#x} pid={:#x} found",
            USBDEV_SHARED_VENDOR, USBDEV_SHARED_PRODUCT
        );
        return Err(Error::DeviceNotFound {
            vendor_id: USBDEV_SHARED_VENDOR,
            product_id: USBDEV_SHARED_PRODUCT,
        });
    };

    let len = usb::dispatch(&handle, &Request::StartBootloader, options)?;
    info!("Bootloader request sent, {} bytes returned", len);
    Ok(())
}

/// Identify every device carrying the shared VID/PID
pub fn list_candidates() -> Result<Vec<(String, rusb::Result<DeviceIdentity>)>> {
    let context = rusb::Context::new()?;
    let devices = context.devices()?;
    Ok(usb::shared_candidates(devices.iter()))
}
