//! uDMX discovery
//!
//! The uDMX uses obdev's shared VID/PID, so a VID/PID match only makes a
//! device a candidate. It is accepted once its manufacturer and product
//! strings match as well.

use crate::usb::descriptor::read_string_latin1;
use protocol::{
    DeviceIdentity, LANGID_EN_US, UDMX_MANUFACTURER, UDMX_PRODUCT, USBDEV_SHARED_PRODUCT,
    USBDEV_SHARED_VENDOR,
};
use rusb::{Device, DeviceHandle, UsbContext};
use tracing::{debug, warn};

/// A device seen during enumeration
///
/// Implemented for [`rusb::Device`]; tests substitute scripted devices.
pub trait DeviceProbe {
    type Handle;

    /// Vendor and product ID, `None` if the descriptor cannot be read
    fn ids(&self) -> Option<(u16, u16)>;

    /// Bus position for log messages
    fn location(&self) -> String;

    fn open(&self) -> rusb::Result<Self::Handle>;

    fn manufacturer(&self, handle: &Self::Handle) -> rusb::Result<String>;

    fn product(&self, handle: &Self::Handle) -> rusb::Result<String>;
}

impl<T: UsbContext> DeviceProbe for Device<T> {
    type Handle = DeviceHandle<T>;

    fn ids(&self) -> Option<(u16, u16)> {
        self.device_descriptor()
            .ok()
            .map(|desc| (desc.vendor_id(), desc.product_id()))
    }

    fn location(&self) -> String {
        format!("bus {:03} device {:03}", self.bus_number(), self.address())
    }

    fn open(&self) -> rusb::Result<Self::Handle> {
        Device::<T>::open(self)
    }

    fn manufacturer(&self, handle: &Self::Handle) -> rusb::Result<String> {
        let index = self.device_descriptor()?.manufacturer_string_index();
        read_string_latin1(handle, index.unwrap_or(0), LANGID_EN_US)
    }

    fn product(&self, handle: &Self::Handle) -> rusb::Result<String> {
        let index = self.device_descriptor()?.product_string_index();
        read_string_latin1(handle, index.unwrap_or(0), LANGID_EN_US)
    }
}

fn has_shared_ids<P: DeviceProbe>(candidate: &P) -> bool {
    candidate.ids() == Some((USBDEV_SHARED_VENDOR, USBDEV_SHARED_PRODUCT))
}

/// Find the first uDMX among `devices` and return its open handle
///
/// Enumeration stops at the first accepted device. Handles of rejected
/// candidates are dropped, which closes them.
pub fn find_device<P, I>(devices: I) -> Option<P::Handle>
where
    P: DeviceProbe,
    I: IntoIterator<Item = P>,
{
    devices
        .into_iter()
        .filter(has_shared_ids)
        .find_map(|candidate| confirm(&candidate))
}

/// Open the first device with the shared VID/PID, without checking strings
///
/// Used for the bootloader command only.
pub fn find_any_shared<P, I>(devices: I) -> Option<P::Handle>
where
    P: DeviceProbe,
    I: IntoIterator<Item = P>,
{
    devices
        .into_iter()
        .filter(has_shared_ids)
        .find_map(|candidate| match candidate.open() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(
                    "Cannot open USB device at {}: {}",
                    candidate.location(),
                    e
                );
                None
            }
        })
}

/// Read the full identity of a shared-VID/PID candidate
pub fn identify<P: DeviceProbe>(candidate: &P) -> rusb::Result<DeviceIdentity> {
    let (vendor_id, product_id) = candidate.ids().ok_or(rusb::Error::NotFound)?;
    let handle = candidate.open()?;

    Ok(DeviceIdentity {
        vendor_id,
        product_id,
        manufacturer: candidate.manufacturer(&handle)?,
        product: candidate.product(&handle)?,
    })
}

/// All candidates with the shared VID/PID, paired with their identity
pub fn shared_candidates<P, I>(devices: I) -> Vec<(String, rusb::Result<DeviceIdentity>)>
where
    P: DeviceProbe,
    I: IntoIterator<Item = P>,
{
    devices
        .into_iter()
        .filter(has_shared_ids)
        .map(|candidate| (candidate.location(), identify(&candidate)))
        .collect()
}

fn confirm<P: DeviceProbe>(candidate: &P) -> Option<P::Handle> {
    debug!(
        "Found device with {:x}:{:x} at {}",
        USBDEV_SHARED_VENDOR,
        USBDEV_SHARED_PRODUCT,
        candidate.location()
    );

    let handle = match candidate.open() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Cannot open USB device: {}", e);
            return None;
        }
    };

    let manufacturer = match candidate.manufacturer(&handle) {
        Ok(manufacturer) => manufacturer,
        Err(e) => {
            warn!("Cannot query manufacturer for device: {}", e);
            return None;
        }
    };
    debug!("Device vendor is {}", manufacturer);
    if manufacturer != UDMX_MANUFACTURER {
        return None;
    }

    let product = match candidate.product(&handle) {
        Ok(product) => product,
        Err(e) => {
            warn!("Cannot query product for device: {}", e);
            return None;
        }
    };
    debug!("Device product is {}", product);
    if product != UDMX_PRODUCT {
        return None;
    }

    Some(handle)
}
