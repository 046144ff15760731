//! USB subsystem
//!
//! Device discovery, string descriptor decoding and control-transfer
//! dispatch for the uDMX. All operations are blocking.

pub mod descriptor;
pub mod dispatch;
pub mod locator;

pub use descriptor::{decode_latin1, read_string_latin1};
pub use dispatch::{ControlPipe, action_line, dispatch};
pub use locator::{DeviceProbe, find_any_shared, find_device, identify, shared_candidates};
