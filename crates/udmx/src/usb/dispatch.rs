//! Request dispatch
//!
//! Executes one [`Request`] as a vendor control transfer. Every transfer is
//! attempted exactly once.

use crate::config::Options;
use crate::error::{Error, Result};
use protocol::{ControlData, Request};
use rusb::{DeviceHandle, UsbContext};
use std::time::Duration;
use tracing::{debug, warn};

/// Control-transfer primitive of an open device
pub trait ControlPipe {
    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;

    fn read_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

impl<T: UsbContext> ControlPipe for DeviceHandle<T> {
    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::<T>::write_control(self, request_type, request, value, index, data, timeout)
    }

    fn read_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::<T>::read_control(self, request_type, request, value, index, buffer, timeout)
    }
}

/// Line echoed to stdout in verbose mode
pub fn action_line(request: &Request) -> String {
    format!("uDMX: {}", request)
}

/// Send `request` and return the number of bytes transferred
pub fn dispatch<P: ControlPipe + ?Sized>(
    pipe: &P,
    request: &Request,
    options: &Options,
) -> Result<usize> {
    if options.verbose {
        println!("{}", action_line(request));
    }

    let setup = request.control_setup();
    debug!(
        "Control transfer: request_type={:#x}, request={:#x}, value={:#x}, index={:#x}",
        setup.request_type, setup.request, setup.value, setup.index
    );

    let result = match &setup.data {
        ControlData::Out(data) => pipe.write_control(
            setup.request_type,
            setup.request,
            setup.value,
            setup.index,
            data,
            setup.timeout,
        ),
        ControlData::In(len) => {
            let mut buffer = vec![0u8; *len];
            pipe.read_control(
                setup.request_type,
                setup.request,
                setup.value,
                setup.index,
                &mut buffer,
                setup.timeout,
            )
        }
    };

    match result {
        Ok(len) => {
            debug!("Control transfer succeeded: {} bytes", len);
            Ok(len)
        }
        Err(e) => {
            warn!("Control transfer failed: {}", e);
            Err(Error::Transfer(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{CMD_SET_CHANNEL_RANGE, CMD_SET_SINGLE_CHANNEL, CMD_START_BOOTLOADER, Channel};
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        inbound: bool,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: Vec<u8>,
        timeout: Duration,
    }

    #[derive(Default)]
    struct RecordingPipe {
        calls: RefCell<Vec<Call>>,
        fail_with: Option<rusb::Error>,
    }

    impl RecordingPipe {
        fn record(&self, call: Call) -> rusb::Result<usize> {
            let len = call.data.len();
            self.calls.borrow_mut().push(call);
            match self.fail_with {
                Some(e) => Err(e),
                None => Ok(len),
            }
        }
    }

    impl ControlPipe for RecordingPipe {
        fn write_control(
            &self,
            request_type: u8,
            request: u8,
            value: u16,
            index: u16,
            data: &[u8],
            timeout: Duration,
        ) -> rusb::Result<usize> {
            self.record(Call {
                inbound: false,
                request_type,
                request,
                value,
                index,
                data: data.to_vec(),
                timeout,
            })
        }

        fn read_control(
            &self,
            request_type: u8,
            request: u8,
            value: u16,
            index: u16,
            buffer: &mut [u8],
            timeout: Duration,
        ) -> rusb::Result<usize> {
            self.record(Call {
                inbound: true,
                request_type,
                request,
                value,
                index,
                data: buffer.to_vec(),
                timeout,
            })
        }
    }

    fn channel(n: i64) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_single_value_sends_set_single_channel() {
        let pipe = RecordingPipe::default();
        let request = Request::from_values(channel(120), vec![200]).unwrap();

        let sent = dispatch(&pipe, &request, &Options::default()).unwrap();
        assert_eq!(sent, 0);

        let calls = pipe.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            Call {
                inbound: false,
                request_type: 0x40,
                request: CMD_SET_SINGLE_CHANNEL,
                value: 200,
                index: 119,
                data: Vec::new(),
                timeout: Duration::from_millis(1000),
            }
        );
    }

    #[test]
    fn test_many_values_send_set_channel_range() {
        let pipe = RecordingPipe::default();
        let request = Request::from_values(channel(1), vec![255, 0, 128, 7]).unwrap();

        let sent = dispatch(&pipe, &request, &Options::default()).unwrap();
        assert_eq!(sent, 4);

        let calls = pipe.calls.borrow();
        assert_eq!(calls[0].request, CMD_SET_CHANNEL_RANGE);
        assert_eq!(calls[0].value, 4);
        assert_eq!(calls[0].index, 0);
        assert_eq!(calls[0].data, vec![255, 0, 128, 7]);
        assert!(!calls[0].inbound);
    }

    #[test]
    fn test_verbose_range_echo() {
        let request = Request::from_values(channel(3), vec![1, 2, 3]).unwrap();
        assert_eq!(action_line(&request), "uDMX: Setting channels 3-5 to 1 2 3");

        let request = Request::from_values(channel(3), vec![9]).unwrap();
        assert_eq!(action_line(&request), "uDMX: Setting channel 3 to 9");
    }

    #[test]
    fn test_verbose_dispatch_sends_once() {
        let pipe = RecordingPipe::default();
        let options = Options {
            verbose: true,
            ..Default::default()
        };
        let request = Request::from_values(channel(10), vec![4, 5]).unwrap();

        assert_eq!(dispatch(&pipe, &request, &options).unwrap(), 2);
        assert_eq!(pipe.calls.borrow().len(), 1);
    }

    #[test]
    fn test_bootloader_reads_inbound() {
        let pipe = RecordingPipe::default();
        dispatch(&pipe, &Request::StartBootloader, &Options::default()).unwrap();

        let calls = pipe.calls.borrow();
        assert!(calls[0].inbound);
        assert_eq!(calls[0].request_type, 0xC0);
        assert_eq!(calls[0].request, CMD_START_BOOTLOADER);
        assert_eq!(calls[0].data.len(), 8);
        assert_eq!(calls[0].timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_transport_failure_is_reported_once() {
        let pipe = RecordingPipe {
            fail_with: Some(rusb::Error::Pipe),
            ..Default::default()
        };
        let request = Request::from_values(channel(3), vec![1]).unwrap();

        let err = dispatch(&pipe, &request, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::Transfer(rusb::Error::Pipe)));
        assert!(err.to_string().starts_with("USB error: "));
        assert_eq!(pipe.calls.borrow().len(), 1);
    }
}
