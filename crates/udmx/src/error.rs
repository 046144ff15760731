//! Error types for the uDMX utility

use protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("No value found to set")]
    NoValues,

    #[error("Value '{token}' out of range, must be 0-255")]
    ValueOutOfRange { token: String },

    #[error("Value '{value}' in '{token}' out of range, must be 0-255")]
    AliasValueOutOfRange { value: i64, token: String },

    #[error("Too many values, at most {max} channels can be set at once")]
    TooManyValues { max: usize },

    #[error("Value '{token}' not a number or alias")]
    NotANumber { token: String },

    #[error("Could not find USB device www.anyma.ch/uDMX (vid={vendor_id:#x} pid={product_id:#x})")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    // rusb text lives in the message only, never as a source
    #[error("USB error: {0}")]
    Transfer(rusb::Error),

    #[error("USB error: {0}")]
    Usb(rusb::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<rusb::Error> for Error {
    fn from(e: rusb::Error) -> Self {
        Error::Usb(e)
    }
}

impl Error {
    /// Whether the usage text should follow the error message
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            Error::Usage(_)
                | Error::NoValues
                | Error::Protocol(ProtocolError::ChannelOutOfRange { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
