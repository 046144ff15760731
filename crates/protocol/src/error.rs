//! Protocol error types

use thiserror::Error;

/// Errors raised while building a device request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Channel number outside the DMX-512 address space
    #[error("Channel '{channel}' out of range, must be between 1 and {max}")]
    ChannelOutOfRange { channel: i64, max: u16 },

    /// A channel range that would run past the last DMX channel
    #[error("Channels {start}-{end} out of range, last channel is {max}")]
    RangeOverflow { start: u16, end: usize, max: u16 },

    /// A request needs at least one value
    #[error("No value found to set")]
    NoValues,
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::ChannelOutOfRange {
            channel: 600,
            max: 512,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'600'"));
        assert!(msg.contains("between 1 and 512"));
    }

    #[test]
    fn test_range_overflow_display() {
        let err = ProtocolError::RangeOverflow {
            start: 510,
            end: 514,
            max: 512,
        };
        assert_eq!(
            err.to_string(),
            "Channels 510-514 out of range, last channel is 512"
        );
    }
}
