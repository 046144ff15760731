//! Channel and value argument resolution
//!
//! The first token names the channel and the rest name values. Every token is
//! looked up as an alias first and parsed as a literal number otherwise.

use crate::alias::{AliasClass, AliasSource};
use crate::error::{Error, Result};
use protocol::{Channel, MAX_CHANNEL, Request};

/// Upper bound on values resolved in one invocation
pub const MAX_VALUES: usize = MAX_CHANNEL as usize;

/// Validated start channel plus the values for consecutive channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelValues {
    pub channel: Channel,
    pub values: Vec<u8>,
}

impl ChannelValues {
    /// Turn into the device request, checking the range end
    pub fn into_request(self) -> Result<Request> {
        Ok(Request::from_values(self.channel, self.values)?)
    }
}

/// Resolve `<channel> <value> [<value> ...]` tokens
pub fn parse_arguments<A, S>(args: &[S], aliases: &A) -> Result<ChannelValues>
where
    A: AliasSource + ?Sized,
    S: AsRef<str>,
{
    let (channel_token, value_tokens) = match args {
        [channel, values @ ..] if !values.is_empty() => (channel.as_ref(), values),
        _ => {
            return Err(Error::Usage(
                "expected a channel and at least one value".to_string(),
            ));
        }
    };

    let channel = resolve_channel(channel_token, aliases)?;

    let mut values = Vec::new();
    for token in value_tokens {
        resolve_values(token.as_ref(), aliases, &mut values)?;
    }

    if values.is_empty() {
        return Err(Error::NoValues);
    }

    Ok(ChannelValues { channel, values })
}

/// Resolve the channel token through a `channel` alias or as a literal
pub fn resolve_channel<A: AliasSource + ?Sized>(token: &str, aliases: &A) -> Result<Channel> {
    let number = match aliases.resolve(AliasClass::Channel, token) {
        Some(text) => leading_int(&text),
        None => leading_int(token),
    };
    Ok(Channel::new(number)?)
}

/// Resolve one value token, appending what it expands to
fn resolve_values<A: AliasSource + ?Sized>(
    token: &str,
    aliases: &A,
    values: &mut Vec<u8>,
) -> Result<()> {
    if let Some(text) = aliases.resolve(AliasClass::Values, token) {
        for part in text.split_whitespace() {
            let value = leading_int(part);
            let byte = u8::try_from(value).map_err(|_| Error::AliasValueOutOfRange {
                value,
                token: token.to_string(),
            })?;
            push_value(values, byte)?;
        }
        return Ok(());
    }

    // Anything starting with '0' is zero, whatever follows
    if token.starts_with('0') {
        return push_value(values, 0);
    }

    let value = leading_int(token);
    if value == 0 {
        return Err(Error::NotANumber {
            token: token.to_string(),
        });
    }
    let byte = u8::try_from(value).map_err(|_| Error::ValueOutOfRange {
        token: token.to_string(),
    })?;
    push_value(values, byte)
}

fn push_value(values: &mut Vec<u8>, value: u8) -> Result<()> {
    if values.len() >= MAX_VALUES {
        return Err(Error::TooManyValues { max: MAX_VALUES });
    }
    values.push(value);
    Ok(())
}

/// Parse the leading decimal integer of `text`, C `atoi` style
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit, and no digits at all yields 0.
pub fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'))
    });

    if negative { -magnitude } else { magnitude }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::alias::NoAliases;
    use proptest::prelude::*;

    proptest! {
        /// Property: every in-range literal pair resolves to itself
        #[test]
        fn prop_literal_pair_roundtrip(channel in 1u16..=512, value in 0u8..=255) {
            let args = [channel.to_string(), value.to_string()];
            let resolved = parse_arguments(&args, &NoAliases).unwrap();
            prop_assert_eq!(resolved.channel.number(), channel);
            prop_assert_eq!(resolved.values, vec![value]);
        }

        /// Property: literal values above 255 never resolve
        #[test]
        fn prop_large_values_rejected(value in 256i64..100_000) {
            let args = ["1".to_string(), value.to_string()];
            let is_out_of_range = matches!(
                parse_arguments(&args, &NoAliases),
                Err(Error::ValueOutOfRange { .. })
            );
            prop_assert!(is_out_of_range);
        }
    }
}
