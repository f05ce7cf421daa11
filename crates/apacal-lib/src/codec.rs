//! Wire format of DisplayCAL's web window.
//!
//! The browser page asks `/ajax/messages` for the next color, passing the
//! color it currently shows plus a random number that only defeats caching.
//! The answer is `#RRGGBB`.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::color::Color;

/// Resource polled for the next color.
pub const MESSAGES_PATH: &str = "/ajax/messages";

/// Shortest body that can hold `#RRGGBB`.
pub const MIN_BODY_LEN: usize = 7;

/// Path-segment escaping: space becomes `%20`, never `+`, which is what the
/// server decodes.
const QUERY_TEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Longest body excerpt kept in a [`DecodeError`].
const EXCERPT_LEN: usize = 32;

/// A color channel, used to report which hex pair failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Red => write!(f, "red"),
            Channel::Green => write!(f, "green"),
            Channel::Blue => write!(f, "blue"),
        }
    }
}

/// Why a response body is not a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer than [`MIN_BODY_LEN`] bytes.
    TooShort { body: String, len: usize },
    /// First byte is not `#`.
    MissingMarker { body: String },
    /// A two-digit group is not hexadecimal.
    InvalidChannel { body: String, channel: Channel },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort { body, len } => write!(
                f,
                "too short: got {body:?} (len {len}), want at least {MIN_BODY_LEN} bytes"
            ),
            DecodeError::MissingMarker { body } => {
                write!(f, "bad format: expected first byte to be '#', got {body:?}")
            }
            DecodeError::InvalidChannel { body, channel } => {
                write!(f, "{channel} component of {body:?} is not a hex byte")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Build the URL that asks for the color following `last`.
///
/// Every call embeds a fresh random number so intermediate caches never
/// answer for the server.
pub fn build_locator(base: &Url, last: Color) -> Url {
    locator_with_token(base, last, rand::random::<f64>())
}

fn locator_with_token(base: &Url, last: Color, token: f64) -> Url {
    let mut url = base.clone();
    url.set_path(MESSAGES_PATH);
    url.set_fragment(None);
    let text = format!("rgb({}, {}, {}) {token}", last.r, last.g, last.b);
    let query = utf8_percent_encode(&text, QUERY_TEXT).to_string();
    url.set_query(Some(&query));
    url
}

/// Decode a `#RRGGBB` response body.
///
/// Hex digits are case-insensitive. Bytes after the seventh are ignored.
pub fn parse_color(body: &[u8]) -> Result<Color, DecodeError> {
    if body.len() < MIN_BODY_LEN {
        return Err(DecodeError::TooShort {
            body: excerpt(body),
            len: body.len(),
        });
    }
    if body[0] != b'#' {
        return Err(DecodeError::MissingMarker {
            body: excerpt(body),
        });
    }

    let channel = |channel: Channel, at: usize| {
        hex_byte(body[at], body[at + 1]).ok_or_else(|| DecodeError::InvalidChannel {
            body: excerpt(body),
            channel,
        })
    };
    let r = channel(Channel::Red, 1)?;
    let g = channel(Channel::Green, 3)?;
    let b = channel(Channel::Blue, 5)?;
    Ok(Color::rgb(r, g, b))
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    let hi = char::from(hi).to_digit(16)?;
    let lo = char::from(lo).to_digit(16)?;
    Some(((hi << 4) | lo) as u8)
}

fn excerpt(body: &[u8]) -> String {
    let end = body.len().min(EXCERPT_LEN);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
