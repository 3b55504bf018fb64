//! Text encodings for request and response bodies.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::str::FromStr;

/// How text is turned into bytes on the way out, and bytes into text on the way back.
///
/// For `Utf8` and `Latin1` the text *is* the payload. For `Base64` and `Hex`
/// the text is a rendering of binary data: an outgoing body is decoded from
/// that rendering before it is written, and a response body is rendered into
/// it once it has been read.
///
/// # Examples
///
/// ```
/// use fetchling::Encoding;
///
/// assert_eq!(Encoding::Hex.encode("cafe").unwrap(), vec![0xca, 0xfe]);
/// assert_eq!(Encoding::Base64.decode(b"hello"), "aGVsbG8=");
/// assert_eq!("latin1".parse::<Encoding>().unwrap(), Encoding::Latin1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8 text. Invalid sequences in a response become U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character.
    Latin1,
    /// Standard padded base64.
    Base64,
    /// Lowercase hexadecimal.
    Hex,
}

impl Encoding {
    /// Converts outgoing text into the bytes that go on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if `text` is not valid base64 or hex
    /// for those encodings.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            // Characters outside the Latin-1 range keep their low byte.
            Encoding::Latin1 => Ok(text.chars().map(|c| c as u32 as u8).collect()),
            Encoding::Base64 => STANDARD.decode(text).map_err(|e| Error::InvalidEncoding {
                encoding: *self,
                reason: e.to_string(),
            }),
            Encoding::Hex => hex::decode(text).map_err(|e| Error::InvalidEncoding {
                encoding: *self,
                reason: e.to_string(),
            }),
        }
    }

    /// Converts a fully read response body into text.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Encoding::Base64 => STANDARD.encode(bytes),
            Encoding::Hex => hex::encode(bytes),
        }
    }

    /// The canonical lowercase name of this encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Latin1 => "latin1",
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "binary" | "iso-8859-1" => Ok(Encoding::Latin1),
            "base64" => Ok(Encoding::Base64),
            "hex" => Ok(Encoding::Hex),
            other => Err(Error::ConfigurationError(format!(
                "Unknown encoding: {}",
                other
            ))),
        }
    }
}
