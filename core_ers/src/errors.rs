//! The errors that can occur constructing geometry or decoding wire bytes.

use std::error::Error;
use std::fmt;

/// Helper type for a call that could go wrong.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error type for the geometry and wire-encoding layer.
#[derive(Debug)]
pub enum CoreError {
    /// A rectangle whose start corner passes its end corner on some axis.
    InvalidRect,
    /// The wire bytes decoded to something outside the supported value set.
    WireDecode(&'static str),
    /// The wire bytes are not valid JSON.
    Json(serde_json::Error),
    /// A tagged byte string held invalid base64.
    Base64(base64::DecodeError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CoreError::InvalidRect => {
                write!(f, "rectangle start corner passes its end corner")
            }
            CoreError::WireDecode(msg) => write!(f, "{}", msg),
            CoreError::Json(ref e) => write!(f, "{}", e),
            CoreError::Base64(ref e) => write!(f, "{}", e),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            CoreError::Json(ref e) => Some(e),
            CoreError::Base64(ref e) => Some(e),
            CoreError::InvalidRect | CoreError::WireDecode(..) => None,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Json(err)
    }
}

impl From<base64::DecodeError> for CoreError {
    fn from(err: base64::DecodeError) -> Self {
        CoreError::Base64(err)
    }
}
