
//! Error type definitions.

use std::borrow::Cow;
use std::convert::TryFrom;
use std::io::ErrorKind;

/// Short for `std::io::Error`.
pub type IoError = std::io::Error;

/// Short for `std::io::Result`.
pub type IoResult<T> = std::io::Result<T>;

/// A result that may contain an error while inspecting a file.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains an error.
pub type UnitResult = Result<()>;


/// An error that prevented producing the report for a file.
/// Either the file could not be accessed,
/// or its header bytes do not form a valid exr meta data section.
#[derive(Debug)]
pub enum Error {

    /// The contents of the file are contradicting or insufficient.
    Invalid(Cow<'static, str>),

    /// The underlying byte stream could not be read successfully,
    /// probably due to file system related errors.
    Io(IoError),
}

impl Error {

    /// Create an error of the variant `Invalid`.
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Invalid(message.into())
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::invalid("reference to missing bytes")
        }
        else {
            Error::Io(error)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(error) => write!(formatter, "io error: {}", error),
            Error::Invalid(message) => write!(formatter, "invalid exr file: {}", message),
        }
    }
}

/// Return `Ok(usize)` if the value is not negative, otherwise `Error::Invalid`.
pub(crate) fn i32_to_usize(value: i32, error_message: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::invalid(error_message))
}
