//! Error types for scheduler calls and session handling.
use core::num::NonZeroI32;

/// A return value from a scheduler API call.
///
/// Can be converted to a `Result` to check for success or an error.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RetVal(i32);

impl RetVal {
    /// A successful return value.
    pub const SUCCESS: RetVal = RetVal(0);

    /// Create a new `RetVal` from an integer.
    pub const fn new(n: i32) -> Self {
        RetVal(n)
    }

    /// Convert the `RetVal` to a `Result`.
    ///
    /// Non-negative values are considered success, and are returned as `Ok(value)`.
    /// Negative values are considered errors, and are returned as `Err(Error)`.
    pub const fn to_result(self) -> Result<u32, Error> {
        match NonZeroI32::new(self.0) {
            Some(err) if self.0 < 0 => Err(Error(err)),
            _ => Ok(self.0 as u32),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RetVal {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::Format::format(&self.to_result(), fmt)
    }
}

impl core::fmt::Debug for RetVal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.to_result(), f)
    }
}

impl From<i32> for RetVal {
    fn from(value: i32) -> Self {
        RetVal(value)
    }
}

impl From<RetVal> for i32 {
    fn from(value: RetVal) -> Self {
        value.0
    }
}

/// An error returned by the scheduler.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Error(NonZeroI32);

impl Error {
    const fn from_errno(errno: u32) -> Error {
        match NonZeroI32::new(-(errno as i32)) {
            Some(n) => Error(n),
            None => ::core::panic!("errno must be non-zero"),
        }
    }

    /// Convert an `Error` to a `RetVal`.
    pub const fn to_retval(self) -> RetVal {
        RetVal(self.0.get())
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl core::error::Error for Error {}

impl From<Error> for i32 {
    fn from(value: Error) -> Self {
        value.0.get()
    }
}

macro_rules! errnos {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $name:expr, $errno:expr);
        )+
    ) => {
        impl Error {
        $(
            $(#[$docs])*
            pub const $konst: Error = Error::from_errno($errno);
        )+
        }

        impl RetVal {
        $(
            $(#[$docs])*
            pub const $konst: RetVal = Error::$konst.to_retval();
        )+
        }

        #[cfg(feature = "defmt")]
        impl defmt::Format for Error {
            fn format(&self, fmt: defmt::Formatter) {
                match *self {
                    $(
                    Self::$konst => defmt::write!(fmt, $name),
                    )+
                    _ => defmt::write!(fmt, "Unknown errno: {}", self.0),
                }
            }
        }

        impl core::fmt::Debug for Error {
            fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    $(
                    Self::$konst => core::write!(fmt, $name),
                    )+
                    _ => core::write!(fmt, "Unknown errno: {}", self.0),
                }
            }
        }
    }
}

// Numbering follows nrf_errno.h, which the timeslot API returns negated.
errnos! {
    /// Operation not permitted.
    (EPERM, "EPERM", 1);
    /// No such file or directory.
    (ENOENT, "ENOENT", 2);
    /// I/O error.
    (EIO, "EIO", 5);
    /// Try again.
    (EAGAIN, "EAGAIN", 11);
    /// Out of memory.
    (ENOMEM, "ENOMEM", 12);
    /// Permission denied.
    (EACCES, "EACCES", 13);
    /// Bad address.
    (EFAULT, "EFAULT", 14);
    /// Device or resource busy.
    (EBUSY, "EBUSY", 16);
    /// Invalid argument.
    (EINVAL, "EINVAL", 22);
    /// No message of desired type.
    (ENOMSG, "ENOMSG", 42);
    /// Connection timed out.
    (ETIMEDOUT, "ETIMEDOUT", 110);
    /// Operation Canceled.
    (ECANCELED, "ECANCELED", 125);
}

/// Error from handling a [`SessionRequest`](crate::SessionRequest).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// The scheduler rejected the call.
    Api(Error),
    /// `OpenSession` while a session is already open.
    AlreadyOpen,
    /// `MakeRequest` or `CloseSession` without an open session.
    NotOpen,
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "scheduler error: {}", err),
            Self::AlreadyOpen => f.write_str("session already open"),
            Self::NotOpen => f.write_str("no open session"),
        }
    }
}

impl core::error::Error for SessionError {}

impl From<Error> for SessionError {
    fn from(e: Error) -> Self {
        Self::Api(e)
    }
}

/// The signal probe outputs could not be configured.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeError;

impl core::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("probe initialization failed")
    }
}

impl core::error::Error for ProbeError {}
