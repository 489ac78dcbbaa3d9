use core::fmt;

/// Longest accepted event name, in UTF-16 code units.
pub const MAX_NAME_LEN: usize = 260;

/// Windows system error code reported by a failed platform call.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlatformErrorCode(u32);
impl PlatformErrorCode {
    pub const FILE_NOT_FOUND: Self = Self(2);
    pub const ACCESS_DENIED: Self = Self(5);
    pub const INVALID_HANDLE: Self = Self(6);
    pub const INVALID_PARAMETER: Self = Self(87);
    pub const INVALID_NAME: Self = Self(123);
    pub const ALREADY_EXISTS: Self = Self(183);
    pub const NO_SYSTEM_RESOURCES: Self = Self(1450);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn symbolic_name(self) -> Option<&'static str> {
        match self.0 {
            2 => Some("ERROR_FILE_NOT_FOUND"),
            5 => Some("ERROR_ACCESS_DENIED"),
            6 => Some("ERROR_INVALID_HANDLE"),
            87 => Some("ERROR_INVALID_PARAMETER"),
            123 => Some("ERROR_INVALID_NAME"),
            183 => Some("ERROR_ALREADY_EXISTS"),
            1450 => Some("ERROR_NO_SYSTEM_RESOURCES"),
            _ => None,
        }
    }
}
impl fmt::Display for PlatformErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbolic_name() {
            Some(n) => write!(f, "{n} ({})", self.0),
            // HRESULTs that do not wrap a win32 code
            None if self.0 > 0xFFFF => write!(f, "0x{:08X}", self.0),
            None => write!(f, "system error {}", self.0),
        }
    }
}

/// Reasons a name is rejected before any platform call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidName {
    #[error("name is empty")]
    Empty,
    #[error("name contains a NUL character at byte {0}")]
    InteriorNul(usize),
    #[error("name is {0} UTF-16 units long (max {MAX_NAME_LEN})")]
    TooLong(usize),
}

/// The platform call behind a failed [`Error::OperationFailed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Set,
    Reset,
    Query,
}
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Set => "SetEvent",
            Self::Reset => "ResetEvent",
            Self::Query => "WaitForSingleObject",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid event name: {0}")]
    InvalidArgument(#[from] InvalidName),
    #[error("CreateEvent failed: {0}")]
    CreationFailed(PlatformErrorCode),
    #[error("OpenEvent failed: {0}")]
    NotFound(PlatformErrorCode),
    #[error("{op} failed: {code}")]
    OperationFailed {
        op: Operation,
        code: PlatformErrorCode,
    },
}
impl Error {
    /// The platform error code carried by this error, if it came from a platform call.
    pub const fn code(&self) -> Option<PlatformErrorCode> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::CreationFailed(code) | Self::NotFound(code) => Some(*code),
            Self::OperationFailed { code, .. } => Some(*code),
        }
    }
}
