use std::fmt;

/// Outcome of a boundary call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidHandle,
    InvalidValue,
    InvalidSize,
    MemoryError,
    InternalError,
    NotSupported,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Success,
        Status::InvalidHandle,
        Status::InvalidValue,
        Status::InvalidSize,
        Status::MemoryError,
        Status::InternalError,
        Status::NotSupported,
    ];

    pub fn code(self) -> u32 {
        match self {
            Status::Success => 0,
            Status::InvalidHandle => 1,
            Status::InvalidValue => 2,
            Status::InvalidSize => 3,
            Status::MemoryError => 4,
            Status::InternalError => 5,
            Status::NotSupported => 6,
        }
    }

    pub fn from_code(code: u32) -> Option<Status> {
        Status::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// `Success` becomes `Ok(())`, any other status is carried in `Err`.
    pub fn into_result(self) -> Result<(), Status> {
        match self {
            Status::Success => Ok(()),
            failure => Err(failure),
        }
    }

    /// Collapses a `?`-style result back into a single status.
    pub fn from_result(result: Result<(), Status>) -> Status {
        match result {
            Ok(()) => Status::Success,
            Err(status) => status,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::InvalidHandle => "invalid handle",
            Status::InvalidValue => "invalid value",
            Status::InvalidSize => "invalid size",
            Status::MemoryError => "memory error",
            Status::InternalError => "internal error",
            Status::NotSupported => "not supported",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}
