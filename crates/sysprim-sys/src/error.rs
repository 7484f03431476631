//! Syscall error types.

use std::fmt;
use std::io;

use crate::Platform;

/// The kernel operation that produced a [`SyscallError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    Close,
    Read,
    Write,
    Sync,
    Metadata,
    /// `fcntl(F_NOCACHE)` after open.
    SetNoCache,
    Statfs,
    /// `GetVolumePathNameW`.
    VolumePath,
    /// `GetDiskFreeSpaceW`.
    DiskFreeSpace,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Read => "read",
            Self::Write => "write",
            Self::Sync => "sync",
            Self::Metadata => "metadata",
            Self::SetNoCache => "set_no_cache",
            Self::Statfs => "statfs",
            Self::VolumePath => "volume_path",
            Self::DiskFreeSpace => "disk_free_space",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed kernel call: the raw platform code (errno or `GetLastError`)
/// tagged with the operation that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed with platform code {code}")]
pub struct SyscallError {
    pub code: i32,
    pub operation: Operation,
}

impl SyscallError {
    pub fn new(code: i32, operation: Operation) -> Self {
        Self { code, operation }
    }

    /// Captures the calling thread's last OS error.
    pub fn last(operation: Operation) -> Self {
        Self::from_io(&io::Error::last_os_error(), operation)
    }

    /// Converts a `std` I/O error.
    ///
    /// Errors raised by `std` itself rather than the kernel carry no raw code.
    /// `InvalidInput` (e.g. a path with an interior NUL) maps to the host's
    /// invalid-parameter code and `Unsupported` to its not-supported code;
    /// anything else becomes `-1`.
    pub fn from_io(err: &io::Error, operation: Operation) -> Self {
        let host = Platform::current();
        let code = match err.raw_os_error() {
            Some(code) => code,
            None => match err.kind() {
                io::ErrorKind::InvalidInput => host.invalid_parameter_code(),
                io::ErrorKind::Unsupported => host.not_supported_code(),
                _ => -1,
            },
        };
        Self { code, operation }
    }

    /// Builds the host's "operation not supported" error for `operation`.
    pub fn unsupported(operation: Operation) -> Self {
        Self::new(Platform::current().not_supported_code(), operation)
    }
}

impl From<SyscallError> for io::Error {
    fn from(err: SyscallError) -> Self {
        io::Error::from_raw_os_error(err.code)
    }
}
