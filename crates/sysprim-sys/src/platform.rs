//! Host platform families and their fixed error codes.

use std::fmt;

/// The three Direct I/O models a host can follow.
///
/// Selected once at build time by [`Platform::current`], but passed around as
/// a plain value so callers (and tests) can evaluate decisions for any
/// platform from a single binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS / iOS: `F_NOCACHE` hint only, no alignment contract.
    Darwin,
    /// Linux (glibc or musl) and other Unix hosts: strict `O_DIRECT`,
    /// alignment not discoverable.
    Linux,
    /// Windows: strict `FILE_FLAG_NO_BUFFERING`, sector size discoverable.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Darwin
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub const ALL: [Self; 3] = [Self::Darwin, Self::Linux, Self::Windows];

    /// `EINVAL` / `ERROR_INVALID_PARAMETER`.
    pub const fn invalid_parameter_code(self) -> i32 {
        match self {
            Self::Darwin | Self::Linux => 22,
            Self::Windows => 87,
        }
    }

    /// `EBADF` / `ERROR_INVALID_HANDLE`.
    pub const fn invalid_handle_code(self) -> i32 {
        match self {
            Self::Darwin | Self::Linux => 9,
            Self::Windows => 6,
        }
    }

    /// `ENOTSUP` (`EOPNOTSUPP` on Linux) / `ERROR_NOT_SUPPORTED`.
    pub const fn not_supported_code(self) -> i32 {
        match self {
            Self::Darwin => 45,
            Self::Linux => 95,
            Self::Windows => 50,
        }
    }

    /// Every code this platform uses to say "operation not supported".
    pub fn not_supported_codes(self) -> &'static [i32] {
        match self {
            // ENOTSUP, EOPNOTSUPP
            Self::Darwin => &[45, 102],
            Self::Linux => &[95],
            Self::Windows => &[50],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
