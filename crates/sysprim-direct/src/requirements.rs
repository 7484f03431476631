//! Discovery of Direct I/O alignment requirements.

use std::fmt;
use std::path::Path;

use sysprim_sys::Platform;

use crate::{Alignment, FilesystemProbe};

/// Why a path's alignment requirements are not known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnknownReason {
    /// The platform has no strict Direct I/O, so there is nothing to discover.
    PlatformUnsupported,
    /// Direct I/O exists but its alignment could not be determined reliably.
    SectorSizeUndetermined,
}

/// The alignment constraints for Direct I/O on a path, or the lack of them.
///
/// Uncertainty is a value, not an error: discovery never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirements {
    Known(Alignment),
    Unknown(UnknownReason),
}

impl Requirements {
    /// Discovers the requirements for `path` on `platform`.
    ///
    /// - macOS: always `Unknown(PlatformUnsupported)`.
    /// - Linux: always `Unknown(SectorSizeUndetermined)`. No API reports the
    ///   alignment `O_DIRECT` will enforce; `statfs`'s block size is the
    ///   optimal transfer size, not a correctness bound, and the kernel only
    ///   says `EINVAL` at I/O time. Guessing risks silent misbehaviour, so
    ///   discovery fails closed. Supply [`Requirements::Known`] explicitly to
    ///   use Direct I/O on Linux.
    /// - Windows: the volume's sector size, when the query succeeds.
    pub fn discover(path: &Path, platform: Platform, probe: &dyn FilesystemProbe) -> Self {
        match platform {
            Platform::Darwin => Self::Unknown(UnknownReason::PlatformUnsupported),
            Platform::Linux => Self::Unknown(UnknownReason::SectorSizeUndetermined),
            Platform::Windows => match probe.sector_size(path) {
                Ok(sector_size) => match Alignment::uniform(sector_size as usize) {
                    Ok(alignment) => {
                        tracing::debug!(path = %path.display(), %alignment, "discovered sector size");
                        Self::Known(alignment)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "unusable sector size");
                        Self::Unknown(UnknownReason::SectorSizeUndetermined)
                    }
                },
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "sector size query failed");
                    Self::Unknown(UnknownReason::SectorSizeUndetermined)
                }
            },
        }
    }

    pub fn alignment(&self) -> Option<Alignment> {
        match self {
            Self::Known(alignment) => Some(*alignment),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl From<Alignment> for Requirements {
    fn from(alignment: Alignment) -> Self {
        Self::Known(alignment)
    }
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlatformUnsupported => "platform unsupported",
            Self::SectorSizeUndetermined => "sector size undetermined",
        })
    }
}

impl fmt::Display for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(alignment) => write!(f, "known ({alignment})"),
            Self::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}
