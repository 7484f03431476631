//! Filesystem probing seam.
//!
//! [`FilesystemProbe`] abstracts the two kernel queries discovery relies on so
//! that platform decisions can be tested with fakes. [`SystemProbe`] forwards
//! to `sysprim-sys`.

use std::fmt;
use std::path::Path;

use sysprim_sys::{FsStat, Platform, SyscallError};

/// Source of filesystem facts for requirement and capability discovery.
pub trait FilesystemProbe: Send + Sync {
    /// `statfs(2)` for the filesystem containing `path` (Linux).
    fn filesystem_stat(&self, path: &Path) -> Result<FsStat, SyscallError>;

    /// Bytes per sector of the volume containing `path` (Windows).
    fn sector_size(&self, path: &Path) -> Result<u32, SyscallError>;
}

impl<P: FilesystemProbe + ?Sized> FilesystemProbe for &P {
    fn filesystem_stat(&self, path: &Path) -> Result<FsStat, SyscallError> {
        (**self).filesystem_stat(path)
    }

    fn sector_size(&self, path: &Path) -> Result<u32, SyscallError> {
        (**self).sector_size(path)
    }
}

/// Probes the real host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl FilesystemProbe for SystemProbe {
    fn filesystem_stat(&self, path: &Path) -> Result<FsStat, SyscallError> {
        sysprim_sys::statfs(path)
    }

    fn sector_size(&self, path: &Path) -> Result<u32, SyscallError> {
        sysprim_sys::disk_free_space(path).map(|g| g.bytes_per_sector)
    }
}

/// Linux filesystem families identified by their `statfs` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilesystemKind {
    Nfs,
    Cifs,
    Smb,
    Smb2,
    Tmpfs,
    Other(u64),
}

impl FilesystemKind {
    const NFS_SUPER_MAGIC: u64 = 0x6969;
    const CIFS_MAGIC_NUMBER: u64 = 0xFF53_4D42;
    const SMB_SUPER_MAGIC: u64 = 0x517B;
    const SMB2_MAGIC_NUMBER: u64 = 0xFE53_4D42;
    const TMPFS_MAGIC: u64 = 0x0102_1994;

    pub fn from_magic(magic: u64) -> Self {
        match magic {
            Self::NFS_SUPER_MAGIC => Self::Nfs,
            Self::CIFS_MAGIC_NUMBER => Self::Cifs,
            Self::SMB_SUPER_MAGIC => Self::Smb,
            Self::SMB2_MAGIC_NUMBER => Self::Smb2,
            Self::TMPFS_MAGIC => Self::Tmpfs,
            other => Self::Other(other),
        }
    }

    /// Classifies the filesystem holding `path`.
    ///
    /// Only Linux consults the probe (one `statfs`); elsewhere, and when the
    /// query fails, the kind is unknown.
    pub fn detect(path: &Path, platform: Platform, probe: &dyn FilesystemProbe) -> Option<Self> {
        match platform {
            Platform::Linux => match probe.filesystem_stat(path) {
                Ok(stat) => Some(Self::from_magic(stat.magic)),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "statfs failed");
                    None
                }
            },
            Platform::Darwin | Platform::Windows => None,
        }
    }

    /// Filesystems known to reject or mishandle `O_DIRECT`.
    pub fn rejects_direct_io(self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for FilesystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nfs => f.write_str("nfs"),
            Self::Cifs => f.write_str("cifs"),
            Self::Smb => f.write_str("smb"),
            Self::Smb2 => f.write_str("smb2"),
            Self::Tmpfs => f.write_str("tmpfs"),
            Self::Other(magic) => write!(f, "other ({magic:#x})"),
        }
    }
}
