//! Filesystem and volume probes.

use std::path::Path;

use crate::{Operation, SyscallError};

/// The subset of `struct statfs` the Direct I/O layer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    /// Filesystem type magic (`f_type`), truncated to 32 bits.
    pub magic: u64,
    /// Optimal transfer block size (`f_bsize`). Not an alignment requirement.
    pub block_size: u64,
}

/// Volume geometry reported by `GetDiskFreeSpaceW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskGeometry {
    pub bytes_per_sector: u32,
    pub sectors_per_cluster: u32,
}

/// Queries `statfs(2)` for the filesystem containing `path`.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn statfs(path: &Path) -> Result<FsStat, SyscallError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| SyscallError::new(libc::EINVAL, Operation::Statfs))?;

    #[allow(unsafe_code)]
    // SAFETY: `libc::statfs` is plain old data; all-zero is a valid value.
    let mut buf: libc::statfs = unsafe { std::mem::zeroed() };

    #[allow(unsafe_code)]
    // SAFETY: `c_path` is NUL-terminated and `buf` is valid for writes.
    let rc = unsafe { libc::statfs(c_path.as_ptr(), &raw mut buf) };
    if rc != 0 {
        return Err(SyscallError::last(Operation::Statfs));
    }

    // f_type is signed on some targets; magics are 32-bit values.
    Ok(FsStat {
        magic: (buf.f_type as u64) & 0xFFFF_FFFF,
        block_size: buf.f_bsize as u64,
    })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn statfs(_path: &Path) -> Result<FsStat, SyscallError> {
    Err(SyscallError::unsupported(Operation::Statfs))
}

/// Queries the sector geometry of the volume containing `path`.
///
/// `GetDiskFreeSpaceW` only accepts volume roots, so the root is looked up
/// first with `GetVolumePathNameW`.
#[cfg(windows)]
pub fn disk_free_space(path: &Path) -> Result<DiskGeometry, SyscallError> {
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{GetDiskFreeSpaceW, GetVolumePathNameW};

    const MAX_PATH: usize = 260;

    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();
    let mut root = vec![0u16; wide.len().max(MAX_PATH + 1)];

    #[allow(unsafe_code)]
    // SAFETY: `wide` is NUL-terminated; `root` is writable for `root.len()`
    // UTF-16 units.
    let ok = unsafe { GetVolumePathNameW(wide.as_ptr(), root.as_mut_ptr(), root.len() as u32) };
    if ok == 0 {
        return Err(SyscallError::last(Operation::VolumePath));
    }

    let mut sectors_per_cluster = 0u32;
    let mut bytes_per_sector = 0u32;
    let mut free_clusters = 0u32;
    let mut total_clusters = 0u32;

    #[allow(unsafe_code)]
    // SAFETY: `root` was NUL-terminated by GetVolumePathNameW; all out
    // pointers reference live locals.
    let ok = unsafe {
        GetDiskFreeSpaceW(
            root.as_ptr(),
            &mut sectors_per_cluster,
            &mut bytes_per_sector,
            &mut free_clusters,
            &mut total_clusters,
        )
    };
    if ok == 0 {
        return Err(SyscallError::last(Operation::DiskFreeSpace));
    }

    Ok(DiskGeometry {
        bytes_per_sector,
        sectors_per_cluster,
    })
}

#[cfg(not(windows))]
pub fn disk_free_space(_path: &Path) -> Result<DiskGeometry, SyscallError> {
    Err(SyscallError::unsupported(Operation::DiskFreeSpace))
}
