//! File descriptors: open, positional read/write, close.

use std::fs::{self, File};
use std::path::Path;

use crate::{Operation, SyscallError};

/// Flags for opening a file.
///
/// `direct` and `no_cache` are passed straight through to the kernel; this
/// layer does not check whether they make sense for the path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub truncate: bool,
    /// `O_DIRECT` on Linux, `FILE_FLAG_NO_BUFFERING` on Windows.
    pub direct: bool,
    /// `F_NOCACHE` on Darwin, applied right after open.
    pub no_cache: bool,
}

/// An open OS file descriptor (or Windows `HANDLE`).
///
/// Owned exclusively; not `Clone`. Dropping a descriptor closes it silently,
/// use [`close`] to observe the result.
#[derive(Debug)]
pub struct Descriptor {
    file: File,
}

impl Descriptor {
    /// Wraps an already-open file.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }

    pub fn as_file(&self) -> &File {
        &self.file
    }

    pub fn into_file(self) -> File {
        self.file
    }
}

/// Opens `path`, applying the platform Direct I/O flags requested in `options`.
///
/// Requesting `direct` on a host without a strict Direct I/O flag, or
/// `no_cache` on a host without `F_NOCACHE`, fails with the host's
/// not-supported code before anything is opened.
pub fn open(path: &Path, options: &OpenOptions) -> Result<Descriptor, SyscallError> {
    let mut std_options = fs::OpenOptions::new();
    std_options
        .read(options.read)
        .write(options.write)
        .create(options.create)
        .truncate(options.truncate);

    if options.direct {
        apply_direct_flag(&mut std_options)?;
    }
    if options.no_cache && !cfg!(any(target_os = "macos", target_os = "ios")) {
        return Err(SyscallError::unsupported(Operation::SetNoCache));
    }

    let file = std_options
        .open(path)
        .map_err(|e| SyscallError::from_io(&e, Operation::Open))?;

    if options.no_cache {
        set_no_cache(&file)?;
    }

    Ok(Descriptor { file })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn apply_direct_flag(options: &mut fs::OpenOptions) -> Result<(), SyscallError> {
    use std::os::unix::fs::OpenOptionsExt;
    options.custom_flags(libc::O_DIRECT);
    Ok(())
}

#[cfg(windows)]
fn apply_direct_flag(options: &mut fs::OpenOptions) -> Result<(), SyscallError> {
    use std::os::windows::fs::OpenOptionsExt;
    use windows_sys::Win32::Storage::FileSystem::FILE_FLAG_NO_BUFFERING;
    options.custom_flags(FILE_FLAG_NO_BUFFERING);
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android", windows)))]
fn apply_direct_flag(_options: &mut fs::OpenOptions) -> Result<(), SyscallError> {
    Err(SyscallError::unsupported(Operation::Open))
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
fn set_no_cache(file: &File) -> Result<(), SyscallError> {
    use std::os::unix::io::AsRawFd;

    #[allow(unsafe_code)]
    // SAFETY: the fd is owned by `file`, which outlives the call.
    let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1) };
    if rc == -1 {
        return Err(SyscallError::last(Operation::SetNoCache));
    }
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn set_no_cache(_file: &File) -> Result<(), SyscallError> {
    Err(SyscallError::unsupported(Operation::SetNoCache))
}

/// Reads into `buf` at `offset` without touching a shared file cursor.
///
/// Returns the number of bytes read; `0` means end of file.
///
/// On Windows the call is a `ReadFile` with an explicit offset, which also
/// moves the handle's cursor. Callers of this crate never rely on the cursor.
pub fn pread(descriptor: &Descriptor, buf: &mut [u8], offset: u64) -> Result<usize, SyscallError> {
    #[cfg(unix)]
    let result = {
        use std::os::unix::fs::FileExt;
        descriptor.file.read_at(buf, offset)
    };

    #[cfg(windows)]
    let result = {
        use std::os::windows::fs::FileExt;
        descriptor.file.seek_read(buf, offset)
    };

    result.map_err(|e| SyscallError::from_io(&e, Operation::Read))
}

/// Writes `buf` at `offset`. Returns the number of bytes written.
pub fn pwrite(descriptor: &Descriptor, buf: &[u8], offset: u64) -> Result<usize, SyscallError> {
    #[cfg(unix)]
    let result = {
        use std::os::unix::fs::FileExt;
        descriptor.file.write_at(buf, offset)
    };

    #[cfg(windows)]
    let result = {
        use std::os::windows::fs::FileExt;
        descriptor.file.seek_write(buf, offset)
    };

    result.map_err(|e| SyscallError::from_io(&e, Operation::Write))
}

/// Flushes file data (not necessarily metadata) to stable storage.
pub fn sync_data(descriptor: &Descriptor) -> Result<(), SyscallError> {
    descriptor
        .file
        .sync_data()
        .map_err(|e| SyscallError::from_io(&e, Operation::Sync))
}

/// Returns the current file size in bytes.
pub fn file_size(descriptor: &Descriptor) -> Result<u64, SyscallError> {
    descriptor
        .file
        .metadata()
        .map(|m| m.len())
        .map_err(|e| SyscallError::from_io(&e, Operation::Metadata))
}

/// Closes the descriptor and reports the kernel's verdict.
///
/// The descriptor is consumed either way: on every supported platform the
/// descriptor is released even when close reports an error.
#[cfg(unix)]
pub fn close(descriptor: Descriptor) -> Result<(), SyscallError> {
    use std::os::unix::io::IntoRawFd;

    let fd = descriptor.file.into_raw_fd();
    #[allow(unsafe_code)]
    // SAFETY: `into_raw_fd` transferred ownership of `fd` to us; it is closed
    // exactly once here.
    let rc = unsafe { libc::close(fd) };
    if rc == -1 {
        return Err(SyscallError::last(Operation::Close));
    }
    Ok(())
}

#[cfg(windows)]
pub fn close(descriptor: Descriptor) -> Result<(), SyscallError> {
    use std::os::windows::io::IntoRawHandle;
    use windows_sys::Win32::Foundation::CloseHandle;

    let handle = descriptor.file.into_raw_handle();
    #[allow(unsafe_code)]
    // SAFETY: `into_raw_handle` transferred ownership of `handle` to us; it is
    // closed exactly once here.
    let ok = unsafe { CloseHandle(handle) };
    if ok == 0 {
        return Err(SyscallError::last(Operation::Close));
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub fn close(descriptor: Descriptor) -> Result<(), SyscallError> {
    drop(descriptor);
    Ok(())
}
