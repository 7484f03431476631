//! # sysprim-sys: raw file syscall wrappers
//!
//! Thin, policy-free wrappers over the handful of kernel calls the Direct I/O
//! layer builds on. Every wrapper forwards to exactly one OS call (or the
//! `std` equivalent) and captures failure as a [`SyscallError`]: the raw
//! platform code plus the [`Operation`] that produced it.
//!
//! | Wrapper | POSIX | Windows |
//! |---|---|---|
//! | [`open`] | `open(2)` (+ `O_DIRECT`, `F_NOCACHE`) | `CreateFileW` (+ `FILE_FLAG_NO_BUFFERING`) |
//! | [`pread`] / [`pwrite`] | `pread(2)` / `pwrite(2)` | `ReadFile` / `WriteFile` with offset |
//! | [`close`] | `close(2)` | `CloseHandle` |
//! | [`statfs`] | `statfs(2)` (Linux only) | n/a |
//! | [`disk_free_space`] | n/a | `GetVolumePathNameW` + `GetDiskFreeSpaceW` |
//!
//! Nothing in this crate decides *whether* a flag should be set. That
//! decision belongs to the mode resolver in `sysprim-direct`.

mod descriptor;
mod error;
mod platform;
mod probe;

pub use descriptor::{Descriptor, OpenOptions, close, file_size, open, pread, pwrite, sync_data};
pub use error::{Operation, SyscallError};
pub use platform::Platform;
pub use probe::{DiskGeometry, FsStat, disk_free_space, statfs};
