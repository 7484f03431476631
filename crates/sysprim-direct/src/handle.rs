//! File handle that enforces its resolved caching mode.

use sysprim_sys::{Descriptor, Platform};

use crate::{Alignment, DirectError, Requirements, Resolved};

/// An open file bound to a resolved caching mode.
///
/// Owns its descriptor exclusively. The resolved mode and requirements are
/// fixed at construction; when the mode is [`Resolved::Direct`] every
/// transfer is checked against the known [`Alignment`] before the syscall is
/// issued.
///
/// Reads and writes are positional and take `&self`, so one handle can serve
/// several threads transferring disjoint ranges. [`close`](Self::close) takes
/// `&mut self` and therefore cannot race them.
#[derive(Debug)]
pub struct Handle {
    /// `None` once closed.
    descriptor: Option<Descriptor>,
    resolved: Resolved,
    requirements: Requirements,
    /// Whose error codes the descriptor's syscalls return.
    platform: Platform,
}

impl Handle {
    /// Wraps a descriptor opened with flags matching `resolved`.
    ///
    /// The caller must have opened `descriptor` with the platform flags for
    /// `resolved` (see [`Opener`](crate::Opener)). Fails with
    /// [`DirectError::NotSupported`] if `resolved` is `Direct` but the
    /// requirements are unknown; the descriptor is then closed.
    pub fn new(
        descriptor: Descriptor,
        resolved: Resolved,
        requirements: Requirements,
    ) -> Result<Self, DirectError> {
        if resolved == Resolved::Direct && !requirements.is_known() {
            return Err(DirectError::NotSupported);
        }
        Ok(Self {
            descriptor: Some(descriptor),
            resolved,
            requirements,
            platform: Platform::current(),
        })
    }

    pub fn resolved(&self) -> Resolved {
        self.resolved
    }

    pub fn requirements(&self) -> Requirements {
        self.requirements
    }

    /// The alignment transfers must satisfy, if any.
    pub fn alignment(&self) -> Option<Alignment> {
        if self.resolved.requires_alignment() {
            self.requirements.alignment()
        } else {
            None
        }
    }

    pub fn is_closed(&self) -> bool {
        self.descriptor.is_none()
    }

    /// Reads into `buf` at `offset`. Returns bytes read; `0` means end of file.
    ///
    /// An empty `buf` returns `Ok(0)` without a syscall once the offset has
    /// been checked.
    pub fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize, DirectError> {
        let descriptor = self.descriptor()?;
        if buf.is_empty() {
            return self.check_offset(offset).map(|()| 0);
        }
        self.check_transfer(buf.as_ptr() as usize, offset, buf.len())?;
        sysprim_sys::pread(descriptor, buf, offset).map_err(|e| self.translate(e))
    }

    /// Writes `buf` at `offset`. Returns bytes written.
    ///
    /// An empty `buf` returns `Ok(0)` without a syscall once the offset has
    /// been checked.
    pub fn write(&self, buf: &[u8], offset: u64) -> Result<usize, DirectError> {
        let descriptor = self.descriptor()?;
        if buf.is_empty() {
            return self.check_offset(offset).map(|()| 0);
        }
        self.check_transfer(buf.as_ptr() as usize, offset, buf.len())?;
        sysprim_sys::pwrite(descriptor, buf, offset).map_err(|e| self.translate(e))
    }

    pub fn sync_data(&self) -> Result<(), DirectError> {
        sysprim_sys::sync_data(self.descriptor()?).map_err(|e| self.translate(e))
    }

    /// Current file size in bytes.
    pub fn file_size(&self) -> Result<u64, DirectError> {
        sysprim_sys::file_size(self.descriptor()?).map_err(|e| self.translate(e))
    }

    /// Asks for `resolved` as the handle's mode.
    ///
    /// The resolved mode is fixed at open: this succeeds only when `resolved`
    /// is already the handle's mode and fails with
    /// [`DirectError::ModeChange`] otherwise. Reopen to change modes.
    pub fn set_mode(&mut self, resolved: Resolved) -> Result<(), DirectError> {
        self.descriptor()?;
        if resolved != self.resolved {
            return Err(DirectError::ModeChange);
        }
        Ok(())
    }

    /// Closes the descriptor.
    ///
    /// The first call closes and reports the kernel's result. The handle is
    /// closed afterwards whatever that result was; later calls return
    /// `Ok(())` without doing anything.
    pub fn close(&mut self) -> Result<(), DirectError> {
        match self.descriptor.take() {
            Some(descriptor) => sysprim_sys::close(descriptor).map_err(|e| self.translate(e)),
            None => Ok(()),
        }
    }

    fn descriptor(&self) -> Result<&Descriptor, DirectError> {
        self.descriptor.as_ref().ok_or(DirectError::InvalidHandle)
    }

    /// An empty slice has no meaningful address, so only the offset is
    /// checked for it.
    fn check_offset(&self, offset: u64) -> Result<(), DirectError> {
        match self.alignment() {
            Some(alignment) if !alignment.is_offset_aligned(offset) => {
                Err(DirectError::MisalignedOffset {
                    offset,
                    required: alignment.offset(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_transfer(&self, address: usize, offset: u64, length: usize) -> Result<(), DirectError> {
        match self.alignment() {
            Some(alignment) => alignment.validate(address, offset, length),
            None => Ok(()),
        }
    }

    fn translate(&self, err: sysprim_sys::SyscallError) -> DirectError {
        DirectError::from_syscall(err, self.resolved, self.platform)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Some(descriptor) = self.descriptor.take()
            && let Err(e) = sysprim_sys::close(descriptor)
        {
            tracing::error!(error = %e, mode = %self.resolved, "failed to close handle during drop");
        }
    }
}
