//! Direct I/O error types and syscall error classification.

use sysprim_sys::{Operation, Platform, SyscallError};

use crate::Resolved;

/// Errors from mode negotiation and from I/O on a [`Handle`](crate::Handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DirectError {
    /// The requested mode cannot be satisfied for this platform, path and
    /// requirements.
    #[error("requested I/O mode is not supported here")]
    NotSupported,

    /// Buffer start address is not a multiple of the buffer alignment.
    #[error("buffer address {address:#x} is not aligned to {required} bytes")]
    MisalignedBuffer { address: usize, required: usize },

    /// File offset is not a multiple of the offset alignment.
    #[error("file offset {offset} is not aligned to {required} bytes")]
    MisalignedOffset { offset: u64, required: usize },

    /// Transfer length is not a multiple of the length requirement.
    #[error("transfer length {length} is not a multiple of {required_multiple} bytes")]
    InvalidLength {
        length: usize,
        required_multiple: usize,
    },

    /// The kernel rejected a Direct I/O transfer that passed pre-validation.
    #[error("kernel rejected direct {operation} as misaligned")]
    AlignmentViolation { operation: Operation },

    /// Attempted to change the resolved mode of an open handle.
    #[error("resolved I/O mode cannot change after open")]
    ModeChange,

    /// The handle is closed or the descriptor is not valid.
    #[error("invalid or closed file handle")]
    InvalidHandle,

    /// Any platform error without a semantic classification.
    #[error("{operation} failed with platform code {code}")]
    Platform { code: i32, operation: Operation },
}

/// A classifier inspects a syscall failure and claims it if it recognises it.
type Classifier = fn(&SyscallError, Resolved, Platform) -> Option<DirectError>;

/// Tried in order; the first match wins.
const CLASSIFIERS: &[Classifier] = &[
    classify_alignment_violation,
    classify_direct_open_rejected,
    classify_invalid_handle,
    classify_not_supported,
];

impl DirectError {
    /// Translates a raw syscall failure, given the handle's resolved mode and
    /// the platform whose codes `err` uses.
    ///
    /// Every code maps to something: unrecognised codes become
    /// [`DirectError::Platform`].
    pub fn from_syscall(err: SyscallError, resolved: Resolved, platform: Platform) -> Self {
        CLASSIFIERS
            .iter()
            .find_map(|classify| classify(&err, resolved, platform))
            .unwrap_or(Self::Platform {
                code: err.code,
                operation: err.operation,
            })
    }

    /// True for errors caught before any syscall was issued.
    pub fn is_pre_validation(&self) -> bool {
        matches!(
            self,
            Self::MisalignedBuffer { .. } | Self::MisalignedOffset { .. } | Self::InvalidLength { .. }
        )
    }
}

/// `EINVAL` from a direct read/write means the kernel's alignment rules are
/// stricter than what pre-validation knew about.
fn classify_alignment_violation(
    err: &SyscallError,
    resolved: Resolved,
    platform: Platform,
) -> Option<DirectError> {
    let transfer = matches!(err.operation, Operation::Read | Operation::Write);
    (resolved == Resolved::Direct && transfer && err.code == platform.invalid_parameter_code())
        .then_some(DirectError::AlignmentViolation {
            operation: err.operation,
        })
}

/// Filesystems without Direct I/O support (tmpfs, some FUSE mounts) reject
/// `O_DIRECT` at open time with `EINVAL`.
fn classify_direct_open_rejected(
    err: &SyscallError,
    resolved: Resolved,
    platform: Platform,
) -> Option<DirectError> {
    (resolved == Resolved::Direct
        && err.operation == Operation::Open
        && err.code == platform.invalid_parameter_code())
    .then_some(DirectError::NotSupported)
}

fn classify_invalid_handle(
    err: &SyscallError,
    _resolved: Resolved,
    platform: Platform,
) -> Option<DirectError> {
    (err.code == platform.invalid_handle_code()).then_some(DirectError::InvalidHandle)
}

fn classify_not_supported(
    err: &SyscallError,
    _resolved: Resolved,
    platform: Platform,
) -> Option<DirectError> {
    platform
        .not_supported_codes()
        .contains(&err.code)
        .then_some(DirectError::NotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sys(code: i32, operation: Operation) -> SyscallError {
        SyscallError::new(code, operation)
    }

    #[test_case(Platform::Linux, 22 ; "linux einval")]
    #[test_case(Platform::Darwin, 22 ; "darwin einval")]
    #[test_case(Platform::Windows, 87 ; "windows invalid parameter")]
    fn einval_on_direct_transfer_is_alignment_violation(platform: Platform, code: i32) {
        for operation in [Operation::Read, Operation::Write] {
            assert_eq!(
                DirectError::from_syscall(sys(code, operation), Resolved::Direct, platform),
                DirectError::AlignmentViolation { operation }
            );
        }
    }

    #[test_case(Resolved::Buffered ; "buffered")]
    #[test_case(Resolved::Uncached ; "uncached")]
    fn einval_outside_direct_stays_opaque(resolved: Resolved) {
        assert_eq!(
            DirectError::from_syscall(sys(22, Operation::Read), resolved, Platform::Linux),
            DirectError::Platform {
                code: 22,
                operation: Operation::Read
            }
        );
    }

    #[test]
    fn einval_on_direct_open_is_not_supported() {
        assert_eq!(
            DirectError::from_syscall(sys(22, Operation::Open), Resolved::Direct, Platform::Linux),
            DirectError::NotSupported
        );
    }

    #[test]
    fn einval_on_direct_sync_stays_opaque() {
        assert_eq!(
            DirectError::from_syscall(sys(22, Operation::Sync), Resolved::Direct, Platform::Linux),
            DirectError::Platform {
                code: 22,
                operation: Operation::Sync
            }
        );
    }

    #[test_case(Platform::Linux, 9 ; "linux ebadf")]
    #[test_case(Platform::Windows, 6 ; "windows invalid handle")]
    fn bad_descriptor_is_invalid_handle(platform: Platform, code: i32) {
        assert_eq!(
            DirectError::from_syscall(sys(code, Operation::Write), Resolved::Buffered, platform),
            DirectError::InvalidHandle
        );
    }

    #[test_case(Platform::Linux, 95 ; "linux eopnotsupp")]
    #[test_case(Platform::Darwin, 45 ; "darwin enotsup")]
    #[test_case(Platform::Darwin, 102 ; "darwin eopnotsupp")]
    #[test_case(Platform::Windows, 50 ; "windows not supported")]
    fn not_supported_codes_are_classified(platform: Platform, code: i32) {
        assert_eq!(
            DirectError::from_syscall(sys(code, Operation::Open), Resolved::Buffered, platform),
            DirectError::NotSupported
        );
    }

    #[test]
    fn codes_are_read_in_the_given_platform() {
        // 87 is ERROR_INVALID_PARAMETER on Windows but means nothing special on Linux.
        assert_eq!(
            DirectError::from_syscall(sys(87, Operation::Read), Resolved::Direct, Platform::Linux),
            DirectError::Platform {
                code: 87,
                operation: Operation::Read
            }
        );
    }

    #[test]
    fn unmapped_code_falls_through_to_platform() {
        assert_eq!(
            DirectError::from_syscall(sys(28, Operation::Write), Resolved::Direct, Platform::Linux),
            DirectError::Platform {
                code: 28,
                operation: Operation::Write
            }
        );
    }

    #[test]
    fn pre_validation_errors_are_flagged() {
        assert!(
            DirectError::InvalidLength {
                length: 1,
                required_multiple: 512
            }
            .is_pre_validation()
        );
        assert!(
            !DirectError::AlignmentViolation {
                operation: Operation::Read
            }
            .is_pre_validation()
        );
    }
}
