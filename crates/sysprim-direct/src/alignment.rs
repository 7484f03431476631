//! Alignment constraints for Direct I/O transfers.

use std::fmt;

use crate::DirectError;

/// A value passed to [`Alignment::new`] was zero or not a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("alignment {value} is not a non-zero power of two")]
pub struct InvalidAlignment {
    pub value: usize,
}

/// The three constraints a Direct I/O transfer must satisfy.
///
/// Every field is a non-zero power of two, checked at construction, so the
/// checks in [`validate`](Self::validate) can mask with `align - 1` instead of
/// dividing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alignment {
    buffer: usize,
    offset: usize,
    length: usize,
}

impl Alignment {
    /// Legacy 512-byte sectors.
    pub const SECTOR_512: Self = Self {
        buffer: 512,
        offset: 512,
        length: 512,
    };

    /// 4 KiB: advanced-format sectors and the common page size.
    pub const PAGE_4096: Self = Self {
        buffer: 4096,
        offset: 4096,
        length: 4096,
    };

    /// Creates an alignment with distinct buffer, offset and length
    /// requirements.
    pub fn new(buffer: usize, offset: usize, length: usize) -> Result<Self, InvalidAlignment> {
        for value in [buffer, offset, length] {
            if !value.is_power_of_two() {
                return Err(InvalidAlignment { value });
            }
        }
        Ok(Self {
            buffer,
            offset,
            length,
        })
    }

    /// Creates an alignment where all three requirements are `bytes`.
    pub fn uniform(bytes: usize) -> Result<Self, InvalidAlignment> {
        Self::new(bytes, bytes, bytes)
    }

    /// Required alignment of the buffer's start address.
    pub fn buffer(&self) -> usize {
        self.buffer
    }

    /// Required alignment of the file offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Required multiple for the transfer length.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_uniform(&self) -> bool {
        self.buffer == self.offset && self.offset == self.length
    }

    pub fn is_address_aligned(&self, address: usize) -> bool {
        address & (self.buffer - 1) == 0
    }

    pub fn is_offset_aligned(&self, offset: u64) -> bool {
        offset & (self.offset as u64 - 1) == 0
    }

    pub fn is_length_aligned(&self, length: usize) -> bool {
        length & (self.length - 1) == 0
    }

    /// Rounds `length` up to the next multiple of the length requirement.
    ///
    /// `None` if the rounded length does not fit in `usize`.
    pub fn round_up_length(&self, length: usize) -> Option<usize> {
        length.checked_next_multiple_of(self.length)
    }

    /// Checks a transfer against this alignment.
    ///
    /// The buffer address is checked first, then the file offset, then the
    /// length; only the first violation is reported.
    pub fn validate(&self, address: usize, offset: u64, length: usize) -> Result<(), DirectError> {
        if !self.is_address_aligned(address) {
            return Err(DirectError::MisalignedBuffer {
                address,
                required: self.buffer,
            });
        }
        if !self.is_offset_aligned(offset) {
            return Err(DirectError::MisalignedOffset {
                offset,
                required: self.offset,
            });
        }
        if !self.is_length_aligned(length) {
            return Err(DirectError::InvalidLength {
                length,
                required_multiple: self.length,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            write!(f, "{} bytes", self.buffer)
        } else {
            write!(
                f,
                "buffer {} / offset {} / length {} bytes",
                self.buffer, self.offset, self.length
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(0 ; "zero")]
    #[test_case(3 ; "three")]
    #[test_case(4095 ; "one below page")]
    #[test_case(4097 ; "one above page")]
    fn rejects_non_power_of_two(value: usize) {
        assert_eq!(Alignment::uniform(value), Err(InvalidAlignment { value }));
    }

    #[test]
    fn reports_first_bad_component() {
        let err = Alignment::new(512, 1000, 0).unwrap_err();
        assert_eq!(err.value, 1000);
    }

    #[test]
    fn constants_match_uniform() {
        assert_eq!(Alignment::uniform(512).unwrap(), Alignment::SECTOR_512);
        assert_eq!(Alignment::uniform(4096).unwrap(), Alignment::PAGE_4096);
    }

    #[test]
    fn page_alignment_examples() {
        let a = Alignment::PAGE_4096;
        assert_eq!(a.validate(0x1000, 0, 4096), Ok(()));
        assert_eq!(
            a.validate(0x1001, 0, 4096),
            Err(DirectError::MisalignedBuffer {
                address: 0x1001,
                required: 4096
            })
        );
        assert_eq!(
            a.validate(0x1000, 1, 4096),
            Err(DirectError::MisalignedOffset {
                offset: 1,
                required: 4096
            })
        );
        assert_eq!(
            a.validate(0x1000, 0, 100),
            Err(DirectError::InvalidLength {
                length: 100,
                required_multiple: 4096
            })
        );
    }

    #[test]
    fn buffer_violation_wins_over_offset_and_length() {
        let err = Alignment::PAGE_4096.validate(0x1001, 7, 9).unwrap_err();
        assert!(matches!(err, DirectError::MisalignedBuffer { .. }));

        let err = Alignment::PAGE_4096.validate(0x2000, 7, 9).unwrap_err();
        assert!(matches!(err, DirectError::MisalignedOffset { .. }));
    }

    #[test]
    fn distinct_requirements_are_checked_independently() {
        let a = Alignment::new(16, 512, 4096).unwrap();
        assert!(!a.is_uniform());
        assert_eq!(a.validate(0x10, 512, 4096), Ok(()));
        assert!(matches!(
            a.validate(0x10, 256, 4096),
            Err(DirectError::MisalignedOffset { required: 512, .. })
        ));
        assert!(matches!(
            a.validate(0x10, 512, 512),
            Err(DirectError::InvalidLength {
                required_multiple: 4096,
                ..
            })
        ));
    }

    #[test]
    fn round_up_length_basic() {
        let a = Alignment::PAGE_4096;
        assert_eq!(a.round_up_length(0), Some(0));
        assert_eq!(a.round_up_length(1), Some(4096));
        assert_eq!(a.round_up_length(4096), Some(4096));
        assert_eq!(a.round_up_length(4097), Some(8192));
    }

    #[test]
    fn round_up_length_near_usize_max_is_none() {
        let a = Alignment::PAGE_4096;
        assert_eq!(a.round_up_length(usize::MAX), None);
        assert_eq!(a.round_up_length(usize::MAX - 4094), None);
        assert_eq!(
            a.round_up_length(usize::MAX - 4095),
            Some(usize::MAX - 4095)
        );
        assert_eq!(Alignment::uniform(1).unwrap().round_up_length(usize::MAX), Some(usize::MAX));
    }

    #[test]
    fn display_collapses_uniform() {
        assert_eq!(Alignment::SECTOR_512.to_string(), "512 bytes");
        assert_eq!(
            Alignment::new(16, 512, 4096).unwrap().to_string(),
            "buffer 16 / offset 512 / length 4096 bytes"
        );
    }

    proptest! {
        /// Property: masking agrees with modulo for every power-of-two alignment.
        #[test]
        fn prop_validate_matches_modulo(
            shift in 0u32..16,
            address in 0usize..1 << 24,
            offset in 0u64..1 << 40,
            length in 0usize..1 << 24,
        ) {
            let align = 1usize << shift;
            let a = Alignment::uniform(align).unwrap();
            let expected_ok = address % align == 0
                && offset % align as u64 == 0
                && length % align == 0;
            prop_assert_eq!(a.validate(address, offset, length).is_ok(), expected_ok);
        }

        /// Property: round_up_length yields the smallest aligned length >= input.
        #[test]
        fn prop_round_up_is_smallest_multiple(shift in 0u32..16, length in 0usize..1 << 24) {
            let a = Alignment::uniform(1usize << shift).unwrap();
            let rounded = a.round_up_length(length).unwrap();
            prop_assert!(rounded >= length);
            prop_assert!(a.is_length_aligned(rounded));
            prop_assert!(rounded - length < a.length());
        }
    }
}
