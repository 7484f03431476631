//! Aligned buffer for Direct I/O.
//!
//! Direct transfers need a buffer whose start address and length satisfy an
//! [`Alignment`]. `AlignedBuffer` over-allocates a plain `Vec<u8>` by one
//! alignment unit and exposes the aligned window inside it, so no custom
//! allocator is involved. The backing vector is never grown, so the window
//! never moves.

use crate::Alignment;

/// A zero-initialised buffer that satisfies an [`Alignment`].
#[derive(Debug)]
pub struct AlignedBuffer {
    storage: Vec<u8>,
    start: usize,
    len: usize,
    alignment: Alignment,
}

impl AlignedBuffer {
    /// Allocates a zeroed buffer of at least `len` bytes.
    ///
    /// The length is rounded up to the alignment's length multiple and the
    /// start address is aligned to its buffer requirement.
    ///
    /// # Panics
    ///
    /// If the rounded length plus one buffer alignment unit exceeds
    /// `usize::MAX`. Use [`try_zeroed`](Self::try_zeroed) to check instead.
    pub fn zeroed(len: usize, alignment: Alignment) -> Self {
        match Self::try_zeroed(len, alignment) {
            Some(buf) => buf,
            None => panic!("aligned buffer of {len} bytes ({alignment}) overflows usize"),
        }
    }

    /// Like [`zeroed`](Self::zeroed), but `None` when the padded size does
    /// not fit in `usize`.
    pub fn try_zeroed(len: usize, alignment: Alignment) -> Option<Self> {
        let len = alignment.round_up_length(len)?;
        let storage = vec![0u8; len.checked_add(alignment.buffer())?];
        let address = storage.as_ptr() as usize;
        let start = address.next_multiple_of(alignment.buffer()) - address;
        Some(Self {
            storage,
            start,
            len,
            alignment,
        })
    }

    /// Creates an aligned buffer holding `data`, zero-padded to the next
    /// length multiple.
    pub fn from_data(data: &[u8], alignment: Alignment) -> Self {
        let mut buf = Self::zeroed(data.len(), alignment);
        buf.as_mut_slice()[..data.len()].copy_from_slice(data);
        buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.start + self.len]
    }

    /// Length in bytes, always a multiple of the alignment's length multiple.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }
}

impl AsRef<[u8]> for AlignedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for AlignedBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}
