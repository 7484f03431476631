//! # sysprim-direct: Direct I/O mode negotiation
//!
//! Reconciles three incompatible platform models for uncached file I/O into
//! one requested/resolved state machine:
//!
//! | Platform | Mechanism | Strict? | Alignment discoverable? |
//! |---|---|---|---|
//! | Linux | `O_DIRECT` | yes (`EINVAL`) | no |
//! | Windows | `FILE_FLAG_NO_BUFFERING` | yes | yes (sector size) |
//! | macOS | `F_NOCACHE` | no (hint) | n/a |
//!
//! # Architecture
//!
//! ```text
//! Mode ──┐
//!        ├─► Mode::resolve ─► Resolved ─┐
//! path ──► Requirements::discover ──────┼─► Opener::open ─► Handle
//!        (FilesystemProbe)              │    (sysprim-sys)    │
//!                                       │                     ├─► read / write
//!                                       └──── Alignment ──────┘   (validated when Direct)
//! ```
//!
//! [`Mode::resolve`] is the single place a caching mode is decided. The
//! [`Platform`] is an ordinary value, so every decision can be evaluated for
//! any platform from one binary.
//!
//! # Example
//!
//! ```
//! use sysprim_direct::{Alignment, Mode, Platform, Policy, Requirements, Resolved, UnknownReason};
//!
//! let unknown = Requirements::Unknown(UnknownReason::SectorSizeUndetermined);
//! let resolved = Mode::Auto(Policy::FallbackToBuffered)
//!     .resolve(&unknown, Platform::Linux)
//!     .unwrap();
//! assert_eq!(resolved, Resolved::Buffered);
//!
//! let known = Requirements::Known(Alignment::PAGE_4096);
//! assert_eq!(Mode::Direct.resolve(&known, Platform::Linux).unwrap(), Resolved::Direct);
//! assert!(Mode::Direct.resolve(&known, Platform::Darwin).is_err());
//! ```

mod aligned;
mod alignment;
mod capability;
mod error;
mod handle;
mod mode;
mod opener;
mod probe;
mod requirements;

pub use aligned::AlignedBuffer;
pub use alignment::{Alignment, InvalidAlignment};
pub use capability::Capability;
pub use error::DirectError;
pub use handle::Handle;
pub use mode::{Mode, Policy, Resolved};
pub use opener::{OpenFlags, Opener, Survey};
pub use probe::{FilesystemKind, FilesystemProbe, SystemProbe};
pub use requirements::{Requirements, UnknownReason};
pub use sysprim_sys::{Operation, Platform, SyscallError};
