//! Requested and resolved caching modes.
//!
//! [`Mode::resolve`] is the only function that decides how a file is cached.
//! Everything else (open flags, alignment enforcement, error translation)
//! follows from the [`Resolved`] value it returns.

use std::fmt;

use sysprim_sys::Platform;

use crate::{DirectError, Requirements};

/// What `Auto` does when true Direct I/O is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Degrade to buffered I/O, visibly, at resolution time.
    FallbackToBuffered,
    /// Fail resolution with [`DirectError::NotSupported`].
    ErrorOnViolation,
}

/// The caching behaviour a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Strict page-cache bypass (`O_DIRECT`, `FILE_FLAG_NO_BUFFERING`).
    Direct,
    /// Best-effort cache bypass hint (`F_NOCACHE`).
    Uncached,
    /// Ordinary page-cached I/O.
    Buffered,
    /// The best mode the platform offers, with `Policy` deciding what happens
    /// when that is not Direct I/O on a strict platform.
    Auto(Policy),
}

/// The caching behaviour a handle actually uses. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolved {
    Direct,
    Uncached,
    Buffered,
}

impl Mode {
    /// Resolves this request against `requirements` on `platform`.
    ///
    /// Pure and deterministic. On macOS only the `F_NOCACHE` hint exists, so
    /// `Direct` always fails and `Auto` always becomes `Uncached`. On Linux and
    /// Windows `Direct` needs known requirements and `Uncached` does not exist.
    pub fn resolve(
        self,
        requirements: &Requirements,
        platform: Platform,
    ) -> Result<Resolved, DirectError> {
        let resolved = match platform {
            Platform::Darwin => match self {
                Mode::Direct => None,
                Mode::Uncached | Mode::Auto(_) => Some(Resolved::Uncached),
                Mode::Buffered => Some(Resolved::Buffered),
            },
            Platform::Linux | Platform::Windows => match (self, requirements) {
                (Mode::Buffered, _)
                | (Mode::Auto(Policy::FallbackToBuffered), Requirements::Unknown(_)) => {
                    Some(Resolved::Buffered)
                }
                (Mode::Direct | Mode::Auto(_), Requirements::Known(_)) => Some(Resolved::Direct),
                (Mode::Direct | Mode::Auto(Policy::ErrorOnViolation), Requirements::Unknown(_))
                | (Mode::Uncached, _) => None,
            },
        };

        match resolved {
            Some(resolved) => {
                if matches!(self, Mode::Auto(_)) && resolved == Resolved::Buffered {
                    tracing::warn!(
                        platform = %platform,
                        requirements = %requirements,
                        "direct I/O unavailable, falling back to buffered"
                    );
                }
                tracing::debug!(
                    requested = %self,
                    resolved = %resolved,
                    platform = %platform,
                    "resolved I/O mode"
                );
                Ok(resolved)
            }
            None => {
                tracing::debug!(
                    requested = %self,
                    platform = %platform,
                    requirements = %requirements,
                    "requested I/O mode not supported"
                );
                Err(DirectError::NotSupported)
            }
        }
    }
}

impl Resolved {
    /// True when transfers must satisfy an [`Alignment`](crate::Alignment).
    pub fn requires_alignment(self) -> bool {
        self == Resolved::Direct
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolved::Direct => "direct",
            Resolved::Uncached => "uncached",
            Resolved::Buffered => "buffered",
        }
    }
}

impl From<Resolved> for Mode {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::Direct => Mode::Direct,
            Resolved::Uncached => Mode::Uncached,
            Resolved::Buffered => Mode::Buffered,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Policy::FallbackToBuffered => "fallback-to-buffered",
            Policy::ErrorOnViolation => "error-on-violation",
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Direct => f.write_str("direct"),
            Mode::Uncached => f.write_str("uncached"),
            Mode::Buffered => f.write_str("buffered"),
            Mode::Auto(policy) => write!(f, "auto({policy})"),
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alignment, UnknownReason};
    use test_case::test_case;

    const KNOWN: Requirements = Requirements::Known(Alignment::PAGE_4096);
    const UNKNOWN: Requirements = Requirements::Unknown(UnknownReason::SectorSizeUndetermined);
    const UNSUPPORTED: Requirements = Requirements::Unknown(UnknownReason::PlatformUnsupported);

    const FALLBACK: Mode = Mode::Auto(Policy::FallbackToBuffered);
    const STRICT: Mode = Mode::Auto(Policy::ErrorOnViolation);

    // ========================================================================
    // Resolution truth table
    // ========================================================================

    #[test_case(Mode::Direct, Platform::Darwin, KNOWN, None ; "direct darwin known")]
    #[test_case(Mode::Direct, Platform::Darwin, UNSUPPORTED, None ; "direct darwin unknown")]
    #[test_case(Mode::Direct, Platform::Linux, UNKNOWN, None ; "direct linux unknown")]
    #[test_case(Mode::Direct, Platform::Windows, UNKNOWN, None ; "direct windows unknown")]
    #[test_case(Mode::Direct, Platform::Linux, KNOWN, Some(Resolved::Direct) ; "direct linux known")]
    #[test_case(Mode::Direct, Platform::Windows, KNOWN, Some(Resolved::Direct) ; "direct windows known")]
    #[test_case(Mode::Uncached, Platform::Darwin, KNOWN, Some(Resolved::Uncached) ; "uncached darwin known")]
    #[test_case(Mode::Uncached, Platform::Darwin, UNSUPPORTED, Some(Resolved::Uncached) ; "uncached darwin unknown")]
    #[test_case(Mode::Uncached, Platform::Linux, KNOWN, None ; "uncached linux known")]
    #[test_case(Mode::Uncached, Platform::Linux, UNKNOWN, None ; "uncached linux unknown")]
    #[test_case(Mode::Uncached, Platform::Windows, KNOWN, None ; "uncached windows known")]
    #[test_case(Mode::Uncached, Platform::Windows, UNKNOWN, None ; "uncached windows unknown")]
    #[test_case(Mode::Buffered, Platform::Darwin, UNSUPPORTED, Some(Resolved::Buffered) ; "buffered darwin")]
    #[test_case(Mode::Buffered, Platform::Linux, KNOWN, Some(Resolved::Buffered) ; "buffered linux known")]
    #[test_case(Mode::Buffered, Platform::Linux, UNKNOWN, Some(Resolved::Buffered) ; "buffered linux unknown")]
    #[test_case(Mode::Buffered, Platform::Windows, KNOWN, Some(Resolved::Buffered) ; "buffered windows known")]
    #[test_case(FALLBACK, Platform::Darwin, KNOWN, Some(Resolved::Uncached) ; "fallback darwin known")]
    #[test_case(FALLBACK, Platform::Darwin, UNSUPPORTED, Some(Resolved::Uncached) ; "fallback darwin unknown")]
    #[test_case(FALLBACK, Platform::Linux, KNOWN, Some(Resolved::Direct) ; "fallback linux known")]
    #[test_case(FALLBACK, Platform::Windows, KNOWN, Some(Resolved::Direct) ; "fallback windows known")]
    #[test_case(FALLBACK, Platform::Linux, UNKNOWN, Some(Resolved::Buffered) ; "fallback linux unknown")]
    #[test_case(FALLBACK, Platform::Windows, UNKNOWN, Some(Resolved::Buffered) ; "fallback windows unknown")]
    #[test_case(STRICT, Platform::Darwin, KNOWN, Some(Resolved::Uncached) ; "strict darwin known")]
    #[test_case(STRICT, Platform::Darwin, UNSUPPORTED, Some(Resolved::Uncached) ; "strict darwin unknown")]
    #[test_case(STRICT, Platform::Linux, KNOWN, Some(Resolved::Direct) ; "strict linux known")]
    #[test_case(STRICT, Platform::Windows, KNOWN, Some(Resolved::Direct) ; "strict windows known")]
    #[test_case(STRICT, Platform::Linux, UNKNOWN, None ; "strict linux unknown")]
    #[test_case(STRICT, Platform::Windows, UNKNOWN, None ; "strict windows unknown")]
    fn resolution_table(
        requested: Mode,
        platform: Platform,
        requirements: Requirements,
        expected: Option<Resolved>,
    ) {
        let result = requested.resolve(&requirements, platform);
        match expected {
            Some(resolved) => assert_eq!(result, Ok(resolved)),
            None => assert_eq!(result, Err(DirectError::NotSupported)),
        }
    }

    #[test]
    fn direct_is_only_reachable_from_known_requirements() {
        let modes = [Mode::Direct, Mode::Uncached, Mode::Buffered, FALLBACK, STRICT];
        for platform in Platform::ALL {
            for requirements in [UNKNOWN, UNSUPPORTED] {
                for mode in modes {
                    assert_ne!(mode.resolve(&requirements, platform), Ok(Resolved::Direct));
                }
            }
        }
    }

    #[test]
    fn unknown_reason_does_not_affect_resolution() {
        for platform in Platform::ALL {
            for mode in [Mode::Direct, Mode::Uncached, Mode::Buffered, FALLBACK, STRICT] {
                assert_eq!(
                    mode.resolve(&UNKNOWN, platform),
                    mode.resolve(&UNSUPPORTED, platform)
                );
            }
        }
    }

    #[test]
    fn resolved_round_trips_through_mode() {
        for resolved in [Resolved::Direct, Resolved::Uncached, Resolved::Buffered] {
            let requirements = KNOWN;
            let platform = if resolved == Resolved::Uncached {
                Platform::Darwin
            } else {
                Platform::Linux
            };
            assert_eq!(Mode::from(resolved).resolve(&requirements, platform), Ok(resolved));
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(FALLBACK.to_string(), "auto(fallback-to-buffered)");
        assert_eq!(STRICT.to_string(), "auto(error-on-violation)");
        assert_eq!(Resolved::Uncached.to_string(), "uncached");
    }
}
