//! What a filesystem can do, independent of any particular open request.

use std::fmt;
use std::path::Path;

use sysprim_sys::Platform;

use crate::{Alignment, FilesystemKind, FilesystemProbe, Requirements};

/// The strongest cache-bypass a path supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DirectSupported(Alignment),
    UncachedOnly,
    BufferedOnly,
}

impl Capability {
    /// Probes `path` on `platform`, discovering requirements as
    /// [`Requirements::discover`] does.
    pub fn probe(path: &Path, platform: Platform, probe: &dyn FilesystemProbe) -> Self {
        let requirements = Requirements::discover(path, platform, probe);
        Self::probe_with_requirements(path, platform, probe, &requirements)
    }

    /// Probes `path` with caller-supplied requirements instead of discovery.
    ///
    /// The filesystem denylist still applies: explicit requirements cannot
    /// make NFS or tmpfs Direct-I/O capable.
    pub fn probe_with_requirements(
        path: &Path,
        platform: Platform,
        probe: &dyn FilesystemProbe,
        requirements: &Requirements,
    ) -> Self {
        let filesystem = FilesystemKind::detect(path, platform, probe);
        let capability = Self::derive(platform, filesystem, requirements);
        tracing::debug!(
            path = %path.display(),
            platform = %platform,
            %capability,
            "probed capability"
        );
        capability
    }

    /// Combines a filesystem classification with requirements.
    pub fn derive(
        platform: Platform,
        filesystem: Option<FilesystemKind>,
        requirements: &Requirements,
    ) -> Self {
        match platform {
            Platform::Darwin => Self::UncachedOnly,
            Platform::Linux | Platform::Windows => {
                if let Some(kind) = filesystem.filter(|k| k.rejects_direct_io()) {
                    tracing::warn!(filesystem = %kind, "filesystem does not support direct I/O");
                    return Self::BufferedOnly;
                }
                match requirements {
                    Requirements::Known(alignment) => Self::DirectSupported(*alignment),
                    Requirements::Unknown(_) => Self::BufferedOnly,
                }
            }
        }
    }

    pub fn supports_direct(&self) -> bool {
        matches!(self, Self::DirectSupported(_))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectSupported(alignment) => write!(f, "direct ({alignment})"),
            Self::UncachedOnly => f.write_str("uncached only"),
            Self::BufferedOnly => f.write_str("buffered only"),
        }
    }
}
