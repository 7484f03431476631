//! Opening files in a negotiated caching mode.

use std::path::Path;

use sysprim_sys::{OpenOptions, Platform};

use crate::{
    Capability, DirectError, FilesystemKind, FilesystemProbe, Handle, Mode, Requirements, Resolved,
    SystemProbe,
};

/// Access flags for [`Opener::open`].
///
/// Caching flags are not part of this type: they follow from the resolved
/// mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub truncate: bool,
}

impl OpenFlags {
    /// Flags for reading an existing file.
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    /// Flags for reading and writing an existing file.
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Self::default()
        }
    }

    /// Flags for reading and writing, creating the file if needed.
    pub fn create() -> Self {
        Self {
            read: true,
            write: true,
            create: true,
            ..Self::default()
        }
    }

    /// Adds truncation on open.
    pub fn truncating(mut self) -> Self {
        self.truncate = true;
        self
    }

    fn with_cache_flags(self, resolved: Resolved) -> OpenOptions {
        OpenOptions {
            read: self.read,
            write: self.write,
            create: self.create,
            truncate: self.truncate,
            direct: resolved == Resolved::Direct,
            no_cache: resolved == Resolved::Uncached,
        }
    }
}

/// Everything [`Opener::survey`] learned about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Survey {
    pub requirements: Requirements,
    /// `None` off Linux or when `statfs` failed.
    pub filesystem: Option<FilesystemKind>,
    pub capability: Capability,
}

/// Runs the full open flow: requirements, resolution, open, handle.
///
/// Requirements are discovered through the probe unless supplied with
/// [`with_requirements`](Self::with_requirements), which is how Direct I/O is
/// enabled on Linux.
#[derive(Debug, Clone)]
pub struct Opener<P = SystemProbe> {
    platform: Platform,
    probe: P,
    requirements: Option<Requirements>,
}

impl Opener<SystemProbe> {
    /// An opener for the host platform using real probes.
    pub fn new() -> Self {
        Self::with_probe(SystemProbe)
    }
}

impl Default for Opener<SystemProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FilesystemProbe> Opener<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            platform: Platform::current(),
            probe,
            requirements: None,
        }
    }

    /// Makes resolution decisions as `platform` would.
    ///
    /// Descriptors are still opened by the host, so a mode resolved for a
    /// foreign platform may be refused at open time.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Bypasses discovery with explicit requirements.
    pub fn with_requirements(mut self, requirements: impl Into<Requirements>) -> Self {
        self.requirements = Some(requirements.into());
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The requirements that apply to `path`: the explicit ones if set,
    /// otherwise discovered.
    pub fn requirements_for(&self, path: &Path) -> Requirements {
        match self.requirements {
            Some(requirements) => requirements,
            None => Requirements::discover(path, self.platform, &self.probe),
        }
    }

    pub fn capability(&self, path: &Path) -> Capability {
        let requirements = self.requirements_for(path);
        Capability::probe_with_requirements(path, self.platform, &self.probe, &requirements)
    }

    /// The filesystem holding `path`, as seen through this opener's probe.
    pub fn filesystem_kind(&self, path: &Path) -> Option<FilesystemKind> {
        FilesystemKind::detect(path, self.platform, &self.probe)
    }

    /// Requirements, filesystem and capability for `path`, probing each
    /// underlying fact once.
    pub fn survey(&self, path: &Path) -> Survey {
        let requirements = self.requirements_for(path);
        let filesystem = self.filesystem_kind(path);
        Survey {
            requirements,
            filesystem,
            capability: Capability::derive(self.platform, filesystem, &requirements),
        }
    }

    /// Resolves `mode` for `path` without opening anything.
    pub fn resolve(&self, path: &Path, mode: Mode) -> Result<(Resolved, Requirements), DirectError> {
        let requirements = self.requirements_for(path);
        let resolved = mode.resolve(&requirements, self.platform)?;
        Ok((resolved, requirements))
    }

    /// Opens `path` in the mode `mode` resolves to.
    ///
    /// Resolution failures return before any descriptor is allocated.
    pub fn open(&self, path: &Path, mode: Mode, flags: OpenFlags) -> Result<Handle, DirectError> {
        let (resolved, requirements) = self.resolve(path, mode)?;
        let descriptor = sysprim_sys::open(path, &flags.with_cache_flags(resolved))
            .map_err(|e| DirectError::from_syscall(e, resolved, Platform::current()))?;
        tracing::debug!(path = %path.display(), mode = %resolved, "opened file");
        Handle::new(descriptor, resolved, requirements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::FakeProbe;
    use crate::{Alignment, Policy, UnknownReason};

    #[test]
    fn cache_flags_follow_resolved_mode() {
        let flags = OpenFlags::create();

        let direct = flags.with_cache_flags(Resolved::Direct);
        assert!(direct.direct && !direct.no_cache);

        let uncached = flags.with_cache_flags(Resolved::Uncached);
        assert!(!uncached.direct && uncached.no_cache);

        let buffered = flags.with_cache_flags(Resolved::Buffered);
        assert!(!buffered.direct && !buffered.no_cache);
        assert!(buffered.read && buffered.write && buffered.create && !buffered.truncate);
    }

    #[test]
    fn explicit_requirements_skip_discovery() {
        let probe = FakeProbe::default().with_sector_size(512);
        let opener = Opener::with_probe(probe)
            .with_platform(Platform::Windows)
            .with_requirements(Alignment::PAGE_4096);

        assert_eq!(
            opener.requirements_for(Path::new(r"C:\x")),
            Requirements::Known(Alignment::PAGE_4096)
        );
        assert_eq!(opener.probe.calls(), 0);
    }

    #[test]
    fn resolve_uses_simulated_platform() {
        let opener = Opener::with_probe(FakeProbe::default().with_sector_size(4096))
            .with_platform(Platform::Windows);
        let (resolved, requirements) = opener
            .resolve(Path::new(r"C:\x"), Mode::Auto(Policy::ErrorOnViolation))
            .unwrap();
        assert_eq!(resolved, Resolved::Direct);
        assert_eq!(requirements, Requirements::Known(Alignment::PAGE_4096));
    }

    #[test]
    fn survey_reuses_a_single_statfs() {
        let opener = Opener::with_probe(FakeProbe::default().with_magic(0x0102_1994))
            .with_platform(Platform::Linux)
            .with_requirements(Alignment::PAGE_4096);

        let survey = opener.survey(Path::new("/dev/shm/x"));
        assert_eq!(survey.filesystem, Some(FilesystemKind::Tmpfs));
        assert_eq!(survey.requirements, Requirements::Known(Alignment::PAGE_4096));
        assert_eq!(survey.capability, Capability::BufferedOnly);
        assert_eq!(opener.probe.calls(), 1);
    }

    #[test]
    fn survey_agrees_with_capability() {
        let opener = Opener::with_probe(FakeProbe::default().with_magic(0xEF53))
            .with_platform(Platform::Linux)
            .with_requirements(Alignment::SECTOR_512);
        let path = Path::new("/data/x");

        let survey = opener.survey(path);
        assert_eq!(survey.filesystem, Some(FilesystemKind::Other(0xEF53)));
        assert_eq!(survey.capability, opener.capability(path));
        assert!(survey.capability.supports_direct());
    }

    #[test]
    fn survey_off_linux_has_no_filesystem() {
        let opener = Opener::with_probe(FakeProbe::default().with_sector_size(512))
            .with_platform(Platform::Windows);
        let survey = opener.survey(Path::new(r"C:\x"));
        assert_eq!(survey.filesystem, None);
        assert_eq!(survey.capability, Capability::DirectSupported(Alignment::SECTOR_512));
        assert_eq!(opener.probe.calls(), 1);
    }

    #[test]
    fn resolve_failure_reports_not_supported() {
        let opener = Opener::with_probe(FakeProbe::default()).with_platform(Platform::Linux);
        assert_eq!(
            opener.resolve(Path::new("/x"), Mode::Direct),
            Err(DirectError::NotSupported)
        );
        assert_eq!(
            opener.requirements_for(Path::new("/x")),
            Requirements::Unknown(UnknownReason::SectorSizeUndetermined)
        );
    }
}
