//! Stage attribution for pipeline and retention failures

use std::fmt;

/// The step of a run in which a failure occurred
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolveVersion,
    CheckVersion,
    Fetch,
    PersistManifest,
    LoadManifest,
    EnsureProvider,
    CreateVersion,
    UploadChecksums,
    UploadSignature,
    CreatePlatform,
    UploadBinary,
    ListProviders,
    ListVersions,
    DeleteVersion,
}

impl Stage {
    /// Stable identifier used in reports and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveVersion => "resolve-version",
            Self::CheckVersion => "check-version",
            Self::Fetch => "fetch",
            Self::PersistManifest => "persist-manifest",
            Self::LoadManifest => "load-manifest",
            Self::EnsureProvider => "ensure-provider",
            Self::CreateVersion => "create-version",
            Self::UploadChecksums => "upload-checksums",
            Self::UploadSignature => "upload-signature",
            Self::CreatePlatform => "create-platform",
            Self::UploadBinary => "upload-binary",
            Self::ListProviders => "list-providers",
            Self::ListVersions => "list-versions",
            Self::DeleteVersion => "delete-version",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifying tuple attached to a failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub organization: Option<String>,
    pub provider: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Fill fields missing from `self` with the ones set on `outer`
    #[must_use]
    pub fn merge(self, outer: ErrorContext) -> Self {
        Self {
            organization: self.organization.or(outer.organization),
            provider: self.provider.or(outer.provider),
            version: self.version.or(outer.version),
            platform: self.platform.or(outer.platform),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.organization.is_none()
            && self.provider.is_none()
            && self.version.is_none()
            && self.platform.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("organization", &self.organization),
            ("provider", &self.provider),
            ("version", &self.version),
            ("platform", &self.platform),
        ];
        let mut first = true;
        for (name, value) in fields {
            if let Some(value) = value {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{name}={value}")?;
                first = false;
            }
        }
        Ok(())
    }
}
