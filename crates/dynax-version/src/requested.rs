//! Classification of caller-supplied version strings.

use semver::Version;

/// Dist-tag every registry document is expected to carry.
pub const LATEST_TAG: &str = "latest";

/// Parse a full version, tolerating a leading `=` and/or `v` as npm does.
pub(crate) fn parse_loose(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('=').unwrap_or(raw).trim_start();
    let raw = raw.strip_prefix(['v', 'V']).unwrap_or(raw);
    Version::parse(raw).ok()
}

/// What a caller asked for, before consulting the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestedVersion {
    /// A syntactically valid semantic version.
    Exact(Version),
    /// Anything else is a dist-tag name.
    Tag(String),
}

impl RequestedVersion {
    /// Classify `input`. An absent or blank request means the `latest` tag.
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::Tag(LATEST_TAG.to_owned()),
            Some(raw) => match parse_loose(raw) {
                Some(version) => Self::Exact(version),
                None => Self::Tag(raw.to_owned()),
            },
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Tag(tag) => Some(tag),
            Self::Exact(_) => None,
        }
    }
}

impl std::str::FromStr for RequestedVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(Some(s)))
    }
}

impl std::fmt::Display for RequestedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(version) => write!(f, "{version}"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_semver_is_exact() {
        let requested = RequestedVersion::parse(Some("1.2.3"));
        assert_eq!(requested, RequestedVersion::Exact(Version::new(1, 2, 3)));
        assert!(requested.is_exact());
    }

    #[test]
    fn prerelease_is_exact() {
        let requested = RequestedVersion::parse(Some("2.0.0-beta.1"));
        assert!(requested.is_exact());
        assert_eq!(requested.to_string(), "2.0.0-beta.1");
    }

    #[test]
    fn non_semver_is_tag() {
        assert_eq!(RequestedVersion::parse(Some("beta")).tag(), Some("beta"));
        // partial versions are not valid semver, so they name a tag
        assert_eq!(RequestedVersion::parse(Some("1.2")).tag(), Some("1.2"));
        assert_eq!(RequestedVersion::parse(Some("^1.0.0")).tag(), Some("^1.0.0"));
    }

    #[test]
    fn prefixed_version_is_exact() {
        for raw in ["v1.0.0", "=1.0.0", "=v1.0.0", " v1.0.0 "] {
            assert_eq!(
                RequestedVersion::parse(Some(raw)),
                RequestedVersion::Exact(Version::new(1, 0, 0)),
                "{raw}"
            );
        }
        assert_eq!(RequestedVersion::parse(Some("v1.0.0")).to_string(), "1.0.0");
    }

    #[test]
    fn prefix_alone_is_still_a_tag() {
        assert_eq!(RequestedVersion::parse(Some("v")).tag(), Some("v"));
        assert_eq!(RequestedVersion::parse(Some("vnext")).tag(), Some("vnext"));
        assert_eq!(RequestedVersion::parse(Some("v1.2")).tag(), Some("v1.2"));
    }

    #[test]
    fn missing_request_means_latest() {
        assert_eq!(RequestedVersion::parse(None).tag(), Some(LATEST_TAG));
        assert_eq!(RequestedVersion::parse(Some("  ")).tag(), Some(LATEST_TAG));
    }

    #[test]
    fn from_str_never_fails() {
        let requested: RequestedVersion = "next".parse().unwrap();
        assert_eq!(requested.tag(), Some("next"));
    }
}
