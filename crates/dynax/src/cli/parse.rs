use std::fmt;
use std::str::FromStr;

use anyhow::bail;

/// `name[@version-or-tag]`, where `name` may carry an `@scope/` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub requested: Option<String>,
}

impl FromStr for PackageSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // a leading '@' opens a scope, not a version
        let split = s[usize::from(s.starts_with('@'))..]
            .find('@')
            .map(|i| i + usize::from(s.starts_with('@')));

        let (name, requested) = match split {
            Some(at) => (&s[..at], Some(&s[at + 1..])),
            None => (s, None),
        };

        if name.is_empty() || name == "@" || name.ends_with('/') {
            bail!("invalid package name in '{s}'");
        }
        if name.starts_with('@') && !name.contains('/') {
            bail!("scoped package '{name}' is missing its name");
        }

        Ok(PackageSpec {
            name: name.to_owned(),
            requested: requested.filter(|r| !r.is_empty()).map(str::to_owned),
        })
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requested {
            Some(requested) => write!(f, "{}@{}", self.name, requested),
            None => write!(f, "{}", self.name),
        }
    }
}

impl PackageSpec {
    /// Last path segment of the name, e.g. `ui` for `@scope/ui`.
    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}
