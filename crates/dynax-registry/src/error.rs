use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("registry unavailable at {url}: {reason}")]
    RegistryUnavailable { url: String, reason: String },

    #[error("no version of {name} matches '{requested}'")]
    VersionNotFound { name: String, requested: String },

    #[error("no tarball published for {name}@{version}")]
    TarballNotFound { name: String, version: String },

    #[error("invalid registry URL '{url}'")]
    InvalidUrl { url: String },

    #[error(transparent)]
    Version(#[from] dynax_version::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("package.json not found in '{0}'")]
    ManifestNotFound(PathBuf),

    #[error("failed to read manifest '{path}': {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("invalid endpoint configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
