use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid version range '{range}': {source}")]
    InvalidRange {
        range: String,
        #[source]
        source: semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
