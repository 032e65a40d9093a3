//! Version classification and selection for registry packages.
//!
//! A caller-supplied version string is either an exact semantic version or a
//! dist-tag name. Range selection works over a [`VersionSet`] taken from the
//! registry document and always orders by semver precedence, never
//! lexicographically.
//!
//! # Modes
//!
//! - **Exact**: `1.2.3`, `2.0.0-beta.1`
//! - **Tag**: `latest`, `beta`, `next`
//! - **Range**: `^1.2.0` via [`latest_compatible`], or any requirement via [`satisfying`]

pub use self::error::{Error, Result};
pub use self::requested::{LATEST_TAG, RequestedVersion};
pub use self::set::{VersionSet, latest_compatible, satisfying};

mod error;
mod requested;
mod set;
