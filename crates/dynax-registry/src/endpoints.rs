use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Package scopes that are published to the internal registry.
pub const INTERNAL_SCOPES: [&str; 2] = ["@auto/", "@bdpweb/"];

const APP_SCOPE: &str = "@bdpweb/";

/// Unprefixed environment variables honoured for compatibility with
/// existing tooling.
const OVERRIDE_VARS: [&str; 3] = ["registry", "npm_client", "unpkg"];

/// Returns `true` if `name` lives in one of the [`INTERNAL_SCOPES`].
pub fn is_internal(name: &str) -> bool {
    INTERNAL_SCOPES.iter().any(|scope| name.starts_with(scope))
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Endpoint configuration consumed by the registry client and the CLI.
///
/// Layered from lowest to highest precedence: built-in defaults, an optional
/// TOML file, `DYNAX_*` variables, then the bare `REGISTRY`, `NPM_CLIENT` and
/// `UNPKG` overrides.
///
/// # Examples
///
/// ```
/// use dynax_registry::Endpoints;
///
/// let endpoints = Endpoints::default();
/// assert_eq!(endpoints.registry_for("react"), "https://registry.npmmirror.com");
/// assert_eq!(endpoints.npm_client_for("react"), "npm");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Registry used for every package when set. Blank counts as unset.
    #[serde(deserialize_with = "blank_as_none")]
    pub registry: Option<String>,
    /// Package-manager client used for every package when set.
    #[serde(deserialize_with = "blank_as_none")]
    pub npm_client: Option<String>,
    /// CDN host used for every package when set.
    #[serde(deserialize_with = "blank_as_none")]
    pub unpkg: Option<String>,

    pub public_registry: String,
    pub internal_registry: String,
    pub internal_app_registry: String,
    pub public_unpkg: String,
    pub internal_unpkg: String,
    pub probe_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            registry: None,
            npm_client: None,
            unpkg: None,
            public_registry: "https://registry.npmmirror.com".to_owned(),
            internal_registry: "http://r.npm.corpautohome.com".to_owned(),
            internal_app_registry: "http://r.npm.corpautohome.com".to_owned(),
            public_unpkg: "https://unpkg.com".to_owned(),
            internal_unpkg: "https://g.autoimg.cn/@app/static".to_owned(),
            probe_url: "http://r.npm.corpautohome.com/".to_owned(),
        }
    }
}

impl Endpoints {
    /// Defaults overlaid with the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Defaults, then `config` if given, then the environment.
    pub fn load_from(config: Option<&Path>) -> Result<Self> {
        Ok(Self::figment(config).extract()?)
    }

    pub fn figment(config: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("DYNAX_"))
            .merge(Env::raw().only(&OVERRIDE_VARS))
    }

    pub fn registry_for(&self, name: &str) -> &str {
        if let Some(registry) = non_blank(self.registry.as_deref()) {
            return registry;
        }
        if !is_internal(name) {
            &self.public_registry
        } else if name.starts_with(APP_SCOPE) {
            &self.internal_app_registry
        } else {
            &self.internal_registry
        }
    }

    pub fn unpkg_host_for(&self, name: &str) -> &str {
        match non_blank(self.unpkg.as_deref()) {
            Some(host) => host,
            None if is_internal(name) => &self.internal_unpkg,
            None => &self.public_unpkg,
        }
    }

    // internal packages use the same client today
    pub fn npm_client_for(&self, _name: &str) -> &str {
        non_blank(self.npm_client.as_deref()).unwrap_or("npm")
    }
}
