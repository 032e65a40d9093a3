use anyhow::{Context, Result};
use dynax_registry::{MetadataSource, RegistryClient};

use super::parse::PackageSpec;

#[derive(Clone, Debug, clap::Args)]
pub struct VersionsArg {
    pub name: String,

    /// Only versions matching this semver range, highest first
    #[arg(long, short)]
    pub range: Option<String>,

    #[arg(long)]
    pub registry: Option<String>,
}

impl VersionsArg {
    pub async fn run<S: MetadataSource>(self, client: &RegistryClient<S>) -> Result<()> {
        let registry = self.registry.as_deref();

        let versions: Vec<String> = match self.range.as_deref() {
            Some(range) => client
                .satisfying_versions(&self.name, range, registry)
                .await
                .with_context(|| format!("failed to match {} against '{range}'", self.name))?,
            None => client
                .versions(&self.name, registry)
                .await
                .with_context(|| format!("failed to list versions of {}", self.name))?
                .iter()
                .map(str::to_owned)
                .collect(),
        };

        for version in versions {
            println!("{version}");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Args)]
pub struct TarballArg {
    /// Package, optionally with `@version` or `@tag`
    pub package: PackageSpec,

    #[arg(long)]
    pub registry: Option<String>,
}

impl TarballArg {
    pub async fn run<S: MetadataSource>(self, client: &RegistryClient<S>) -> Result<()> {
        let (version, url) = client
            .tarball_url(
                &self.package.name,
                self.package.requested.as_deref(),
                self.registry.as_deref(),
            )
            .await
            .with_context(|| format!("failed to locate {}", self.package))?;

        println!("{}@{version} {url}", self.package.name);
        Ok(())
    }
}
