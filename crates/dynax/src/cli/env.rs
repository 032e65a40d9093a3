use std::path::PathBuf;

use anyhow::{Context, Result};
use dynax_registry::{Endpoints, MetadataSource, RegistryClient, installed_version, is_internal};

pub async fn probe<S: MetadataSource>(client: &RegistryClient<S>) -> Result<()> {
    if client.probe_internal().await {
        println!("internal registry reachable ({})", client.endpoints().probe_url);
    } else {
        println!("internal registry not reachable");
    }
    Ok(())
}

#[derive(Clone, Debug, clap::Args)]
pub struct EndpointsArg {
    pub name: String,
}

impl EndpointsArg {
    pub fn run(self, endpoints: &Endpoints) -> Result<()> {
        println!("registry:   {}", endpoints.registry_for(&self.name));
        println!("unpkg:      {}", endpoints.unpkg_host_for(&self.name));
        println!("npm client: {}", endpoints.npm_client_for(&self.name));
        println!("internal:   {}", is_internal(&self.name));
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Args)]
pub struct LocalVersionArg {
    /// Project root containing `node_modules`
    pub project: PathBuf,
    pub package: String,
}

impl LocalVersionArg {
    pub async fn run(self) -> Result<()> {
        let version = installed_version(&self.project, &self.package)
            .await
            .with_context(|| {
                format!(
                    "{} is not installed in {}",
                    self.package,
                    self.project.display()
                )
            })?;
        println!("{version}");
        Ok(())
    }
}
