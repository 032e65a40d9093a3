use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use dynax_extract::{DEFAULT_MAX_CONCURRENT_WRITES, ExtractOptions, Extractor, ReqwestClient};
use dynax_registry::{MetadataSource, RegistryClient};
use tracing::info;

use super::parse::PackageSpec;
use crate::utils::ui::tracker::{ProgressTracker, ProgressTrackerConfig, Tracker};

#[derive(Clone, Debug, clap::Args)]
pub struct FetchArg {
    /// Package, optionally with `@version` or `@tag`
    pub package: PackageSpec,

    /// Directory to unpack into [default: ./<package name>]
    #[arg(long, short)]
    pub dest: Option<PathBuf>,

    /// Registry base URL, bypassing scope routing
    #[arg(long)]
    pub registry: Option<String>,

    /// Take the newest version in the caret range of this version
    #[arg(long, value_name = "BASE")]
    pub compatible: Option<String>,

    /// Files written at the same time
    #[arg(long, short, default_value_t = DEFAULT_MAX_CONCURRENT_WRITES)]
    pub jobs: usize,

    /// Hide the progress bar
    #[arg(long, short)]
    pub quiet: bool,
}

impl FetchArg {
    pub async fn run<S: MetadataSource>(self, client: &RegistryClient<S>) -> Result<()> {
        let name = self.package.name.as_str();
        let registry = self.registry.as_deref();

        let requested = match self.compatible.as_deref() {
            Some(base) => {
                if self.package.requested.is_some() {
                    return Err(anyhow!(
                        "'{}' already names a version; drop it or --compatible",
                        self.package
                    ));
                }
                let version = client
                    .latest_compatible_version(name, base, registry)
                    .await
                    .with_context(|| format!("failed to list versions of {name}"))?
                    .ok_or_else(|| anyhow!("no version of {name} is compatible with {base}"))?;
                Some(version)
            }
            None => self.package.requested.clone(),
        };

        let (version, url) = client
            .tarball_url(name, requested.as_deref(), registry)
            .await
            .with_context(|| format!("failed to locate {}", self.package))?;
        info!(name, %version, %url, "resolved package");

        let dest = self
            .dest
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.package.basename()));

        let tracker = ProgressTracker::new(ProgressTrackerConfig {
            label: format!("{name}@{version}"),
            hidden: self.quiet,
        });
        let options = ExtractOptions::default()
            .max_concurrent_writes(self.jobs)
            .on_progress(tracker.callback());

        let http = ReqwestClient::new().context("failed to build HTTP client")?;
        let extractor = Extractor::with_options(http, options);
        let written = extractor
            .extract(&dest, &url)
            .await
            .with_context(|| format!("failed to unpack {url} into {}", dest.display()))?;
        tracker.finish(Some(format!("{name}@{version}: {} files", written.len())));

        for path in written {
            println!("{}", path.display());
        }
        Ok(())
    }
}
