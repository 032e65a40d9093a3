use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dynax_registry::{Endpoints, RegistryClient, ReqwestSource};

mod env;
mod fetch;
mod parse;
mod query;

#[derive(Clone, Debug, Parser)]
#[command(name = "dynax", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// TOML file overriding the built-in endpoints
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "f", name = "fetch", about = "Download and unpack a package")]
    Fetch(fetch::FetchArg),
    #[command(alias = "v", name = "versions", about = "List published versions")]
    Versions(query::VersionsArg),
    #[command(alias = "t", name = "tarball", about = "Print the archive URL of a version")]
    Tarball(query::TarballArg),
    #[command(name = "probe", about = "Check whether the internal registry is reachable")]
    Probe,
    #[command(alias = "e", name = "endpoints", about = "Show where a package is looked up")]
    Endpoints(env::EndpointsArg),
    #[command(name = "local-version", about = "Version installed in a project")]
    LocalVersion(env::LocalVersionArg),
}

impl App {
    pub async fn run(self) -> Result<()> {
        let endpoints = Endpoints::load_from(self.config.as_deref())
            .context("failed to load endpoint configuration")?;

        match self.cmd {
            Commands::Fetch(arg) => arg.run(&client(endpoints)?).await,
            Commands::Versions(arg) => arg.run(&client(endpoints)?).await,
            Commands::Tarball(arg) => arg.run(&client(endpoints)?).await,
            Commands::Probe => env::probe(&client(endpoints)?).await,
            Commands::Endpoints(arg) => arg.run(&endpoints),
            Commands::LocalVersion(arg) => arg.run().await,
        }
    }
}

fn client(endpoints: Endpoints) -> Result<RegistryClient<ReqwestSource>> {
    RegistryClient::with_reqwest(endpoints).context("failed to build HTTP client")
}
