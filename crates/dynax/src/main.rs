use anyhow::Result;
use clap::Parser;

use crate::cli::App;

mod cli;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();
    utils::logging::init(app.verbose);
    app.run().await
}
