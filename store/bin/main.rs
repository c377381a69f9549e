use anyhow::Result;
use sluice_store::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
