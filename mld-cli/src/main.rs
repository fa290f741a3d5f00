use anyhow::Result;
use mld_cli::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
