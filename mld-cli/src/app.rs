use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mld_core::paths::PyramidPaths;
use mld_query::{fetch, parse_strategy, FetchRequest};
use mld_store::{LocalFsObjectStore, ObjectStore};

use crate::cli::{Cli, Command};
use crate::settings::Settings;
use crate::telemetry;

pub async fn run() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let settings = Settings::load().context("loading configuration")?;
    let store: Arc<dyn ObjectStore> = Arc::new(LocalFsObjectStore::new(settings.object_store_root.clone()));
    let paths = PyramidPaths::default();

    match cli.command {
        Command::Preprocess { file } => {
            info!(file = file.as_str(), "starting preprocess");
            mld_pyramid::build(store.clone(), &file, settings.pyramid_config())
                .await
                .with_context(|| format!("preprocessing {file}"))?;
            println!("preprocessed {file}");
        }
        Command::Fetch { file, strategy, number_records, start, end } => {
            let strategy = parse_strategy(&strategy).context("parsing strategy")?;
            let req = FetchRequest { strategy, number_records, start, end };
            let result = fetch(store.as_ref(), &file, &req, &paths).await.context("fetching")?;
            let body = serde_json::json!({
                "precision": result.precision,
                "channels": result.channels.iter().map(|c| serde_json::json!({
                    "name": c.name,
                    "data": c.data,
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::ListFiles => {
            let keys = store.list_prefix("mld-preprocess").await.context("listing preprocessed files")?;
            for key in keys.iter().filter(|k| k.ends_with("metadata.json") && !k.contains("level")) {
                println!("{key}");
            }
        }
    }
    Ok(())
}
