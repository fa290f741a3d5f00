use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mld", about = "Multi-level downsampling engine for power traces")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the downsample pyramid for a raw CSV file already present in
    /// the object store root.
    Preprocess {
        /// Object key of the raw CSV file, e.g. `power.csv`.
        file: String,
    },
    /// Query a preprocessed file.
    Fetch {
        file: String,
        #[arg(long, default_value = "avg")]
        strategy: String,
        #[arg(long, default_value_t = 600)]
        number_records: usize,
        #[arg(long)]
        start: Option<i64>,
        #[arg(long)]
        end: Option<i64>,
    },
    /// List every key preprocessed under the pyramid root.
    ListFiles,
}
