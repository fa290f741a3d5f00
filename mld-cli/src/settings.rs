use anyhow::{Context, Result};
use serde::Deserialize;

use mld_pyramid::PyramidConfig;

/// Settings resolved from (in ascending priority) built-in defaults, an
/// optional `mld.toml` in the working directory, and `MLD_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_root")]
    pub object_store_root: String,
    #[serde(default = "default_number_per_slice")]
    pub number_per_slice: usize,
    #[serde(default = "default_downsample_factor")]
    pub downsample_level_factor: usize,
    #[serde(default = "default_minimum_level")]
    pub minimum_number_level: u64,
}

fn default_root() -> String {
    "./mld-data".to_string()
}

fn default_number_per_slice() -> usize {
    100_000
}

fn default_downsample_factor() -> usize {
    100
}

fn default_minimum_level() -> u64 {
    600
}

impl Settings {
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .set_default("object_store_root", default_root())?
            .set_default("number_per_slice", default_number_per_slice() as i64)?
            .set_default("downsample_level_factor", default_downsample_factor() as i64)?
            .set_default("minimum_number_level", default_minimum_level() as i64)?
            .add_source(config::File::with_name("mld").required(false))
            .add_source(config::Environment::with_prefix("MLD"));

        builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    pub fn pyramid_config(&self) -> PyramidConfig {
        PyramidConfig::new(
            self.number_per_slice,
            self.downsample_level_factor,
            self.minimum_number_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::load().unwrap();
        assert_eq!(settings.number_per_slice, 100_000);
        assert_eq!(settings.downsample_level_factor, 100);
    }
}
