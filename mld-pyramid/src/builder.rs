use std::sync::Arc;

use mld_core::downsample::Strategy;
use mld_core::metadata::{FileMetadata, LevelEntry, LevelMetadataDoc, LevelsDoc};
use mld_core::paths::{file_base_name, PyramidPaths};
use mld_store::{metadata_store, ObjectStore, RawStreamer, Slice};
use tracing::info;

use crate::error::{PyramidError, PyramidResult};
use crate::levels_plan::{levels_plan, PyramidConfig};

/// The strategies the pyramid persists. `Lttb` is deliberately excluded —
/// it only ever runs at query time.
pub const PERSISTED_STRATEGIES: [Strategy; 3] = [Strategy::Max, Strategy::Min, Strategy::Avg];

/// A `Strategy` known at compile time to be one of [`PERSISTED_STRATEGIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedStrategy(Strategy);

impl PersistedStrategy {
    pub fn try_new(strategy: Strategy) -> Option<Self> {
        PERSISTED_STRATEGIES.contains(&strategy).then_some(Self(strategy))
    }

    pub fn get(self) -> Strategy {
        self.0
    }
}

/// Builds the full pyramid for one raw file: the level-0 split, then every
/// persisted strategy's level ladder, then the file metadata commit.
pub async fn build(store: Arc<dyn ObjectStore>, raw_key: &str, cfg: PyramidConfig) -> PyramidResult<()> {
    let paths = PyramidPaths::default();
    let file_base = file_base_name(raw_key);

    let (raw_number, start, end, level0_meta) = split_raw(&store, &paths, &file_base, raw_key, &cfg).await?;
    metadata_store::save_level_metadata(&store, &paths.level0_metadata_path(&file_base), &level0_meta).await?;

    let plan = levels_plan(raw_number, start, end, &cfg);
    let mut levels_doc = LevelsDoc::new();
    levels_doc.push(
        "level0",
        LevelEntry {
            names: level0_meta.ordered_names(),
            frequency: plan[0].frequency,
            number: plan[0].number,
        },
    );

    for strategy in PERSISTED_STRATEGIES {
        info!(strategy = strategy.name(), "building strategy levels");
        let mut prev_meta = level0_meta.clone();
        for (k, level_plan) in plan.iter().enumerate().skip(1) {
            let built = build_level(&store, &paths, &file_base, strategy, k, &prev_meta, &cfg).await?;
            let path = paths.level_metadata_path(&file_base, strategy, k);
            metadata_store::save_level_metadata(&store, &path, &built).await?;

            if strategy == Strategy::Max {
                levels_doc.push(
                    level_plan.name.clone(),
                    LevelEntry {
                        names: built.ordered_names(),
                        frequency: level_plan.frequency,
                        number: level_plan.number,
                    },
                );
            }
            prev_meta = built;
        }
    }

    let file_meta = FileMetadata {
        start,
        end,
        raw_number,
        raw_file: raw_key.to_string(),
        levels: levels_doc,
    };
    metadata_store::save_file_metadata(&store, &paths.file_metadata_path(&file_base), &file_meta).await?;
    info!(file = file_base.as_str(), raw_number, "pyramid build committed");
    Ok(())
}

async fn split_raw(
    store: &Arc<dyn ObjectStore>,
    paths: &PyramidPaths,
    file_base: &str,
    raw_key: &str,
    cfg: &PyramidConfig,
) -> PyramidResult<(u64, i64, i64, LevelMetadataDoc)> {
    let mut streamer = RawStreamer::new(store.clone(), raw_key, cfg.number_per_slice);
    let mut raw_number: u64 = 0;
    let mut start = i64::MAX;
    let mut end = i64::MIN;
    let mut level0_meta = LevelMetadataDoc::new();
    let mut slice_index = 0usize;

    while streamer.readable() {
        let batch = streamer.read_next_slice().await?;
        if batch.is_empty() {
            break;
        }
        for record in &batch {
            start = start.min(record.time);
            end = end.max(record.time);
        }
        raw_number += batch.len() as u64;
        let path = paths.level0_slice_path(file_base, slice_index);
        let slice = Slice::new(path);
        slice.save(store.as_ref(), Some(&batch)).await?;
        level0_meta.insert(PyramidPaths::level0_slice_name(slice_index), batch[0].time);
        slice_index += 1;
    }

    if raw_number == 0 {
        return Err(PyramidError::EmptyRawInput);
    }
    Ok((raw_number, start, end, level0_meta))
}

async fn build_level(
    store: &Arc<dyn ObjectStore>,
    paths: &PyramidPaths,
    file_base: &str,
    strategy: Strategy,
    k: usize,
    prev_meta: &LevelMetadataDoc,
    cfg: &PyramidConfig,
) -> PyramidResult<LevelMetadataDoc> {
    let mut level_meta = LevelMetadataDoc::new();
    let mut acc_index = 0usize;
    let mut acc = Slice::new(paths.level_slice_path(file_base, strategy, k, acc_index));

    for name in prev_meta.ordered_names() {
        let prev_path = paths.resolve(file_base, &name);
        let prev_slice = Slice::read(store.as_ref(), prev_path).await?;
        let downsampled = prev_slice.downsample(strategy, cfg.downsample_level_factor, None);
        acc.add(downsampled);

        if acc.count() >= cfg.number_per_slice {
            acc.save(store.as_ref(), None).await?;
            level_meta.insert(PyramidPaths::level_slice_name(strategy, k, acc_index), acc.first_timestamp());
            acc_index += 1;
            acc = Slice::new(paths.level_slice_path(file_base, strategy, k, acc_index));
        }
    }
    if acc.count() > 0 {
        acc.save(store.as_ref(), None).await?;
        level_meta.insert(PyramidPaths::level_slice_name(strategy, k, acc_index), acc.first_timestamp());
    }
    Ok(level_meta)
}
