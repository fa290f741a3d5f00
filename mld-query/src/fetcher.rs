use mld_core::metadata::FileMetadata;
use mld_core::paths::PyramidPaths;
use mld_core::search::{rightmost_ge_descending, rightmost_le_ascending};
use mld_core::Strategy;
use mld_store::{metadata_store, ChannelPayload, MultiSliceReader, ObjectStore};

use crate::error::{QueryError, QueryResult};

/// `mld-query`'s strategy type: a strict superset of the persisted set — it
/// additionally allows `Lttb`, which only ever runs at query time.
pub type QueryStrategy = Strategy;

pub fn parse_strategy(name: &str) -> QueryResult<QueryStrategy> {
    match name {
        "max" => Ok(Strategy::Max),
        "min" => Ok(Strategy::Min),
        "avg" => Ok(Strategy::Avg),
        "lttb" => Ok(Strategy::Lttb),
        other => Err(QueryError::UnknownStrategy(other.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub strategy: QueryStrategy,
    pub number_records: usize,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub channels: Vec<ChannelPayload>,
    pub precision: f64,
}

pub async fn fetch(
    store: &dyn ObjectStore,
    raw_file_name: &str,
    req: &FetchRequest,
    paths: &PyramidPaths,
) -> QueryResult<FetchResult> {
    if raw_file_name.trim().is_empty() {
        return Err(QueryError::EmptyName);
    }
    let file_base = mld_core::paths::file_base_name(raw_file_name);

    let meta = metadata_store::load_file_metadata(store, &paths.file_metadata_path(&file_base))
        .await?
        .ok_or(QueryError::PreprocessIncomplete)?;

    let start = req.start.unwrap_or(meta.start);
    let end = req.end.unwrap_or(meta.end);

    if start > meta.end || end < meta.start {
        return Ok(FetchResult { channels: Vec::new(), precision: 0.0 });
    }

    let required_frequency = if end == start {
        f64::INFINITY
    } else {
        req.number_records as f64 / (end - start) as f64
    };

    let level_index = if req.strategy == Strategy::Lttb {
        0
    } else {
        select_level(&meta.levels.frequencies(), required_frequency)
    };
    let level_name = format!("level{level_index}");
    let level_entry = meta
        .levels
        .get(&level_name)
        .ok_or(QueryError::PreprocessIncomplete)?;

    let slice_paths = slice_paths_for_level(store, paths, &file_base, req.strategy, level_index, start, end).await?;

    let reader = MultiSliceReader::read(store, &slice_paths, Some(start), Some(end)).await?;
    let number_target_records = reader.count();
    let downsampled = reader.downsample(req.strategy, 0, Some(req.number_records));
    let number_result_records: usize = downsampled.values().map(Vec::len).sum();

    let precision = if number_target_records == 0 {
        0.0
    } else {
        (number_result_records as f64 / number_target_records as f64) * (level_entry.number as f64 / meta.raw_number as f64)
    };

    let mut channels: Vec<ChannelPayload> = downsampled
        .into_iter()
        .map(|(name, records)| ChannelPayload {
            name,
            data: records.iter().map(|r| [r.time as f64, r.value]).collect(),
        })
        .collect();
    channels.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(FetchResult { channels, precision })
}

/// Picks the coarsest level (largest index) whose persisted frequency still
/// meets `required`. Frequencies are non-increasing by level index, so this
/// is exactly `rightmost_ge_descending`'s contract.
fn select_level(frequencies: &[f64], required: f64) -> usize {
    rightmost_ge_descending(frequencies, required).max(0) as usize
}

async fn slice_paths_for_level(
    store: &dyn ObjectStore,
    paths: &PyramidPaths,
    file_base: &str,
    strategy: QueryStrategy,
    level_index: usize,
    start: i64,
    end: i64,
) -> QueryResult<Vec<String>> {
    let level_meta_path = if level_index == 0 {
        paths.level0_metadata_path(file_base)
    } else {
        paths.level_metadata_path(file_base, persisted_strategy_for(strategy), level_index)
    };
    let level_meta = metadata_store::load_level_metadata(store, &level_meta_path)
        .await?
        .ok_or(QueryError::PreprocessIncomplete)?;

    let names = level_meta.ordered_names();
    let starts = level_meta.ordered_starts();

    let first = rightmost_le_ascending(&starts, start).max(0) as usize;
    let last_idx = rightmost_le_ascending(&starts, end);
    let last = if last_idx < 0 { first } else { last_idx as usize };

    let selected = &names[first..=last.max(first).min(names.len().saturating_sub(1))];
    Ok(selected.iter().map(|name| paths.resolve(file_base, name)).collect())
}

/// `Lttb` has no persisted subtree above level 0, where this function is
/// never called; any persisted strategy is otherwise passed through as-is.
fn persisted_strategy_for(strategy: QueryStrategy) -> Strategy {
    match strategy {
        Strategy::Lttb => Strategy::Max,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_coarsest_sufficient_level() {
        let frequencies = vec![100.0, 10.0, 1.0];
        assert_eq!(select_level(&frequencies, 50.0), 0);
        assert_eq!(select_level(&frequencies, 5.0), 1);
        assert_eq!(select_level(&frequencies, 0.5), 2);
        assert_eq!(select_level(&frequencies, 1000.0), 0);
    }

    #[test]
    fn parses_known_strategies() {
        assert_eq!(parse_strategy("max").unwrap(), Strategy::Max);
        assert_eq!(parse_strategy("lttb").unwrap(), Strategy::Lttb);
        assert!(parse_strategy("bogus").is_err());
    }
}
