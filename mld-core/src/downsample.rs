use serde::{Deserialize, Serialize};

use crate::record::{round4, Record};

/// A downsampling strategy. `Max`/`Min`/`Avg` are persistable (see
/// `mld-pyramid`'s `PersistedStrategy`); `Lttb` is query-time only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Max,
    Min,
    Avg,
    Lttb,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Max => "max",
            Strategy::Min => "min",
            Strategy::Avg => "avg",
            Strategy::Lttb => "lttb",
        }
    }

    /// Dispatches to the matching kernel. `factor_or_target` is a block
    /// factor for `Max`/`Min`/`Avg` and a target point count for `Lttb`.
    pub fn apply(&self, records: &[Record], factor_or_target: usize) -> Vec<Record> {
        match self {
            Strategy::Max => max_by_factor(records, factor_or_target),
            Strategy::Min => min_by_factor(records, factor_or_target),
            Strategy::Avg => avg_by_factor(records, factor_or_target),
            Strategy::Lttb => lttb(records, factor_or_target),
        }
    }
}

fn block_extreme(records: &[Record], factor: usize, keep_max: bool) -> Vec<Record> {
    if factor <= 1 || records.is_empty() {
        return records.to_vec();
    }
    records
        .chunks(factor)
        .map(|block| {
            let mut best = &block[0];
            for candidate in &block[1..] {
                let better = if keep_max {
                    candidate.value > best.value
                } else {
                    candidate.value < best.value
                };
                if better {
                    best = candidate;
                }
            }
            best.clone()
        })
        .collect()
}

pub fn max_by_factor(records: &[Record], factor: usize) -> Vec<Record> {
    block_extreme(records, factor, true)
}

pub fn min_by_factor(records: &[Record], factor: usize) -> Vec<Record> {
    block_extreme(records, factor, false)
}

pub fn avg_by_factor(records: &[Record], factor: usize) -> Vec<Record> {
    if factor <= 1 || records.is_empty() {
        return records.to_vec();
    }
    records
        .chunks(factor)
        .map(|block| {
            let n = block.len() as f64;
            let mean_time = block.iter().map(|r| r.time as f64).sum::<f64>() / n;
            let mean_value = block.iter().map(|r| r.value).sum::<f64>() / n;
            Record::new(mean_time.floor() as i64, round4(mean_value), block[0].channel.clone())
        })
        .collect()
}

/// Largest-Triangle-Three-Buckets downsampling to `target` points.
pub fn lttb(records: &[Record], target: usize) -> Vec<Record> {
    let len = records.len();
    if target >= len {
        return records.to_vec();
    }
    if target == 0 {
        return Vec::new();
    }
    if target == 1 {
        return vec![records[0].clone()];
    }
    if target == 2 {
        return vec![records[0].clone(), records[len - 1].clone()];
    }

    let mut sampled = Vec::with_capacity(target);
    sampled.push(records[0].clone());

    let inner = &records[1..len - 1];
    let bucket_span = (records[len - 1].time - records[0].time) as f64 / (target - 2) as f64;
    let buckets = bucket_boundaries(inner, records[0].time, bucket_span, target - 2);

    let mut selected_idx = 0usize;
    for b in 0..buckets.len() {
        let (lo, hi) = buckets[b];
        if lo >= hi {
            continue;
        }
        let next_bucket = buckets[b + 1..].iter().find(|(l, h)| l < h);
        let (centroid_x, centroid_y) = match next_bucket {
            Some(&(nlo, nhi)) => centroid(&inner[nlo..nhi]),
            None => {
                let last = &records[len - 1];
                (last.time as f64, last.value as f64)
            }
        };

        let a = &sampled[selected_idx.min(sampled.len() - 1)];
        let a_point = (a.time as f64, a.value);
        let mut best_idx = lo;
        let mut best_area = -1.0f64;
        for i in lo..hi {
            let p = &inner[i];
            let area = triangle_area(a_point, (p.time as f64, p.value), (centroid_x, centroid_y));
            if area > best_area {
                best_area = area;
                best_idx = i;
            }
        }
        sampled.push(inner[best_idx].clone());
        selected_idx = sampled.len() - 1;
    }

    sampled.push(records[len - 1].clone());
    sampled
}

fn bucket_boundaries(inner: &[Record], start_time: i64, span: f64, count: usize) -> Vec<(usize, usize)> {
    if inner.is_empty() || span <= 0.0 {
        return vec![(0, 0); count];
    }
    let mut boundaries = Vec::with_capacity(count);
    let mut cursor = 0usize;
    for b in 0..count {
        let hi_time = start_time as f64 + span * (b + 1) as f64;
        let mut end = cursor;
        while end < inner.len() && (inner[end].time as f64) < hi_time {
            end += 1;
        }
        if b == count - 1 {
            end = inner.len();
        }
        boundaries.push((cursor, end));
        cursor = end;
    }
    boundaries
}

fn centroid(records: &[Record]) -> (f64, f64) {
    let n = records.len() as f64;
    let sum_x: f64 = records.iter().map(|r| r.time as f64).sum();
    let sum_y: f64 = records.iter().map(|r| r.value).sum();
    (sum_x / n, sum_y / n)
}

pub fn triangle_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    ((a.0 * (b.1 - c.1)) + (b.0 * (c.1 - a.1)) + (c.0 * (a.1 - b.1))).abs() / 2.0
}
