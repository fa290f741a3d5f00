use mld_core::channel_group::{self, ChannelGroup};
use mld_core::record::{self, Record};
use mld_core::Strategy;

use crate::error::StoreResult;
use crate::object_store::ObjectStore;

/// A `ChannelPayload` is one channel's `[time, value]` series, the shape a
/// fetch response sends back per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPayload {
    pub name: String,
    pub data: Vec<[f64; 2]>,
}

/// One append-only, immutable-once-preprocessed slice of one level.
pub struct Slice {
    pub path: String,
    pub records: ChannelGroup,
    pub start_timestamp: i64,
}

impl Slice {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            records: ChannelGroup::new(),
            start_timestamp: -1,
        }
    }

    pub async fn read(store: &dyn ObjectStore, path: impl Into<String>) -> StoreResult<Self> {
        let path = path.into();
        let bytes = store.get_all(&path).await?;
        let text = String::from_utf8_lossy(&bytes);
        let mut slice = Slice::new(path);
        for line in text.split('\n') {
            if let Some(rec) = record::parse(line)? {
                if slice.start_timestamp == -1 {
                    slice.start_timestamp = rec.time;
                }
                slice.records.entry(rec.channel.clone()).or_default().push(rec);
            }
        }
        Ok(slice)
    }

    /// Persists the slice. When `explicit_records` is given it is written
    /// verbatim, preserving caller order (used by the raw split step, which
    /// must not re-sort level 0's natural source order). Otherwise the
    /// channel group is flattened and sorted by time. A slice with no
    /// records is not written.
    pub async fn save(&self, store: &dyn ObjectStore, explicit_records: Option<&[Record]>) -> StoreResult<()> {
        let ordered: Vec<Record> = match explicit_records {
            Some(records) => records.to_vec(),
            None => channel_group::flatten_sorted(&self.records),
        };
        match record::encode(&ordered) {
            Some(body) => store.put(&self.path, body).await,
            None => Ok(()),
        }
    }

    /// Extends each channel with `group`'s records, tracking the earliest
    /// first-record time seen.
    pub fn add(&mut self, group: ChannelGroup) {
        for (channel, mut records) in group {
            if self.start_timestamp == -1 {
                if let Some(first) = records.first() {
                    self.start_timestamp = first.time;
                }
            } else if let Some(first) = records.first() {
                if first.time < self.start_timestamp {
                    self.start_timestamp = first.time;
                }
            }
            self.records.entry(channel).or_default().append(&mut records);
        }
    }

    pub fn count(&self) -> usize {
        channel_group::count(&self.records)
    }

    pub fn first_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    /// Downsamples each channel. When `max_records` is given, the per-channel
    /// factor is derived as `ceil(len / max_records)`; otherwise `factor` is
    /// used as-is.
    pub fn downsample(&self, strategy: Strategy, factor: usize, max_records: Option<usize>) -> ChannelGroup {
        let mut out = ChannelGroup::new();
        for (channel, records) in &self.records {
            let effective_factor = match max_records {
                Some(n) if n > 0 => ceil_div(records.len(), n),
                Some(_) => 1,
                None => factor,
            };
            out.insert(channel.clone(), strategy.apply(records, effective_factor.max(1)));
        }
        out
    }

    pub fn format_response(&self) -> Vec<ChannelPayload> {
        format_channel_group(&self.records)
    }
}

pub(crate) fn ceil_div(len: usize, target: usize) -> usize {
    if target == 0 {
        return 1;
    }
    (len + target - 1) / target
}

pub(crate) fn format_channel_group(group: &ChannelGroup) -> Vec<ChannelPayload> {
    group
        .iter()
        .map(|(name, records)| ChannelPayload {
            name: name.clone(),
            data: records.iter().map(|r| [r.time as f64, r.value]).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::InMemoryObjectStore;

    #[tokio::test]
    async fn save_then_read_round_trips() {
        let store = InMemoryObjectStore::new();
        let mut slice = Slice::new("trace/level0/s0.csv");
        slice.add(mld_core::channel_group::group_by_channel(vec![
            Record::new(2, 1.0, "a"),
            Record::new(1, 2.0, "b"),
        ]));
        slice.save(&store, None).await.unwrap();

        let read_back = Slice::read(&store, "trace/level0/s0.csv").await.unwrap();
        assert_eq!(read_back.count(), 2);
        assert_eq!(read_back.start_timestamp, 1);
    }

    #[tokio::test]
    async fn empty_slice_does_not_write() {
        let store = InMemoryObjectStore::new();
        let slice = Slice::new("trace/level0/s0.csv");
        slice.save(&store, None).await.unwrap();
        assert!(!store.exists("trace/level0/s0.csv").await.unwrap());
    }

    #[tokio::test]
    async fn explicit_records_preserve_order() {
        let store = InMemoryObjectStore::new();
        let slice = Slice::new("trace/level0/s0.csv");
        let records = vec![Record::new(5, 1.0, "a"), Record::new(1, 2.0, "a")];
        slice.save(&store, Some(&records)).await.unwrap();
        let bytes = store.get_all("trace/level0/s0.csv").await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let first_line = text.lines().next().unwrap();
        assert!(first_line.starts_with("5,"));
    }

    #[test]
    fn downsample_uses_max_records_when_given() {
        let mut slice = Slice::new("p");
        slice.add(mld_core::channel_group::group_by_channel(
            (0..10).map(|i| Record::new(i, i as f64, "a")),
        ));
        let out = slice.downsample(Strategy::Max, 1, Some(5));
        assert_eq!(out["a"].len(), 5);
    }
}
