use mld_core::channel_group::ChannelGroup;
use mld_core::record;
use mld_core::Strategy;

use crate::error::StoreResult;
use crate::object_store::ObjectStore;
use crate::slice::{self, ChannelPayload};

/// A transient, per-request reader that merges several slice paths (assumed
/// already time-ordered by the caller) into one channel group, filtered to
/// an optional `[start, end]` window. Not persisted; built fresh per fetch.
pub struct MultiSliceReader {
    group: ChannelGroup,
}

impl MultiSliceReader {
    pub async fn read(
        store: &dyn ObjectStore,
        paths: &[String],
        start: Option<i64>,
        end: Option<i64>,
    ) -> StoreResult<Self> {
        let mut group = ChannelGroup::new();
        for path in paths {
            let bytes = store.get_all(path).await?;
            let text = String::from_utf8_lossy(&bytes);
            for line in text.split('\n') {
                let Some(rec) = record::parse(line)? else {
                    continue;
                };
                if start.is_some_and(|s| rec.time < s) {
                    continue;
                }
                if end.is_some_and(|e| rec.time > e) {
                    continue;
                }
                group.entry(rec.channel.clone()).or_default().push(rec);
            }
        }
        Ok(Self { group })
    }

    pub fn count(&self) -> usize {
        mld_core::channel_group::count(&self.group)
    }

    pub fn downsample(&self, strategy: Strategy, factor: usize, max_records: Option<usize>) -> ChannelGroup {
        let mut out = ChannelGroup::new();
        for (channel, records) in &self.group {
            let effective_factor = match max_records {
                Some(n) if n > 0 => slice::ceil_div(records.len(), n),
                Some(_) => 1,
                None => factor,
            };
            out.insert(channel.clone(), strategy.apply(records, effective_factor.max(1)));
        }
        out
    }

    pub fn format_response(&self) -> Vec<ChannelPayload> {
        slice::format_channel_group(&self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::InMemoryObjectStore;
    use mld_core::Record;

    #[tokio::test]
    async fn merges_and_filters_by_window() {
        let store = InMemoryObjectStore::new();
        store.put("a", "0,1.0,ch\n10,2.0,ch".into()).await.unwrap();
        store.put("b", "20,3.0,ch\n30,4.0,ch".into()).await.unwrap();

        let reader = MultiSliceReader::read(&store, &["a".into(), "b".into()], Some(5), Some(25))
            .await
            .unwrap();
        assert_eq!(reader.count(), 2);
        let payload = reader.format_response();
        assert_eq!(payload[0].data, vec![[10.0, 2.0], [20.0, 3.0]]);
    }

    #[test]
    fn downsample_respects_target_records() {
        let mut group = ChannelGroup::new();
        group.insert("ch".into(), (0..20).map(|i| Record::new(i, i as f64, "ch")).collect());
        let reader = MultiSliceReader { group };
        let out = reader.downsample(Strategy::Avg, 1, Some(4));
        assert_eq!(out["ch"].len(), 4);
    }
}
