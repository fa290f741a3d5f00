use std::collections::BTreeMap;

use crate::record::Record;

/// Records grouped by channel name, iterated in alphabetical channel order.
pub type ChannelGroup = BTreeMap<String, Vec<Record>>;

/// Groups a flat, arbitrarily-ordered list of records by channel, preserving
/// each channel's relative order.
pub fn group_by_channel(records: impl IntoIterator<Item = Record>) -> ChannelGroup {
    let mut group: ChannelGroup = BTreeMap::new();
    for record in records {
        group.entry(record.channel.clone()).or_default().push(record);
    }
    group
}

/// Flattens a channel group back into a single vector, sorted by time
/// ascending. Channel order among ties follows the group's own (alphabetical)
/// iteration order.
pub fn flatten_sorted(group: &ChannelGroup) -> Vec<Record> {
    let mut all: Vec<Record> = group.values().flatten().cloned().collect();
    all.sort_by_key(|r| r.time);
    all
}

/// Total number of records across all channels.
pub fn count(group: &ChannelGroup) -> usize {
    group.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_preserve_order_within_channel() {
        let records = vec![
            Record::new(3, 1.0, "a"),
            Record::new(1, 2.0, "b"),
            Record::new(2, 3.0, "a"),
        ];
        let group = group_by_channel(records);
        assert_eq!(group["a"].iter().map(|r| r.time).collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(group["b"].len(), 1);
    }

    #[test]
    fn flatten_sorts_by_time() {
        let records = vec![
            Record::new(3, 1.0, "a"),
            Record::new(1, 2.0, "b"),
            Record::new(2, 3.0, "a"),
        ];
        let group = group_by_channel(records);
        let flat = flatten_sorted(&group);
        assert_eq!(flat.iter().map(|r| r.time).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
