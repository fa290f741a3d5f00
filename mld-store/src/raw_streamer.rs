use std::sync::Arc;

use mld_core::record;
use mld_core::Record;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object_store::ObjectStore;

/// Heuristic byte width of one CSV line, used to size range requests against
/// an unbounded raw blob.
const SIZE_ONE_LINE: u64 = 50;

/// Incrementally streams a raw CSV blob, one `number_per_slice`-record slice
/// at a time, stitching together lines that straddle a byte-range boundary.
pub struct RawStreamer {
    store: Arc<dyn ObjectStore>,
    key: String,
    number_per_slice: usize,
    file_pointer: u64,
    carry: Vec<String>,
    eof: bool,
}

impl RawStreamer {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>, number_per_slice: usize) -> Self {
        Self {
            store,
            key: key.into(),
            number_per_slice,
            file_pointer: 0,
            carry: Vec::new(),
            eof: false,
        }
    }

    pub fn readable(&self) -> bool {
        !self.eof || !self.carry.is_empty()
    }

    /// Returns up to `number_per_slice` parsed records, or an empty vector
    /// once the stream is exhausted.
    pub async fn read_next_slice(&mut self) -> StoreResult<Vec<Record>> {
        if self.carry.len() <= self.number_per_slice {
            self.fetch_until_enough().await?;
        }

        let take = self.carry.len().min(self.number_per_slice);
        let lines: Vec<String> = self.carry.drain(..take).collect();
        let mut records = Vec::with_capacity(lines.len());
        for line in lines {
            if let Some(rec) = record::parse(&line)? {
                records.push(rec);
            }
        }
        Ok(records)
    }

    async fn fetch_until_enough(&mut self) -> StoreResult<()> {
        while !self.eof && self.carry.len() <= self.number_per_slice {
            let want = self.number_per_slice as u64 * SIZE_ONE_LINE;
            let range_end = self.file_pointer + want;
            let chunk = match self.store.get_range(&self.key, self.file_pointer, range_end).await {
                Ok(bytes) => bytes,
                Err(StoreError::RangeNotSatisfiable) => {
                    self.eof = true;
                    break;
                }
                Err(other) => return Err(other),
            };
            if chunk.is_empty() {
                self.eof = true;
                break;
            }
            self.file_pointer += chunk.len() as u64;
            let text = String::from_utf8_lossy(&chunk).into_owned();
            let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
            if let Some(prev_tail) = self.carry.pop() {
                if let Some(first) = lines.first_mut() {
                    *first = format!("{prev_tail}{first}");
                } else {
                    lines.push(prev_tail);
                }
            }
            debug!(bytes = chunk.len(), pointer = self.file_pointer, "fetched raw range");
            self.carry.extend(lines);
        }
        Ok(())
    }
}
