pub mod error;
pub mod metadata_store;
pub mod multi_slice_reader;
pub mod object_store;
pub mod raw_streamer;
pub mod slice;

pub use error::{StoreError, StoreResult};
pub use multi_slice_reader::MultiSliceReader;
pub use object_store::{InMemoryObjectStore, LocalFsObjectStore, ObjectStore};
pub use raw_streamer::RawStreamer;
pub use slice::{ChannelPayload, Slice};
