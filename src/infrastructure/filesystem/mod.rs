pub mod plain_copy;
pub mod stream_store;

pub use stream_store::{find_container_root, load_baseline_config, StreamStore, BASELINE_FILE, STREAM_FILE};
