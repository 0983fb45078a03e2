use std::collections::HashMap;
use std::time::Duration;

/// Settings the retrieval core reads, independent of where they came from.
pub trait ConfigProvider: Send + Sync {
    fn service_root(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn connect_timeout(&self) -> Duration;
    fn chunk_size(&self) -> usize;
    fn dataset_aliases(&self) -> &HashMap<String, String>;
}
