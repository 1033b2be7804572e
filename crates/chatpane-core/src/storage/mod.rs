pub mod file;
pub mod store;

pub use file::FileStore;
pub use store::{KeyValueStore, MemoryStore};
