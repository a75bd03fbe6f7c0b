mod storage;

pub use storage::MemoryStore;
