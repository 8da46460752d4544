pub mod memory;
pub mod wire;

pub use memory::MemoryRemoteStore;
