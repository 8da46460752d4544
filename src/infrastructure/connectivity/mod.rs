pub mod monitor;

pub use monitor::{ConnectivityHandle, ConnectivityMonitor};
