//! hostinv-inventory: host hardware and system inventory
//!
//! Parses `/proc`, `/sys` and `/etc` pseudo-files plus the output of a few
//! host utilities into typed snapshots.

pub mod error;
pub mod hardware;
pub mod network;
pub mod parse;
pub mod probe;
pub mod system;
pub mod types;

pub use error::InventoryError;
pub use hardware::HardwareCollector;
pub use network::{AddressSource, InterfaceAddress, SystemAddressSource};
pub use probe::{DEFAULT_COMMAND_TIMEOUT, Probe};
pub use system::SystemCollector;
pub use types::{
    CpuInfo, DiskInfo, HardwareSnapshot, InfoLevel, InfoMap, LoadAverage, MemoryInfo,
    NetworkInterface, SystemSnapshot,
};
