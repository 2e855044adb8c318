//! hostinv-pkg: Installed package inventory
//!
//! Detects the host's package database family and reads it through the
//! matching backend (dpkg/apt or rpm/dnf).

pub mod collector;
pub mod deb;
pub mod detect;
pub mod error;
pub mod rpm;
pub mod traits;
pub mod types;

pub use collector::PackageCollector;
pub use deb::DebBackend;
pub use detect::detect_system_type;
pub use error::PackageError;
pub use rpm::RpmBackend;
pub use traits::PackageBackend;
pub use types::{Package, PackageStatistics, SystemType, UpgradablePackage};
