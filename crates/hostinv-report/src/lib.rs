//! hostinv-report: Text, JSON and CSV rendering
//!
//! Every report implements [`Render`] and writes through an [`OutputSink`].

pub mod csv;
pub mod error;
pub mod format;
pub mod hardware;
pub mod packages;
pub mod render;
pub mod sink;
pub mod style;
pub mod system;

pub use error::RenderError;
pub use format::OutputFormat;
pub use hostinv_inventory::InfoLevel;
pub use packages::{PackageList, UpdateList};
pub use render::Render;
pub use sink::OutputSink;
pub use style::Palette;
pub use system::SystemReport;
