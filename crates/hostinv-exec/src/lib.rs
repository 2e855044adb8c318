//! hostinv-exec: Command execution abstraction
//!
//! Runs host utilities (`df`, `uname`, `who`, package managers) and captures
//! their output, distinguishing "could not run" from "ran and failed".

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::{LocalExecutor, shell_quote};
pub use result::CommandResult;
pub use traits::CommandExecutor;
