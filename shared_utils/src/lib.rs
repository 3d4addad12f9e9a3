//! Shared Utilities for vid-gif tools
//!
//! - Logging (stderr + rolling file) and external tool records
//! - External process execution with stderr capture and deadlines
//! - External tool discovery
//! - Path argument hygiene for tool command lines

pub mod external_process;
pub mod logging;
pub mod path_safety;
pub mod tools;

pub use external_process::{run_tool, ExternalProcess, ToolOutput};
pub use logging::{init_logging, LogConfig};
pub use path_safety::safe_path_arg;
pub use tools::find_tool;
