//! Default values for configuration fields.

pub const DEFAULT_BACKEND: &str = "file";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RELOAD_AFTER_DELETE: bool = true;
