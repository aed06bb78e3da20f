/// Macro for stage-prefixed progress logging.
///
/// Usage:
/// ```ignore
/// log_status!("upload", "Uploading {} to {}", archive, address);
/// log_status!("run", "[{}/{}] {}", index, total, command);
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        ::tracing::info!(stage = $prefix, "{}", format_args!($($arg)*))
    };
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `autodumper::config` instead of `autodumper::core::config`
pub use core::*;
pub use utils::*;
