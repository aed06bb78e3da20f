// Public modules
pub mod archive;
pub mod command_source;
pub mod config;
pub mod dumper;
pub mod error;
pub mod http;
pub mod paths;
pub mod realm;
pub mod runner;
pub mod settings;
pub mod signing;
pub mod subnet;
pub mod wallet;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
