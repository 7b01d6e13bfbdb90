//! Server module for Folio
//!
//! Contains the server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `dotenv`: Dotenv preloading (the relay key stays in the files)
//! - `loader`: Configuration loading from files and environment
//! - `providers`: Chat relay construction
//! - `validation`: Production configuration validation
//! - `shutdown`: Ctrl+C / SIGTERM handling
//! - `init`: Router assembly and the run loop

pub mod config;
mod dotenv;
mod init;
mod loader;
mod providers;
mod shutdown;
mod validation;

// Re-export public API
pub use dotenv::preload_default_dotenv;
pub use init::{run, ServeOverrides};
pub use loader::load_config;
