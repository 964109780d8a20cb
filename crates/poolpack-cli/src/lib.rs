//! Command-line interface for the poolpack build pipeline.
//!
//! - [`cli`] - argument definitions
//! - `commands` - one module per subcommand
//! - [`error`] - CLI errors and their conversion to `miette` diagnostics
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - status lines and formatting for the terminal
//!
//! # Example
//!
//! ```rust,no_run
//! use poolpack_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
