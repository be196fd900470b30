//! # CLI Layer
//!
//! One possible client for dynblock. It is the only place that knows about
//! files, stdout/stderr and exit codes.
//!
//! ## Tables From CSV
//!
//! Every table command takes a CSV path. Column types come from repeated
//! `--schema name:type[:required]` flags; header columns without a schema
//! entry are text. The table is named after the file stem.
//!
//! ## Output
//!
//! Human-readable output goes to stdout, with warnings (skipped rows, removed
//! duplicates) on stderr. `--json` switches stdout to JSON for scripting.
//! Logging is off below `warn` unless `--verbose` or `RUST_LOG` says
//! otherwise.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Logging, config loading and per-command handlers
//! - `render`: Styled terminal output

mod commands;
mod render;
pub mod setup;

pub use commands::run;
