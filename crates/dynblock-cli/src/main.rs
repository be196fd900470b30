//! # Dynblock CLI
//!
//! A thin command-line client over the `dynblock` library. It works on CSV
//! lookup tables: printing them, finding and removing duplicate rows,
//! resolving an input the way a lookup action would, and checking parameter
//! property definitions.
//!
//! ## Workspace Structure
//!
//! - `crates/dynblock/` — the library, UI agnostic
//! - `crates/dynblock-cli/` — this binary
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/dynblock-cli/src/cli/)                   │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Logging, config and dispatch (commands.rs)               │
//! │  - Terminal output (render.rs)                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (crates/dynblock/src/)                             │
//! │  - LookupTable, matching, validation, config                │
//! │  - Returns structured Rust values, never prints             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! File reads and writes happen here and only here. The library receives CSV
//! text and hands CSV text back.
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests beside each module plus `crates/dynblock/tests/`.
//! - **CLI**: end-to-end tests in `tests/cli_e2e.rs` run the built binary
//!   against temporary CSV files.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
