//! # Dynblock Architecture
//!
//! Dynblock manages the metadata behind parametric ("dynamic") drawing blocks:
//! parameters with their grips, lookup actions that map an input value to an
//! output through a table, and the selection sets those actions drive. All of
//! it is persisted as tagged attribute records in per-entity dictionaries.
//!
//! It is a library first. The `dynblock` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (dynblock-cli crate)                                   │
//! │  - Reads CSV files, parses arguments, prints results        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Facade over commands, owns config and selection sets     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)                                   │
//! │  - Create, load, update and resolve parameters and actions  │
//! │  - Multi-record changes are committed as one batch          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store (store/) + Records (records/, table/record.rs)       │
//! │  - AttributeBackend trait, MemBackend for tests and tools   │
//! │  - DomainRecord <-> tagged fields <-> bytes (codec/)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Beside the stack sit the pure data modules: [`table`] (typed lookup
//! tables, CSV, duplicate detection), [`matching`] (exact, fuzzy, range and
//! regex resolution against a table) and [`validation`] (parameter property
//! rules). They do no storage and can be used on their own.
//!
//! ## No I/O in the core
//!
//! Nothing in this crate writes to stdout/stderr, touches files other than
//! the config search paths, or exits the process. Diagnostics go through
//! `tracing`; the caller decides whether and where to print them.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`commands`]: Operations on parameters, actions and stored records
//! - [`store`]: Attribute backends, batches and the typed store
//! - [`records`]: Domain records and their tagged-field layouts
//! - [`codec`]: Tagged variants and the binary wire format
//! - [`table`]: Lookup tables
//! - [`matching`]: Input resolution against lookup tables
//! - [`validation`]: Identifiers and parameter properties
//! - [`model`]: Handles and weak references
//! - [`config`]: Configuration loading
//! - [`error`]: Error types

pub mod api;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod matching;
pub mod model;
pub mod records;
pub mod store;
pub mod table;
pub mod validation;
