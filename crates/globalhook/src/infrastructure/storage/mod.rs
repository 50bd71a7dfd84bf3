//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the
//! platform-appropriate directory (or an explicit `--config` path), fills in
//! defaults on first run and can write the file back.

pub mod config;
