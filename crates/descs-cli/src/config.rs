//! Layered configuration for the `build` and `compare` subcommands.
//!
//! Values are resolved in order: command line arguments, `--set` overrides,
//! the TOML file passed with `--config`, then [`defaults::DefaultsConfig`].

mod builder;
mod defaults;
mod file;

pub use builder::{build_config, compare_config};
