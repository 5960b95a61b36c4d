//! CLI module for lineboard - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for order management,
//! bulk import, audit history, and the default TV display mode.

pub mod commands;

pub use commands::Cli;
