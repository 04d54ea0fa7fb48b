//! Command line interface module
//!
//! Argument parsing and the [`Runner`] that drives one complete mirror run: validate the
//! configuration, log in, mirror every image and write the restore script.

pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::Runner;
