//! Command line entry point for the mock HTTP server.

pub mod commands;

pub use commands::serve::ServeCommand;
