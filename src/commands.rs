//! Commands for the mock HTTP server CLI.

/// Command for serving mock responses.
pub mod serve;
