//! Library surface of the Relict CLI, exposing the subcommand
//! implementations for the binary entry point.

pub mod commands;
