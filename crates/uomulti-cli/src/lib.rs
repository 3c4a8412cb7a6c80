//! Command-line front end for uomulti.
//!
//! The binary is a thin wrapper: it parses [`Cli`], installs logging and
//! calls [`run`]. The subcommands live here so they can be exercised
//! without spawning a process.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command, ContainerArgs, ContainerLocation};
pub use commands::{load_config, run};
