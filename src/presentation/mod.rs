//! Presentation Layer
//!
//! - `cli` - clap argument definitions
//! - `factory` - wires infrastructure into the orchestrator
//! - `output` - text/JSON rendering and exit codes

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, Commands, DeployArgs};
pub use factory::{create_cli_orchestrator, create_orchestrator};
pub use output::{exit, exit_code, render_scan, renderer, OutputFormat};
