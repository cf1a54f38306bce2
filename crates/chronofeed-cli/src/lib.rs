//! Chronofeed CLI — drive an in-process timeline engine from a REPL or a script.

pub mod commands;
pub mod config;
pub mod error;
pub mod repl;
pub mod script;

pub use commands::CommandRegistry;
pub use config::{resolve_config, ConfigOverrides};
pub use error::{CliError, CliResult};
pub use script::{run_script, run_script_file, ScriptOutcome};
