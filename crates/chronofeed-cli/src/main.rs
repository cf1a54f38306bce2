//! Chronofeed CLI — entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use chronofeed::Chronofeed;
use chronofeed_cli::commands::CommandRegistry;
use chronofeed_cli::config::{resolve_config, ConfigOverrides};
use chronofeed_cli::script::run_script_file;

#[derive(Parser)]
#[command(
    name = "chronofeed",
    about = "Fanout-on-write activity timelines — interactive REPL and script runner",
    version
)]
struct Cli {
    /// Path to a JSON engine config file.
    #[arg(short, long)]
    config: Option<String>,

    /// Default page size for timeline reads.
    #[arg(long)]
    per_page: Option<usize>,

    /// Maximum subevent nesting depth when hydrating (default 64, at most 256).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive REPL mode (default).
    Repl,

    /// Execute a script of JSON commands, one per line.
    Run {
        /// Script file.
        script: PathBuf,

        /// Continue past failing commands.
        #[arg(long)]
        keep_going: bool,
    },

    /// Print engine configuration and commands as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   chronofeed completions bash > ~/.local/share/bash-completion/completions/chronofeed
    ///   chronofeed completions zsh > ~/.zfunc/_chronofeed
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = ConfigOverrides {
        config_path: cli.config.clone(),
        per_page: cli.per_page,
        max_depth: cli.max_depth,
    };

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let feed = Chronofeed::new(resolve_config(&overrides)?);
            chronofeed_cli::repl::run(&feed)?;
        }

        Commands::Run { script, keep_going } => {
            let feed = Chronofeed::new(resolve_config(&overrides)?);
            let mut stdout = std::io::stdout().lock();
            let outcome = run_script_file(&script, &mut stdout, &feed, keep_going)?;
            tracing::info!(
                "Executed {} command(s), {} failed",
                outcome.executed,
                outcome.failed
            );
            if outcome.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Info => {
            let config = resolve_config(&overrides)?;
            let commands = CommandRegistry::list_commands();
            let info = serde_json::json!({
                "name": "chronofeed",
                "version": env!("CARGO_PKG_VERSION"),
                "config": config,
                "commands": commands.iter().map(|c| &c.name).collect::<Vec<_>>(),
                "command_count": commands.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "chronofeed", &mut std::io::stdout());
        }
    }

    Ok(())
}
