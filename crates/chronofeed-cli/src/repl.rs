//! Interactive REPL over an in-process engine.
//!
//! Launch with `chronofeed repl`. Engine commands take a JSON object of
//! arguments, e.g. `/publish {"key": "e1", "timelines": ["user_1"]}`.
//! Type `/help` for the built-ins, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::Value;

use chronofeed::Chronofeed;

use crate::commands::CommandRegistry;
use crate::config::history_path;

/// Built-in REPL commands; engine commands are added from the registry.
const BUILTINS: &[(&str, &str)] = &[
    ("/info", "Show engine configuration"),
    ("/commands", "List engine commands"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct FeedHelper {
    commands: Vec<(String, String)>,
}

impl FeedHelper {
    fn new() -> Self {
        let mut commands: Vec<(String, String)> = BUILTINS
            .iter()
            .map(|(cmd, desc)| (cmd.to_string(), desc.to_string()))
            .collect();
        commands.extend(CommandRegistry::list_commands().into_iter().map(|def| {
            (
                format!("/{}", def.name),
                def.description.unwrap_or_default(),
            )
        }));
        Self { commands }
    }
}

impl Completer for FeedHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];
        if input.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| Pair {
                display: format!("{cmd:<16} {desc}"),
                replacement: format!("{cmd} "),
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for FeedHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in &self.commands {
                if cmd.starts_with(line) && cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for FeedHelper {}
impl Validator for FeedHelper {}
impl Helper for FeedHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL against `feed`.
pub fn run(feed: &Chronofeed) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mchronofeed v{}\x1b[0m \x1b[90m\u{2014} fanout timelines\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<FeedHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(FeedHelper::new()));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mfeed>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(feed),
                    "commands" => cmd_commands(),
                    _ => cmd_engine(cmd, args, feed),
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in BUILTINS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Engine commands take JSON arguments: /timeline {{\"key\": \"user_1\"}}");
    eprintln!("  Run /commands to list them.");
    eprintln!();
}

fn cmd_info(feed: &Chronofeed) {
    let config = feed.config();
    eprintln!();
    eprintln!("  Default page size: {}", config.default_per_page);
    eprintln!("  Subevent depth:    {}", config.max_subevent_depth);
    eprintln!();
}

fn cmd_commands() {
    let commands = CommandRegistry::list_commands();
    eprintln!();
    eprintln!("  {} engine commands available:", commands.len());
    eprintln!();
    for def in &commands {
        eprintln!(
            "    /{:<16} {}",
            def.name,
            def.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn cmd_engine(cmd: &str, args: &str, feed: &Chronofeed) {
    let arguments = if args.is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(args) {
            Ok(value) => Some(value),
            Err(e) => {
                eprintln!("  Arguments must be a JSON object: {e}");
                return;
            }
        }
    };

    match CommandRegistry::call(cmd, arguments, feed) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("  Error: {e}"),
        },
        Err(e) => eprintln!("  Error [{}]: {e}", e.code()),
    }
}
