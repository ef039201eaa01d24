use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use fhost_lib::cli::commands::{Cli, Commands};
use fhost_lib::operations::{parse_line, Command, Dispatcher, Script};
use fhost_lib::{Config, FileStore};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())
        .with_context(|| "Failed to load configuration")?;

    // --log-level wins over the config file; RUST_LOG wins over both
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log.level.clone())
        .unwrap_or_else(|| "info".to_string());
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", level));

    match cli.command {
        Commands::Run {
            script,
            keep_going,
            history,
        } => {
            let stop_on_error = config.dispatch.stop_on_error && !keep_going;
            cmd_run(&script, stop_on_error, history)?;
        }
        Commands::Exec { keep_going } => {
            let stop_on_error = config.dispatch.stop_on_error && !keep_going;
            cmd_exec(stop_on_error)?;
        }
    }

    Ok(())
}

/// Run a TOML command script
fn cmd_run(script_path: &Path, stop_on_error: bool, show_history: bool) -> Result<()> {
    info!("Running script {:?}", script_path);

    let script = Script::load(script_path)
        .with_context(|| format!("Failed to load script: {:?}", script_path))?;

    let mut dispatcher = Dispatcher::new(FileStore::new()).stop_on_error(stop_on_error);
    let outputs = dispatcher
        .run(&script.commands)
        .with_context(|| format!("Script {:?} failed", script_path))?;

    for output in &outputs {
        println!("{}", output);
    }

    info!("Ran {} command(s)", outputs.len());

    if show_history {
        print_history(dispatcher.store());
    }

    Ok(())
}

/// Execute commands read line by line from stdin
fn cmd_exec(stop_on_error: bool) -> Result<()> {
    let mut dispatcher = Dispatcher::new(FileStore::new());
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.with_context(|| "Failed to read from stdin")?;
        let line_no = line_no + 1;

        let result = parse_line(&line)
            .map_err(anyhow::Error::from)
            .and_then(|raw| match raw {
                Some(raw) => {
                    let command = Command::parse(&raw)?;
                    Ok(Some(dispatcher.execute(&command)?))
                }
                None => Ok(None),
            });

        match result {
            Ok(Some(output)) => writeln!(stdout, "{}", output)?,
            Ok(None) => {}
            Err(e) if stop_on_error => {
                error!("line {}: {}", line_no, e);
                return Err(e.context(format!("line {}", line_no)));
            }
            Err(e) => {
                warn!("line {}: {}", line_no, e);
                writeln!(stdout, "null")?;
            }
        }
        stdout.flush()?;
    }

    Ok(())
}

/// Print a summary of the history log
fn print_history(store: &FileStore) {
    let history = store.history();
    println!();
    println!("History ({} entries):", history.len());
    for (i, entry) in history.iter().enumerate() {
        let mut names: Vec<&str> = entry.snapshot().keys().map(String::as_str).collect();
        names.sort_unstable();
        println!(
            "  #{:<4} {}  {} file(s): {}",
            i,
            entry.timestamp(),
            names.len(),
            names.join(", ")
        );
    }
}
