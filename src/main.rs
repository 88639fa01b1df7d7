mod calculation;
mod calculator;
mod command;
mod config;
mod fileio;
mod history;
mod logging;
mod numeric;
mod util;

use std::io::{self, BufRead, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use crossterm::style::Stylize;
use tracing::{error, info};

use calculator::Calculator;
use command::Command;
use config::CalculatorConfig;
use logging::Logger;
use numeric::operations::OperationRegistry;

const COMMANDS_HELP: &str = "\
  history     - show calculation history
  clear       - clear calculation history
  undo        - undo last change
  redo        - redo last undone change
  save        - save history to CSV
  load        - load history from CSV
  help        - show this help
  exit        - quit";

/// Parse command line arguments
/// Returns the optional config file path
fn parse_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    config_file = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --config requires an argument");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                std::process::exit(1);
            }
        }
    }

    config_file
}

fn print_help() {
    eprintln!("reckon - an interactive decimal calculator with undoable history");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    reckon [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>  Read settings from a TOML file");
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("CALCULATOR_* environment variables (or a .env file) override the config file.");
}

fn repl_help(registry: &OperationRegistry) -> String {
    let ops: Vec<String> = registry
        .names()
        .iter()
        .map(|name| format!("{} a b", name))
        .collect();
    format!("Commands:\n  {}\n{}", ops.join(" | "), COMMANDS_HELP)
}

/// Log panics through the calculator's logger before the default hook runs
fn install_panic_hook(logger: Logger) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        logger.scope(|| {
            if let Some(location) = info.location() {
                error!(file = location.file(), line = location.line(), "panic occurred");
            } else {
                error!("panic occurred");
            }
        });
        default_hook(info);
    }));
}

fn ok(msg: &str) {
    println!("{}", msg.green());
}

fn warn(msg: &str) {
    println!("{}", msg.yellow());
}

fn err(msg: &str) {
    println!("{}", msg.red());
}

fn note(msg: &str) {
    println!("{}", msg.cyan());
}

fn run(calc: &mut Calculator) -> io::Result<()> {
    note("Enhanced Calculator REPL. Type 'help' for commands.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                println!();
                return Ok(());
            }
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Exit => {
                note("Bye!");
                return Ok(());
            }
            Command::Help => println!("{}", repl_help(calc.registry())),
            Command::History => {
                if calc.history().is_empty() {
                    warn("History is empty.");
                }
                for (i, c) in calc.history().iter().enumerate() {
                    note(&format!(
                        "{}. {} | {}({},{}) = {}",
                        i + 1,
                        c.timestamp,
                        c.operation,
                        c.a,
                        c.b,
                        c.result
                    ));
                }
            }
            Command::Clear => {
                calc.clear();
                warn("History cleared.");
            }
            Command::Undo => {
                if calc.undo() {
                    warn("Undo OK.");
                } else {
                    warn("Nothing to undo.");
                }
            }
            Command::Redo => {
                if calc.redo() {
                    warn("Redo OK.");
                } else {
                    warn("Nothing to redo.");
                }
            }
            Command::Save => match calc.save() {
                Ok(()) => ok(&format!(
                    "History saved to {}.",
                    calc.config().history_file().display()
                )),
                Err(e) => err(&format!("Save failed: {}", e)),
            },
            Command::Load => match calc.load() {
                Ok(()) => ok(&format!("History loaded ({} records).", calc.history().len())),
                Err(e) => err(&format!("Load failed: {}", e)),
            },
            Command::Calculate { op, a, b } => match calc.perform(&op, a, b) {
                Ok(result) => ok(&format!("Result: {}", result)),
                Err(e) => err(&format!("Error: {}", e)),
            },
            Command::Invalid(_) => err("Invalid command or arity. Type 'help'."),
        }
    }
}

fn main() -> ExitCode {
    let config_file = parse_args();

    // a missing .env is fine
    dotenv::dotenv().ok();

    let config = match CalculatorConfig::load(config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Configuration error: {}", e).red());
            return ExitCode::FAILURE;
        }
    };

    let logger = match Logger::to_file(&config.log_file()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::FAILURE;
        }
    };

    install_panic_hook(logger.clone());
    logger.scope(|| info!(history = %config.history_file().display(), "calculator started"));

    let mut calc = Calculator::new(config, logger.clone());
    match run(&mut calc) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger.scope(|| error!(error = %e, "terminal I/O failed"));
            eprintln!("{}", format!("I/O error: {}", e).red());
            ExitCode::FAILURE
        }
    }
}
