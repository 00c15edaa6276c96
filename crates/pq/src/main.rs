use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use thiserror::Error;

mod cli;

use cli::Cli;
use provql_rs::filter::{translate_filter, FilterError, FILTER_GRAMMAR};
use provql_rs::schema::{EntityKind, FieldSet};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(
        "unknown entity kind '{0}' (expected one of: AuthInfo, Comment, Computer, Group, Log, Node, User, Link)"
    )]
    UnknownEntity(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.no_color {
                eprintln!("Error: {e}");
            } else {
                eprintln!("{} {e}", "Error:".red());
            }
            error_exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.grammar {
        print!("{FILTER_GRAMMAR}");
        return Ok(());
    }

    let filter = cli.filter.as_deref().unwrap_or_default();
    let fields = match &cli.entity {
        Some(name) => {
            let kind = EntityKind::from_name(name)
                .ok_or_else(|| CliError::UnknownEntity(name.clone()))?;
            Some(FieldSet::for_entity(kind))
        }
        None => None,
    };

    let map = translate_filter(filter, fields.as_ref())?;
    let rendered = if cli.compact {
        serde_json::to_string(&map)?
    } else {
        serde_json::to_string_pretty(&map)?
    };
    println!("{rendered}");
    Ok(())
}

/// Returns the numeric exit code for an error.
fn error_code(e: &CliError) -> u8 {
    match e {
        CliError::Filter(FilterError::Lex(_) | FilterError::Parse(_)) => 1,
        CliError::Filter(FilterError::Semantic(_)) => 2,
        CliError::Json(_) => 1,
        CliError::UnknownEntity(_) => 5,
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CliError) -> ExitCode {
    ExitCode::from(error_code(e))
}
