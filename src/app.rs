// Declare modules
pub mod cli;
pub mod config;
pub mod formatter;
pub mod lexer;
pub mod models;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod tree;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::io::IsTerminal;

use self::cli::Cli;
use self::config::{default_schema, load_user_defaults, UserDefaults};
use self::formatter::OutputGenerator;
use self::parser::parse_file;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

pub fn run_with(args: Cli) -> Result<()> {
    // 1. Build the defaults the configuration file overrides
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let user_defaults = if args.no_user_defaults {
        UserDefaults::default()
    } else {
        load_user_defaults()?
    };
    let mut schema = default_schema(&current_dir, &user_defaults);

    // 2. Parse the configuration file
    parse_file(&args.config, &mut schema)?;

    let selected = schema.structure().map_or(0, |tree| tree.len() - 1);
    log::info!(
        "Loaded {} for '{}': {} path(s) selected, {} level {}",
        args.config.display(),
        schema.project_name(),
        selected,
        schema.compress_type(),
        schema.compress_level()
    );
    if selected == 0 {
        log::warn!("No paths selected: the structure block is missing or empty.");
    }

    // 3. Report
    if args.print {
        let styled = std::io::stdout().is_terminal();
        println!("{}", OutputGenerator::generate_config(&schema, styled));
    } else if args.list {
        if let Some(tree) = schema.structure() {
            println!("{}", OutputGenerator::generate_listing(tree));
        }
    }

    Ok(())
}
