//! Pipe Sheets CLI - formula grid evaluation tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pipe_sheets::prelude::*;
use pipe_sheets::{
    function_registry, parse_formula, DependencyGraph, ErrorRendering, DEFAULT_MAX_DEPTH,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pipesheets")]
#[command(author, version, about = "Evaluate pipe-delimited formula grids")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every formula and print the resulting grid
    Eval {
        /// Input grid file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cell delimiter
        #[arg(short, long, default_value = "|")]
        delimiter: char,

        /// End every row with a delimiter
        #[arg(long)]
        trailing_delimiter: bool,

        /// Write the error kind (e.g. #CIRCULAR_REFERENCE) instead of #ERROR
        #[arg(long)]
        detailed_errors: bool,

        /// Recursion bound for nested calls, references and copies
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Report malformed formulas, unknown functions and circular references
    Check {
        /// Input grid file
        input: PathBuf,

        /// Cell delimiter
        #[arg(short, long, default_value = "|")]
        delimiter: char,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval {
            input,
            output,
            delimiter,
            trailing_delimiter,
            detailed_errors,
            max_depth,
        } => {
            let write_options = GridWriteOptions {
                delimiter: delimiter_byte(delimiter)?,
                trailing_delimiter,
                errors: if detailed_errors {
                    ErrorRendering::Kind
                } else {
                    ErrorRendering::Generic
                },
                ..Default::default()
            };
            eval(&input, output.as_deref(), &write_options, max_depth)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { input, delimiter } => check(&input, delimiter_byte(delimiter)?),
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() || delimiter == '\n' || delimiter == '\r' {
        bail!("Delimiter must be a single ASCII character other than a line break");
    }
    Ok(delimiter as u8)
}

fn load(input: &Path, delimiter: u8) -> Result<Grid> {
    let options = GridReadOptions {
        delimiter,
        ..Default::default()
    };
    let grid = GridReader::read_file(input, &options)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    info!(path = %input.display(), rows = grid.row_count(), "loaded grid");
    Ok(grid)
}

fn eval(
    input: &Path,
    output: Option<&Path>,
    write_options: &GridWriteOptions,
    max_depth: usize,
) -> Result<()> {
    let mut grid = load(input, write_options.delimiter)?;

    let stats = grid.calculate_with_options(&CalculationOptions {
        max_depth,
        ..Default::default()
    });

    if let Some(output_path) = output {
        GridWriter::write_file(&grid, output_path, write_options)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        debug!(path = %output_path.display(), "wrote grid");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        GridWriter::write(&grid, &mut handle, write_options)
            .context("Failed to write to stdout")?;
        handle.flush().context("Failed to write to stdout")?;
    }

    eprintln!(
        "Calculated {} of {} formulas ({} errors, {} circular)",
        stats.cells_calculated, stats.formula_count, stats.errors, stats.circular_references
    );
    Ok(())
}

fn check(input: &Path, delimiter: u8) -> Result<ExitCode> {
    let grid = load(input, delimiter)?;
    let registry = function_registry();
    let mut problems = 0usize;

    for (addr, body) in grid.formula_cells() {
        match parse_formula(body) {
            Err(e) => {
                println!("{}: malformed formula: {}", addr, e);
                problems += 1;
            }
            Ok(formula) => {
                for name in formula.function_names() {
                    if let Err(e) = registry.lookup(name) {
                        println!("{}: {}", addr, e);
                        problems += 1;
                    }
                }
            }
        }
    }

    for addr in DependencyGraph::from_grid(&grid).circular_cells() {
        println!("{}: circular reference", addr);
        problems += 1;
    }

    if problems == 0 {
        eprintln!("No problems found in '{}'", input.display());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{} problem(s) found in '{}'", problems, input.display());
        Ok(ExitCode::FAILURE)
    }
}
