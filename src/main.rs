//! classc command line
//!
//! Prints token tables, syntax trees, or the diagnostics of a full check.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use classc::display::{print_ast, token_table};
use classc::feedback::Report;
use classc::frontend::{self, lexer, parser::Parser as ClassParser};

/// classc front end
#[derive(Parser, Debug)]
#[command(name = "classc")]
#[command(version = "0.1.0")]
#[command(about = "Tokenizer, parser and semantic checker for a small class-based language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file, checked when no subcommand is given
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token table
    Tokens {
        input: PathBuf,
    },
    /// Print the syntax tree
    Ast {
        input: PathBuf,
    },
    /// Run the full pipeline and report diagnostics
    Check {
        input: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Tokens { input }) => print_tokens(input),
        Some(Commands::Ast { input }) => print_tree(input),
        Some(Commands::Check { input, format }) => check_file(input, *format),
        None => match &cli.input {
            Some(input) => check_file(input, cli.format),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: classc <FILE> or classc check <FILE>");
                process::exit(2);
            }
        },
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

fn read_source(input: &Path) -> Result<String> {
    info!("reading {}", input.display());
    fs::read_to_string(input).with_context(|| format!("could not read {}", input.display()))
}

/// Returns whether the input was free of lexical errors
fn print_tokens(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    let (tokens, errors) = lexer::tokenize(&source);

    print!("{}", token_table(&tokens));
    for error in &errors {
        eprintln!("lexical error: {}", error);
    }

    Ok(errors.is_empty())
}

/// Returns whether the input parsed
fn print_tree(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    let mut lexer = lexer::Lexer::new(&source);
    let mut parser = ClassParser::new(&mut lexer);

    match parser.parse_program() {
        Ok(program) => {
            print!("{}", print_ast(&program));
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(false)
        }
    }
}

/// Returns whether the run produced no diagnostics
fn check_file(input: &Path, format: Format) -> Result<bool> {
    let source = read_source(input)?;
    let analysis = frontend::run(&source);

    let report = Report::new(
        input.display().to_string(),
        analysis.diagnostics(),
        analysis.tokens.len().saturating_sub(1),
    );

    match format {
        Format::Json => println!("{}", report.to_json()),
        Format::Text => {
            println!("Checking: {}", input.display());
            for diagnostic in &report.diagnostics {
                println!("  {}", diagnostic);
            }
            if report.success {
                println!("  [✓] No errors found");
            } else {
                println!("  {} error(s)", report.diagnostics.len());
            }
        }
    }

    Ok(report.success)
}
