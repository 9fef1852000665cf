//! Surface expression CLI
//!
//! A command-line interface for scanning, parsing, printing and evaluating expressions.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;
use std::time::Instant;
use surface_expression::lexer::{Scanner, TokenKind};
use surface_expression::{parse, EvalContext, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "surface-expression")]
#[command(author, version, about = "Parse and evaluate JavaScript expressions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream
    Tokens {
        /// The file or code to scan
        input: String,
    },

    /// Parse and display the AST
    Ast {
        /// The file or code to parse
        input: String,
    },

    /// Parse and print the expression back as source
    Print {
        /// The file or code to parse
        input: String,
    },

    /// Evaluate an expression against a scope
    Eval {
        /// The file or code to evaluate
        input: String,

        /// Scope object as JSON, or a path to a JSON file
        #[arg(short, long, value_name = "JSON")]
        scope: Option<String>,

        /// Memoize member, `this` and unary results
        #[arg(long)]
        cache: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Evaluate this many times and report timing
        #[arg(long, value_name = "N", default_value_t = 1)]
        repeat: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Tokens { input } => show_tokens(&input),
        Commands::Ast { input } => show_ast(&input),
        Commands::Print { input } => print_expression(&input),
        Commands::Eval {
            input,
            scope,
            cache,
            json,
            repeat,
        } => eval_expression(&input, scope.as_deref(), cache, json, repeat),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read `input` as a file when it names one, otherwise use it as source text
fn read_input(input: &str) -> anyhow::Result<String> {
    if Path::new(input).is_file() {
        fs::read_to_string(input).with_context(|| format!("Error reading '{}'", input))
    } else {
        Ok(input.to_string())
    }
}

fn show_tokens(input: &str) -> anyhow::Result<()> {
    let source = read_input(input)?;
    let mut scanner = Scanner::new(&source);
    loop {
        let token = scanner.next_token()?;
        if token.kind == TokenKind::Eof {
            break;
        }
        println!(
            "{:>4}:{:<4} {:?} {}",
            token.line_number, token.column, token.kind, token.raw
        );
    }
    Ok(())
}

fn show_ast(input: &str) -> anyhow::Result<()> {
    let source = read_input(input)?;
    let expr = parse(&source)?;
    println!("{:#?}", expr);
    Ok(())
}

fn print_expression(input: &str) -> anyhow::Result<()> {
    let source = read_input(input)?;
    let expr = parse(&source)?;
    println!("{}", expr);
    Ok(())
}

fn load_scope(scope: Option<&str>) -> anyhow::Result<Value> {
    let Some(scope) = scope else {
        return Ok(Value::new_object());
    };
    let text = read_input(scope)?;
    let json: serde_json::Value =
        serde_json::from_str(&text).context("Scope is not valid JSON")?;
    if !json.is_object() {
        bail!("Scope must be a JSON object");
    }
    Ok(Value::from_json(&json))
}

fn eval_expression(
    input: &str,
    scope: Option<&str>,
    cache: bool,
    json: bool,
    repeat: u32,
) -> anyhow::Result<()> {
    let source = read_input(input)?;
    let scope = load_scope(scope)?;
    let expr = parse(&source)?;

    let mut ctx = if cache {
        EvalContext::with_cache()
    } else {
        EvalContext::new()
    };

    let start = Instant::now();
    let mut value = Value::Undefined;
    for _ in 0..repeat.max(1) {
        value = expr.evaluate_with(&scope, &mut ctx)?;
    }
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{:?}", value);
    }

    if repeat > 1 {
        eprintln!(
            "{} evaluations in {:.2?} ({:.2?} each, {} cache hits)",
            repeat,
            elapsed,
            elapsed / repeat,
            ctx.cache_hits()
        );
    }
    Ok(())
}
