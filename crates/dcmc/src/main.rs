//! The DCM type-resolution driver.
//!
//! - `dcmc layout <program.json>` - type a program and print every tuple layout
//!
//! Options:
//! - `--json` - Print layouts and errors as JSON
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use dcm_typeck::{Program, TypeError};
use serde_json::error::Category;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dcmc", version, about = "The DCM type-resolution driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type a program and print the tuple layout of every table and view
    Layout {
        /// Path to a JSON program (tables and views)
        program: PathBuf,

        /// Output layouts and errors as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Why a run failed.
enum Failure {
    /// The program could not be read, or is not JSON.
    Input(String),
    /// The JSON does not describe a program, e.g. a column kind that maps
    /// to no known kind.
    Schema(String),
    /// Type resolution rejected the program.
    Type(TypeError),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dcmc=info,dcm_typeck=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { program, json } => {
            if let Err(failure) = layout(&program, json) {
                report(&failure, json);
                process::exit(1);
            }
        }
    }
}

fn load(path: &Path) -> Result<Program, Failure> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Failure::Input(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| {
        let msg = format!("invalid program {}: {}", path.display(), e);
        match e.classify() {
            Category::Data => Failure::Schema(msg),
            Category::Io | Category::Syntax | Category::Eof => Failure::Input(msg),
        }
    })
}

fn layout(path: &Path, json: bool) -> Result<(), Failure> {
    let program = load(path)?;
    tracing::info!(
        tables = program.tables.len(),
        views = program.views.len(),
        "typing program"
    );
    let meta = dcm_typeck::check(&program).map_err(Failure::Type)?;
    let layouts = meta.layouts();

    if json {
        let out = serde_json::to_string_pretty(&layouts)
            .map_err(|e| Failure::Input(format!("cannot encode layouts: {}", e)))?;
        println!("{}", out);
    } else {
        for layout in &layouts {
            println!("{}", layout);
        }
    }
    Ok(())
}

fn report(failure: &Failure, json: bool) {
    match failure {
        Failure::Input(msg) if json => {
            let out = serde_json::json!({ "code": "C0001", "class": "input", "message": msg });
            eprintln!("{}", out);
        }
        Failure::Schema(msg) if json => {
            let out = serde_json::json!({ "code": "C0002", "class": "input", "message": msg });
            eprintln!("{}", out);
        }
        Failure::Input(msg) | Failure::Schema(msg) => eprintln!("error: {}", msg),
        Failure::Type(err) if json => {
            let class = if err.is_internal() { "internal" } else { "user" };
            let out = serde_json::json!({
                "code": err.code(),
                "class": class,
                "message": err.to_string(),
            });
            eprintln!("{}", out);
        }
        Failure::Type(err) => eprintln!("{}[{}]: {}", err.class(), err.code(), err),
    }
}
