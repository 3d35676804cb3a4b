//! Compile templates from the command line and print the generated Lua, or
//! render them with JSON data.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fmpl")]
#[command(about = "Compile templates into Lua render procedures")]
struct Args {
    /// Log compilation details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the rendered output instead of the generated Lua
    #[arg(long)]
    render: bool,

    /// JSON file with the data to render with, implies --render
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Template files to compile, `-` or nothing reads from stdin
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default = if args.verbose { "fmpl=debug" } else { "fmpl=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<fmpl::Error>() {
                Some(e) if e.span().is_some() => eprintln!("error: {e:#}"),
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let engine = fmpl::Engine::new();
    let data = match &args.data {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read data `{}`", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse data `{}`", path.display()))?
        }
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    let render = args.render || args.data.is_some();

    let files = if args.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.files
    };

    let mut stdout = io::stdout().lock();
    for file in files {
        let procedure = if file.as_os_str() == "-" {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            engine.compile(&source)?
        } else {
            engine.compile_file(&file)?
        };
        tracing::debug!(file = %file.display(), "compiled");

        if render {
            procedure.render(&data).to_writer(&mut stdout)?;
        } else {
            stdout.write_all(procedure.source().as_bytes())?;
        }
    }
    stdout.flush()?;
    Ok(())
}
