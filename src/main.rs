use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use anyhow::{anyhow, bail};
use clap::Parser;
use ebc::{
    compiler::{compiler::compile, config::CompilerOptions},
    display_error,
    errors::errors::Error,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Analyses an eb program and writes the IR listing of every file.
#[derive(Parser, Debug)]
#[command(name = "ebc", version, about)]
struct Args {
    /// Root source file
    input: PathBuf,

    /// Directory for IR listings and sidecars
    #[arg(long)]
    out_build: Option<PathBuf>,

    /// Name of the executable to produce
    #[arg(long)]
    out_exec: Option<String>,

    /// Analyse every file even when its sidecar is up to date
    #[arg(long)]
    force: bool,

    /// Neither read nor write sidecars
    #[arg(long)]
    no_cache: bool,

    /// Log every pipeline stage
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("could not install the logger: {}", error))
}

fn report(error: &Error) {
    // Errors outside any source file render without an excerpt.
    let source = fs::read_to_string(error.get_position().file.as_str()).unwrap_or_default();
    eprint!("{}", display_error(error, &source));
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    if !args.input.is_file() {
        bail!("input file {} does not exist", args.input.display());
    }

    let mut options = CompilerOptions {
        out_exec: args.out_exec,
        force_recompile: args.force,
        use_cache: !args.no_cache,
        ..Default::default()
    };
    if let Some(out_build) = args.out_build {
        options.out_build = out_build;
    }

    let start = Instant::now();

    let compiler = match compile(&args.input, options) {
        Ok(compiler) => compiler,
        Err(error) => {
            report(&error);
            return Ok(ExitCode::FAILURE);
        }
    };

    for file in compiler.files() {
        let status = if file.from_cache { "Cached" } else { "Analysed" };
        println!(
            "{} {} -> {}",
            status,
            file.name,
            compiler.options.listing_path(&file.name).display()
        );
    }

    if let Some(out_exec) = &compiler.options.out_exec {
        info!(out_exec = out_exec.as_str(), "linking is left to the backend");
    }
    println!("Total time: {:?}", start.elapsed());

    Ok(ExitCode::SUCCESS)
}
