use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gobertura::cli::{self, ConvertArgs, OutputFormat};

/// gobertura — Convert a Go coverage profile into a Cobertura XML report.
#[derive(Parser)]
#[command(name = "gobertura", version, about)]
struct Cli {
    /// Path of the coverage profile.
    #[arg(long = "in", default_value = "coverprofile.txt")]
    input: PathBuf,

    /// Output path ("-" for stdout).
    #[arg(long, default_value = "coverage.xml")]
    out: PathBuf,

    /// Go source folder (default: current working directory).
    #[arg(long)]
    src: Option<PathBuf>,

    /// Package import path prefix (default: read from go.mod).
    #[arg(long)]
    pkg: Option<String>,

    /// Report format.
    #[arg(long, value_enum, default_value = "xml")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    env_logger::init();

    let opts = Cli::parse();
    let args = ConvertArgs {
        input: opts.input,
        output: opts.out,
        src: opts.src,
        pkg: opts.pkg,
        format: opts.format,
        timestamp: chrono::Utc::now().timestamp_millis(),
    };

    let summary = cli::cmd_convert(&args)?;
    if cli::writes_to_stdout(&args.output) {
        eprint!("{}", summary);
    } else {
        print!("{}", summary);
    }
    Ok(())
}
