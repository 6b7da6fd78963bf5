//! Command handler for the gobertura CLI.
//!
//! `cmd_convert` returns its summary as a `String`, making it easy to test
//! without capturing stdout.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::convert::{convert, ConvertOptions};
use crate::model::Report;
use crate::source::FsLoader;
use crate::{json, module, profile, xml};

/// Output rendering for the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

/// Everything `cmd_convert` needs, already resolved from flags.
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub input: PathBuf,
    /// `-` writes to stdout.
    pub output: PathBuf,
    pub src: Option<PathBuf>,
    pub pkg: Option<String>,
    pub format: OutputFormat,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// True when the report goes to stdout rather than a file.
pub fn writes_to_stdout(output: &Path) -> bool {
    output == Path::new("-")
}

pub fn cmd_convert(args: &ConvertArgs) -> Result<String> {
    let src = match &args.src {
        Some(src) => src.clone(),
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };
    let package_path = match &args.pkg {
        Some(pkg) => pkg.clone(),
        None => module::read_package_path(&src)
            .context("Failed to resolve the module path; pass --pkg to set it")?,
    };

    let content = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read profile {}", args.input.display()))?;
    let profiles = profile::parse(&content)
        .with_context(|| format!("Failed to parse profile {}", args.input.display()))?;

    let options = ConvertOptions {
        package_path,
        sources: vec![src.display().to_string()],
        timestamp: args.timestamp,
    };
    let report = convert(&profiles, &options, &FsLoader::new(&src))?;

    if writes_to_stdout(&args.output) {
        let stdout = std::io::stdout();
        write_output(&report, args.format, stdout.lock())?;
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create {}", args.output.display()))?;
        write_output(&report, args.format, BufWriter::new(file))?;
    }

    Ok(format!(
        "Wrote {} ({} packages, {}/{} lines covered, {:.1}%)\n",
        args.output.display(),
        report.packages.len(),
        report.lines_covered,
        report.lines_valid,
        report.line_rate * 100.0
    ))
}

fn write_output<W: Write>(report: &Report, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Xml => xml::write_report(report, &mut out)?,
        OutputFormat::Json => {
            json::write_report(report, &mut out)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}
