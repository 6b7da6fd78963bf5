#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use gobertura::convert::{convert, ConvertOptions};
use gobertura::model::Report;
use gobertura::profile;

/// Directory holding the `example.com/shapes` module used by the tests.
pub fn shapes_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shapes")
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// In-memory module sources keyed by module-relative file name.
pub fn sources(files: &[(&str, &str)]) -> HashMap<String, String> {
    files
        .iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect()
}

/// Convert `profile_text` against in-memory sources under the module
/// `example.com/m`.
pub fn convert_str(
    profile_text: &str,
    files: &[(&str, &str)],
) -> gobertura::error::Result<Report> {
    let profiles = profile::parse(profile_text.as_bytes())?;
    let options = ConvertOptions {
        package_path: "example.com/m/".to_string(),
        sources: vec!["/src/m".to_string()],
        timestamp: 1_700_000_000_000,
    };
    convert(&profiles, &options, &sources(files))
}

/// (number, hits) pairs of a method's ledger.
pub fn entries(report: &Report, pkg: usize, class: usize, method: usize) -> Vec<(u32, u64)> {
    report.packages[pkg].classes[class].methods[method]
        .lines
        .iter()
        .map(|l| (l.number, l.hits))
        .collect()
}
