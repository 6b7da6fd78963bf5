use log::{debug, info};

use crate::aggregate;
use crate::error::Result;
use crate::locate::FileContext;
use crate::model::Report;
use crate::profile::Profile;
use crate::source::SourceLoader;
use crate::syntax;

/// Inputs to a conversion run that do not come from the profile itself.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Import path prefix stripped from profile file names, e.g.
    /// `example.com/shapes/`.
    pub package_path: String,
    /// Source roots listed in the report.
    pub sources: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Directory part of a file name, which names its package. Files at the
/// module root belong to the package `""`.
pub fn package_dir(file_name: &str) -> &str {
    match file_name.rfind('/') {
        Some(idx) => file_name[..idx].trim_end_matches('/'),
        None => "",
    }
}

/// Build a report from parsed profiles, processing files in order. Any
/// source that cannot be read or parsed aborts the whole conversion.
pub fn convert(
    profiles: &[Profile],
    options: &ConvertOptions,
    loader: &dyn SourceLoader,
) -> Result<Report> {
    let mut report = Report::new(options.sources.clone(), options.timestamp);

    for profile in profiles {
        convert_profile(&mut report, profile, &options.package_path, loader)?;
    }

    aggregate::finalize(&mut report);
    debug_assert!(aggregate::is_consistent(&report));

    info!(
        "{} packages, {}/{} lines covered",
        report.packages.len(),
        report.lines_covered,
        report.lines_valid
    );
    Ok(report)
}

fn convert_profile(
    report: &mut Report,
    profile: &Profile,
    package_path: &str,
    loader: &dyn SourceLoader,
) -> Result<()> {
    let file_name = profile
        .file_name
        .strip_prefix(package_path)
        .unwrap_or(&profile.file_name);

    let source = loader.load(file_name)?;
    let parsed = syntax::parse_file(file_name, &source)?;

    let package = report.package_mut(package_dir(file_name));
    let methods =
        FileContext::new(file_name, &source, &profile.blocks, &mut *package).visit(&parsed);
    aggregate::refresh_package(package);

    debug!(
        "{}: {} blocks, {} declarations into package '{}'",
        file_name,
        profile.blocks.len(),
        methods,
        package.name
    );
    Ok(())
}
