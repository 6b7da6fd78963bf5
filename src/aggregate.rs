//! Statistic rollups: method → class → package → report.
//!
//! The conversion pass updates rates incrementally as each method and file is
//! finished. [`rollup`] recomputes the same statistics from scratch over a
//! finished tree, and [`is_consistent`] checks that the two agree.

use crate::model::{hit_rate, Class, Line, Lines, Method, Package, Report};

/// Line counts for any node of the report tree.
pub trait Coverage {
    /// Number of attributed lines.
    fn num_lines(&self) -> u64;

    /// Number of attributed lines with at least one hit.
    fn num_lines_with_hits(&self) -> u64;

    fn hit_rate(&self) -> f64 {
        hit_rate(self.num_lines_with_hits(), self.num_lines())
    }
}

fn count_hit<'a>(lines: impl Iterator<Item = &'a Line>) -> u64 {
    lines.filter(|l| l.hits > 0).count() as u64
}

impl Coverage for Lines {
    fn num_lines(&self) -> u64 {
        self.len() as u64
    }

    fn num_lines_with_hits(&self) -> u64 {
        count_hit(self.iter())
    }
}

impl Coverage for Method {
    fn num_lines(&self) -> u64 {
        self.lines.num_lines()
    }

    fn num_lines_with_hits(&self) -> u64 {
        self.lines.num_lines_with_hits()
    }
}

impl Coverage for Class {
    fn num_lines(&self) -> u64 {
        self.lines().count() as u64
    }

    fn num_lines_with_hits(&self) -> u64 {
        count_hit(self.lines())
    }
}

impl Coverage for Package {
    fn num_lines(&self) -> u64 {
        self.classes.iter().map(Coverage::num_lines).sum()
    }

    fn num_lines_with_hits(&self) -> u64 {
        self.classes.iter().map(Coverage::num_lines_with_hits).sum()
    }
}

impl Coverage for Report {
    fn num_lines(&self) -> u64 {
        self.packages.iter().map(Coverage::num_lines).sum()
    }

    fn num_lines_with_hits(&self) -> u64 {
        self.packages.iter().map(Coverage::num_lines_with_hits).sum()
    }
}

/// Append `method` to `class` and refresh the class rate.
pub fn add_method(class: &mut Class, method: Method) {
    class.methods.push(method);
    class.line_rate = class.hit_rate();
}

/// Refresh a package rate after one of its files has been processed.
pub fn refresh_package(package: &mut Package) {
    package.line_rate = package.hit_rate();
}

/// Fill in the report-level totals once every file has been processed.
///
/// Valid and covered lines are summed independently across packages.
pub fn finalize(report: &mut Report) {
    report.lines_valid = report.packages.iter().map(Coverage::num_lines).sum();
    report.lines_covered = report
        .packages
        .iter()
        .map(Coverage::num_lines_with_hits)
        .sum();
    report.line_rate = hit_rate(report.lines_covered, report.lines_valid);
}

/// Bulk recomputation of every rate in a report tree.
#[derive(Debug, Clone)]
pub struct Rollup {
    pub lines_valid: u64,
    pub lines_covered: u64,
    pub line_rate: f64,
    pub packages: Vec<PackageRollup>,
}

#[derive(Debug, Clone)]
pub struct PackageRollup {
    pub line_rate: f64,
    pub classes: Vec<ClassRollup>,
}

#[derive(Debug, Clone)]
pub struct ClassRollup {
    pub line_rate: f64,
    pub methods: Vec<f64>,
}

/// Recompute all statistics bottom-up, ignoring the stored rates.
pub fn rollup(report: &Report) -> Rollup {
    let packages = report
        .packages
        .iter()
        .map(|pkg| PackageRollup {
            line_rate: pkg.hit_rate(),
            classes: pkg
                .classes
                .iter()
                .map(|class| ClassRollup {
                    line_rate: class.hit_rate(),
                    methods: class.methods.iter().map(|m| m.lines.hit_rate()).collect(),
                })
                .collect(),
        })
        .collect();

    Rollup {
        lines_valid: report.num_lines(),
        lines_covered: report.num_lines_with_hits(),
        line_rate: report.hit_rate(),
        packages,
    }
}

/// Rates are equal, treating two undefined rates as equal.
fn same_rate(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

/// True when every stored statistic matches a fresh [`rollup`].
pub fn is_consistent(report: &Report) -> bool {
    let fresh = rollup(report);

    if report.lines_valid != fresh.lines_valid
        || report.lines_covered != fresh.lines_covered
        || !same_rate(report.line_rate, fresh.line_rate)
        || report.packages.len() != fresh.packages.len()
    {
        return false;
    }

    report
        .packages
        .iter()
        .zip(&fresh.packages)
        .all(|(pkg, want)| {
            same_rate(pkg.line_rate, want.line_rate)
                && pkg.classes.len() == want.classes.len()
                && pkg.classes.iter().zip(&want.classes).all(|(class, want)| {
                    same_rate(class.line_rate, want.line_rate)
                        && class
                            .methods
                            .iter()
                            .zip(&want.methods)
                            .all(|(m, &rate)| same_rate(m.line_rate, rate))
                })
        })
}
