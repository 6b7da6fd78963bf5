//! In-memory representation of a Cobertura report. The conversion pass
//! builds a `Report` tree (report → packages → classes → methods → lines)
//! which the XML and JSON writers then read.

use serde::Serialize;

use crate::aggregate::Coverage;

/// Owner name of the synthetic class that collects free functions.
pub const FREE_FUNCTIONS: &str = "-";

/// Fraction of `total` lines that were hit. Undefined (NaN) when there are
/// no lines at all; callers must not default it to 0 or 1.
#[must_use]
pub fn hit_rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        f64::NAN
    } else {
        covered as f64 / total as f64
    }
}

/// A single instrumented line and how many times it executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Line {
    pub number: u32,
    pub hits: u64,
}

/// Line ledger for one declaration.
///
/// Line numbers are strictly increasing. Writers must present lines in
/// non-decreasing order, since only the most recent entry is checked for a
/// duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Lines(Vec<Line>);

impl Lines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `number`, or lower the hit count of the last entry when it is
    /// the same line. A repeated line never gains hits.
    pub fn record_or_merge(&mut self, number: u32, hits: u64) {
        if let Some(last) = self.0.last_mut() {
            if last.number == number {
                last.hits = last.hits.min(hits);
                return;
            }
        }
        self.0.push(Line { number, hits });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Line] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Lines {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One function or method declaration.
#[derive(Debug, Clone, Serialize)]
pub struct Method {
    pub name: String,
    pub line_rate: f64,
    pub lines: Lines,
}

impl Method {
    pub fn new(name: impl Into<String>, lines: Lines) -> Self {
        let line_rate = lines.hit_rate();
        Self {
            name: name.into(),
            line_rate,
            lines,
        }
    }
}

/// A receiver type, or [`FREE_FUNCTIONS`], within one source file.
#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub name: String,
    pub filename: String,
    pub line_rate: f64,
    pub methods: Vec<Method>,
}

impl Class {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            line_rate: f64::NAN,
            methods: Vec::new(),
        }
    }

    /// All method lines in method order. Not de-duplicated.
    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.methods.iter().flat_map(|m| m.lines.iter())
    }
}

/// A source directory.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub line_rate: f64,
    pub classes: Vec<Class>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line_rate: f64::NAN,
            classes: Vec::new(),
        }
    }
}

/// Root of the report tree.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub sources: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub version: String,
    pub line_rate: f64,
    pub lines_valid: u64,
    pub lines_covered: u64,
    pub packages: Vec<Package>,
}

impl Report {
    pub fn new(sources: Vec<String>, timestamp: i64) -> Self {
        Self {
            sources,
            timestamp,
            version: String::new(),
            line_rate: f64::NAN,
            lines_valid: 0,
            lines_covered: 0,
            packages: Vec::new(),
        }
    }

    /// Look up the package for directory `name`, creating it on first use.
    pub fn package_mut(&mut self, name: &str) -> &mut Package {
        let idx = match self.packages.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => {
                self.packages.push(Package::new(name));
                self.packages.len() - 1
            }
        };
        &mut self.packages[idx]
    }
}
