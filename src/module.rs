//! Resolving the module import path that prefixes profile file names.

use std::path::Path;

use crate::error::{GoberturaError, Result};

/// The module path declared by a `go.mod` file. When several `module`
/// directives are present the last one wins.
pub fn module_path(go_mod: &str) -> Option<String> {
    let mut found = None;
    for line in go_mod.lines() {
        let line = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        if !rest.starts_with([' ', '\t']) {
            continue;
        }
        let path = rest.trim().trim_matches('"');
        if !path.is_empty() {
            found = Some(path.to_string());
        }
    }
    found
}

/// Read `go.mod` from `dir` and return the prefix to strip from profile file
/// names, i.e. the module path with a trailing `/`.
pub fn read_package_path(dir: &Path) -> Result<String> {
    let go_mod = dir.join("go.mod");
    let text = std::fs::read_to_string(&go_mod).map_err(|source| GoberturaError::Source {
        path: go_mod.display().to_string(),
        source,
    })?;
    let path = module_path(&text).ok_or_else(|| {
        GoberturaError::Module(format!("no module directive in {}", go_mod.display()))
    })?;
    Ok(format!("{}/", path))
}
