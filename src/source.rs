//! Access to the raw text of the source files named in a profile.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use crate::error::{GoberturaError, Result};

/// Anything that can hand back the bytes of a source file by its
/// (module-relative) name.
pub trait SourceLoader {
    fn load(&self, file_name: &str) -> Result<Vec<u8>>;
}

/// Reads files relative to a source root on disk. The CLI roots it at
/// `--src`, so sources are looked up there rather than in the working
/// directory.
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, file_name: &str) -> Result<Vec<u8>> {
        // Absolute names replace the root.
        let path = self.root.join(file_name);
        std::fs::read(&path).map_err(|source| GoberturaError::Source {
            path: path.display().to_string(),
            source,
        })
    }
}

/// In-memory sources keyed by file name.
impl SourceLoader for HashMap<String, String> {
    fn load(&self, file_name: &str) -> Result<Vec<u8>> {
        self.get(file_name)
            .map(|text| text.clone().into_bytes())
            .ok_or_else(|| GoberturaError::Source {
                path: file_name.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            })
    }
}
