use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoberturaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Source {
        path: String,
        source: std::io::Error,
    },

    #[error("{file}:{line}:{column}: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Go grammar error: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("go.mod error: {0}")]
    Module(String),

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GoberturaError>;
