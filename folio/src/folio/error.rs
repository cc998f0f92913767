use std::path::PathBuf;

use thiserror::Error;

/// Failures from deriving identity out of a content path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("{path} is not within content folder {root}")]
    OutsideContentRoot { path: PathBuf, root: PathBuf },
    #[error("no date found in {path}")]
    NoDate { path: PathBuf },
    #[error("invalid date {date} in {path}")]
    InvalidDate { date: String, path: PathBuf },
}

/// Malformed-document errors. Fatal to one document's build.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse markdown in {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("malformed frontmatter in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path} has no level-1 heading to use as title")]
    MissingHeading { path: PathBuf },
    #[error("{path} has no text to use as description")]
    MissingDescription { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Failure of a single diagram render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("renderer returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("renderer output is not an svg document")]
    InvalidSvg,
    #[error("renderer returned {got} results for {expected} diagrams")]
    Mismatch { expected: usize, got: usize },
    #[error("failed to write diagram: {0}")]
    Io(#[from] std::io::Error),
}
