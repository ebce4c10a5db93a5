//! Error taxonomy
//!
//! File-level failures (a document that cannot be opened at all) surface as
//! [`Error::Parse`] or [`Error::MissingFile`]. Feature-level failures such as
//! a single comparison step or a single run write are represented by
//! [`Error::Comparison`] and [`Error::ReinjectionWrite`]; callers recover from
//! those locally instead of aborting.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// File unreadable or not a conforming document; no partial result exists.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Two files of different kinds were handed to a pairwise operation.
    #[error("file format mismatch: {original} vs {translated}")]
    FormatMismatch { original: String, translated: String },

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A package is structurally invalid (missing part, wrong kind).
    #[error("{0}")]
    InvalidPackage(String),

    /// One comparison step of the validator failed internally.
    #[error("comparison `{check}` failed: {reason}")]
    Comparison { check: &'static str, reason: String },

    /// Writing replacement text into a single run failed.
    #[error("could not write text into {location}: {reason}")]
    ReinjectionWrite { location: String, reason: String },

    #[error("refusing to overwrite source document {}", .0.display())]
    SourceOverwrite(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Format(#[from] std::fmt::Error),

    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    ConfigWrite(#[from] toml::ser::Error),
}

impl Error {
    /// Wrap any error raised while reading `path` into a [`Error::Parse`].
    pub fn parse(path: &Path, source: Error) -> Self {
        match source {
            // Already attributed to a file; keep the innermost path.
            Error::Parse { .. } | Error::MissingFile(_) => source,
            other => Error::Parse {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}
