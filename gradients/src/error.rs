use std::path::PathBuf;
use thiserror::Error;
use crate::dicom_header::DicomTagId;

#[derive(Error, Debug)]
pub enum GradientError {
    #[error("{tag} is missing from {}", file.display())]
    MissingAttribute { tag: DicomTagId, file: PathBuf },
    #[error("{tag} in {} cannot be read as {expected}", file.display())]
    AttributeValue { tag: DicomTagId, file: PathBuf, expected: &'static str },
    #[error("cannot unpack the diffusion vector in {}: expected 24 bytes (3 doubles), found {len}", file.display())]
    Decode { file: PathBuf, len: usize },
    #[error("gradient vectors must have {expected} components, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("gradient table line {line} has {found} entries where {expected} were expected")]
    RaggedTable { line: usize, expected: usize, found: usize },
    #[error("cannot parse {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },
    #[error("failed to read DICOM {}: {message}", file.display())]
    DicomRead { file: PathBuf, message: String },
    #[error("no DICOM files found in {0:?}")]
    NoDicomFiles(Vec<PathBuf>),
    #[error("{0}")]
    SourceMissing(String),
    #[error("{}: {source}", file.display())]
    Io { file: PathBuf, source: std::io::Error },
}

impl GradientError {
    pub(crate) fn io(file:&std::path::Path) -> impl FnOnce(std::io::Error) -> GradientError + '_ {
        move |source| GradientError::Io { file: file.to_owned(), source }
    }
}
