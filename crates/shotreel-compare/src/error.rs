use shotreel_core::{Error, ErrorCode};
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("input directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("no matching frames between {first} and {second}; ensure filenames align")]
    NoMatchingFrames { first: PathBuf, second: PathBuf },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl From<CompareError> for Error {
    fn from(err: CompareError) -> Self {
        let code = match &err {
            CompareError::MissingDirectory(_) => ErrorCode::InvalidArgument,
            CompareError::NoMatchingFrames { .. } => ErrorCode::NoMatchingFrames,
            CompareError::Io { .. } | CompareError::Image { .. } => ErrorCode::Unknown,
        };
        let error = Error::new(code, err.to_string());
        match err {
            CompareError::NoMatchingFrames { .. } => error.with_suggestions(vec![
                "Both runs must use the same transcript so frame names line up".to_string(),
            ]),
            CompareError::MissingDirectory(_) => {
                error.with_suggestions(vec!["Pass existing directories to --inputs".to_string()])
            }
            _ => error,
        }
    }
}
