use std::fmt;
use std::io;

#[derive(Debug)]
pub enum GlossaryError {
    Io(io::Error),
    Json(serde_json::Error),
    Index(fst::Error),
    /// A malformed row in a delimited vocabulary file.
    Parse {
        line: usize,
        message: String,
    },
    UnknownStrategy(String),
    UnsupportedFormat(String),
}

impl fmt::Display for GlossaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlossaryError::Io(err) => write!(f, "io error: {err}"),
            GlossaryError::Json(err) => write!(f, "invalid json: {err}"),
            GlossaryError::Index(err) => write!(f, "failed to build term index: {err}"),
            GlossaryError::Parse { line, message } => {
                write!(f, "vocabulary line {line}: {message}")
            }
            GlossaryError::UnknownStrategy(value) => {
                write!(f, "unknown match strategy {value:?} (expected `longest` or `ordered`)")
            }
            GlossaryError::UnsupportedFormat(value) => {
                write!(f, "unsupported vocabulary format {value:?} (expected .json or .tsv)")
            }
        }
    }
}

impl std::error::Error for GlossaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlossaryError::Io(err) => Some(err),
            GlossaryError::Json(err) => Some(err),
            GlossaryError::Index(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GlossaryError {
    fn from(value: io::Error) -> Self {
        GlossaryError::Io(value)
    }
}

impl From<serde_json::Error> for GlossaryError {
    fn from(value: serde_json::Error) -> Self {
        GlossaryError::Json(value)
    }
}

impl From<fst::Error> for GlossaryError {
    fn from(value: fst::Error) -> Self {
        GlossaryError::Index(value)
    }
}
