use std::path::PathBuf;

/// Result type alias for the documentation core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the documentation core
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ManifestError { file: PathBuf, message: String },
    /// The requested resource does not exist or has no visible operations
    NotFound(String),
    /// A model reference that no registered model answers to
    UnknownModel(String),
    SerializationError(String),
}

impl Error {
    /// HTTP status the documentation endpoints answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ManifestError { file, message } => {
                write!(f, "Invalid manifest {}: {}", file.display(), message)
            }
            Error::NotFound(name) => write!(f, "Not Found: {}", name),
            Error::UnknownModel(name) => write!(f, "Unknown model referenced: {}", name),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization failed: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization failed: {}", err))
    }
}
