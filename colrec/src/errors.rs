use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {what}: {source}")]
    Yaml {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {card} card: {reason}")]
    InvalidCard { card: &'static str, reason: String },

    #[error("unknown analysis '{0}'")]
    UnknownAnalysis(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn yaml(what: impl Into<String>, source: serde_yaml::Error) -> Self {
        Error::Yaml {
            what: what.into(),
            source,
        }
    }
}
