use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model_variant::ModelVariant;

#[derive(Debug, Error)]
#[error("Expected {expected} {location} but observed: {observed}")]
pub struct ParseError {
    expected: &'static str,
    observed: String,
    location: Location,
}

#[derive(Debug)]
pub enum Location {
    Unknown,
    File { path: PathBuf, line: usize },
    Item { type_: &'static str, index: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => write!(f, "at unknown location"),
            Location::File { path, line } => {
                write!(f, "in file {} on line {}", path.as_path().display(), line)
            }
            Location::Item { type_, index } => {
                write!(f, "for item of type {} at index {}", type_, index)
            }
        }
    }
}

impl ParseError {
    pub fn somewhere(expected: &'static str, observed: String) -> Self {
        Self {
            expected,
            observed,
            location: Location::Unknown,
        }
    }

    pub fn file(path: PathBuf, line: usize, expected: &'static str, observed: String) -> Self {
        let location = Location::File { path, line };
        Self {
            observed,
            expected,
            location,
        }
    }

    pub fn item(
        type_: &'static str,
        index: usize,
        expected: &'static str,
        observed: String,
    ) -> Self {
        let location = Location::Item { type_, index };
        Self {
            observed,
            expected,
            location,
        }
    }
}

#[derive(Debug, Error)]
pub struct FileError {
    path: Option<PathBuf>,
    #[source]
    source: FileErrorSource,
}

impl FileError {
    pub fn io<P: AsRef<Path>>(path: Option<P>, error: std::io::Error) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
            source: error.into(),
        }
    }

    pub fn parse<P: AsRef<Path>>(path: Option<P>, error: ParseError) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
            source: error.into(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Failed to work with file {}", path.display()),
            None => write!(f, "Failed to work with anonymous file"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FileErrorSource {
    #[error("Failed to parse file")]
    Parse {
        #[from]
        source: ParseError,
    },
    #[error("Failed to read/write to file")]
    IO {
        #[from]
        source: std::io::Error,
    },
}

/// The genotypes attached to a tree node are missing, have the wrong length or contain values
/// that are not state ids of the substitution model.
#[derive(Debug, Error)]
#[error("Bad genotypes on node {node}: {message}")]
pub struct GenotypeFormatError {
    pub node: usize,
    pub message: String,
}

impl GenotypeFormatError {
    pub fn new(node: usize, message: impl Into<String>) -> Self {
        Self {
            node,
            message: message.into(),
        }
    }
}

/// A genotype pair that the selected model has no evolutionary event for
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Transition of genotypes from {parent} to {child} is illegal under the {model} model")]
pub struct InvalidTransitionError {
    pub model: ModelVariant,
    pub parent: usize,
    pub child: usize,
}

#[derive(Debug, Error)]
#[error("Invalid value for {parameter}: {message}")]
pub struct ConfigurationError {
    pub parameter: &'static str,
    pub message: String,
}

impl ConfigurationError {
    pub fn new(parameter: &'static str, message: impl Into<String>) -> Self {
        Self {
            parameter,
            message: message.into(),
        }
    }
}

/// Catch-all error for top-level API
#[derive(Debug, Error)]
pub enum GeneAnnotatorError {
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error(transparent)]
    FileError(#[from] FileError),
    #[error(transparent)]
    GenotypeFormatError(#[from] GenotypeFormatError),
    #[error(transparent)]
    InvalidTransitionError(#[from] InvalidTransitionError),
    #[error(transparent)]
    ConfigurationError(#[from] ConfigurationError),
}
