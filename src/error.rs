use std::error::Error;
use std::fmt::{Display, Formatter};

/// Possible errors that arise while loading items, partitioning them into a hierarchy or
/// writing the resulting tree out.
///
/// Only the input variants (`EmptyItemStore`, `WrongDimension`, `NonFiniteCoordinate`,
/// `InvalidRecord` and `Io`) abort a build. Partition and synthesis failures are recovered
/// locally by the engine and only surface from the individual collaborators.
#[derive(Debug, Clone)]
pub enum ClusterError {
    EmptyItemStore,
    WrongDimension(String),
    NonFiniteCoordinate(String),
    InvalidRecord(String),
    Io(String),
    PartitionFailure(String),
    SynthesisFailure(String),
    Serialization(String),
}

impl ClusterError {
    /// Whether the error belongs to the fatal input family, which aborts a build without
    /// producing any tree.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ClusterError::EmptyItemStore
                | ClusterError::WrongDimension(..)
                | ClusterError::NonFiniteCoordinate(..)
                | ClusterError::InvalidRecord(..)
                | ClusterError::Io(..)
        )
    }
}

impl Error for ClusterError {}

impl Display for ClusterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ClusterError::EmptyItemStore => String::from("The item store provided is empty"),
            ClusterError::WrongDimension(msg) => {
                format!("Input vectors have mismatched dimensions: {msg}")
            }
            ClusterError::NonFiniteCoordinate(msg) => format!("Non finite coordinate: {msg}"),
            ClusterError::InvalidRecord(msg) => format!("Invalid input record: {msg}"),
            ClusterError::Io(msg) => format!("I/O failure: {msg}"),
            ClusterError::PartitionFailure(msg) => format!("Partitioning failed: {msg}"),
            ClusterError::SynthesisFailure(msg) => format!("Preview synthesis failed: {msg}"),
            ClusterError::Serialization(msg) => format!("Cannot serialize cluster tree: {msg}"),
        };
        write!(f, "{message}")
    }
}

impl From<std::io::Error> for ClusterError {
    fn from(err: std::io::Error) -> Self {
        ClusterError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for ClusterError {
    fn from(err: image::ImageError) -> Self {
        ClusterError::Io(err.to_string())
    }
}
