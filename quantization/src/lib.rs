pub mod codebook;
pub mod codes;
pub mod config;
pub mod distance;
pub mod encoder;
pub mod text_io;

pub use codebook::{Codebook, CodebookShape};
pub use codes::{CodeMatrix, CodeStoreType, CodeWidth};
pub use config::EncoderConfig;
pub use distance::DistanceMode;
pub use encoder::{EncodingParameters, PqEncoder};

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("configuration error: {0}")]
    ConfigurationError(String),
    #[error("{what} {index} has dimension {actual}, expected {expected}")]
    ShapeError {
        what: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("encoding stopped")]
    Stopped,
}
