//! Error types for the datatype layer

use thiserror::Error;

use crate::raw::codec::DecodeError;
use crate::raw::{DatatypeKind, TensorDataType};

#[derive(Error, Debug)]
pub enum Error {
    #[error("layer '{name}' not found")]
    NotFound { name: String },

    #[error("layer '{name}' holds {actual:?} data, requested {expected:?}")]
    TypeMismatch {
        name: String,
        expected: TensorDataType,
        actual: TensorDataType,
    },

    #[error("tensor directory is empty")]
    EmptyDirectory,

    #[error("layer '{name}' spans {len} bytes at offset {offset}, buffer holds {available}")]
    OutOfBounds {
        name: String,
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("layer '{name}' would grow the payload to {size} bytes, beyond the u32 range")]
    PayloadTooLarge { name: String, size: usize },

    #[error("{0} requires a color converter, none was supplied")]
    UnavailableCapability(&'static str),

    #[error("color conversion failed: {0}")]
    Conversion(String),

    #[error("expected a {expected:?} message, got {actual:?}")]
    WrongDatatype {
        expected: DatatypeKind,
        actual: DatatypeKind,
    },

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_layer() {
        let err = Error::NotFound {
            name: "detections".into(),
        };
        assert!(err.to_string().contains("detections"));
    }

    #[test]
    fn test_type_mismatch_names_both_types() {
        let err = Error::TypeMismatch {
            name: "scores".into(),
            expected: TensorDataType::Fp16,
            actual: TensorDataType::U8F,
        };
        let msg = err.to_string();
        assert!(msg.contains("scores"));
        assert!(msg.contains("Fp16"));
        assert!(msg.contains("U8F"));
    }

    #[test]
    fn test_decode_error_converts() {
        let err: Error = DecodeError::UnknownDatatype(42).into();
        match err {
            Error::Decode(DecodeError::UnknownDatatype(42)) => {}
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }
}
