#[cfg(target_arch = "wasm32")]
use rkyv::{Archive, Deserialize as ArchiveDeserialize, Serialize as ArchiveSerialize};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub type EngineResult<T> = Result<T, EngineError>;

/// Every variant is an invalid argument: the engine only ever rejects input,
/// it never fails while computing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(Archive, ArchiveDeserialize, ArchiveSerialize))]
pub enum EngineError {
    /// A permutation size below zero was requested.
    NegativeSize(i64),
    /// The requested permutation size is above the practical limit.
    SizeLimitExceeded { size: i64, limit: u32 },
    /// A pixel buffer whose length is not a multiple of 4.
    MisalignedBuffer { len: usize },
    /// Pixel buffer length doesn't match `width * height * 4`.
    DimensionMismatch { len: usize, width: u32, height: u32 },
}

impl EngineError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            EngineError::NegativeSize(_)
                | EngineError::SizeLimitExceeded { .. }
                | EngineError::MisalignedBuffer { .. }
                | EngineError::DimensionMismatch { .. }
        )
    }
}

impl Display for EngineError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::NegativeSize(size) => {
                write!(fmt, "Invalid argument: can't permute a sequence of negative size {}", size)
            }
            EngineError::SizeLimitExceeded { size, limit } => write!(
                fmt,
                "Invalid argument: size {} is above the permutation limit of {}",
                size, limit
            ),
            EngineError::MisalignedBuffer { len } => write!(
                fmt,
                "Invalid argument: pixel buffer length {} is not a multiple of 4",
                len
            ),
            EngineError::DimensionMismatch { len, width, height } => write!(
                fmt,
                "Invalid argument: pixel buffer length {} doesn't fit a {}x{} RGBA image",
                len, width, height
            ),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_offending_value() {
        let err = EngineError::NegativeSize(-1);
        assert!(err.to_string().contains("-1"));

        let err = EngineError::DimensionMismatch {
            len: 12,
            width: 2,
            height: 2,
        };
        assert!(err.to_string().contains("2x2"));
    }

    #[test]
    fn all_variants_are_invalid_arguments() {
        let errors = [
            EngineError::NegativeSize(-3),
            EngineError::SizeLimitExceeded { size: 20, limit: 10 },
            EngineError::MisalignedBuffer { len: 3 },
            EngineError::DimensionMismatch {
                len: 4,
                width: 3,
                height: 1,
            },
        ];
        assert!(errors.iter().all(EngineError::is_invalid_argument));
    }
}
