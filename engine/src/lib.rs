pub mod error;
pub mod grayscale;
pub mod message;
pub mod permutation;

pub use error::{EngineError, EngineResult};
pub use grayscale::{grayscale, Image, Luminance, PixelBuffer};
pub use message::{WorkRequest, WorkResponse};
pub use permutation::{
    estimated_bytes, factorial, permutations, permutations_with_limit, PermutationSet, Sequence, DEFAULT_SIZE_LIMIT,
    MAX_SIZE_LIMIT, MEMORY_BUDGET,
};

pub use ahash::{AHashMap, AHashSet};
pub use itertools;
pub use tracing;

/// Renders a permutation the way a list item shows it, ie. `3,2,1`.
pub fn render_sequence(sequence: &[u32]) -> String {
    use itertools::Itertools;

    sequence.iter().join(",")
}
