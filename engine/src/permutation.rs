//! Brute-force permutation generation.
//!
//! Produces every ordering of `[1, 2, ..., n]` by inserting `n` into each
//! position of every permutation of `[1, ..., n - 1]`. Time and memory are
//! `Θ(n · n!)`, so sizes are capped by a limit.

#[cfg(target_arch = "wasm32")]
use rkyv::{Archive, Deserialize as ArchiveDeserialize, Serialize as ArchiveSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Limit used by [`permutations`]. `10!` sequences of ten `u32`s is already
/// well over a hundred megabytes.
pub const DEFAULT_SIZE_LIMIT: u32 = 10;
/// No limit above this is accepted, whatever the caller configures.
/// `11!` sequences already take about 3 GB.
pub const MAX_SIZE_LIMIT: u32 = 10;
/// Upper bound on the memory a single permutation set may take.
pub const MEMORY_BUDGET: usize = 512 * 1024 * 1024;

/// One ordering of `1..=n`.
pub type Sequence = Vec<u32>;

/// All permutations of a sequence, in generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(Archive, ArchiveDeserialize, ArchiveSerialize))]
pub struct PermutationSet(Vec<Sequence>);

impl PermutationSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Sequence] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Sequence> {
        self.0
    }
}

impl IntoIterator for PermutationSet {
    type Item = Sequence;
    type IntoIter = std::vec::IntoIter<Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// `n!`, saturating at `usize::MAX`.
pub fn factorial(n: u32) -> usize {
    (1..=n as usize).fold(1usize, |acc, k| acc.saturating_mul(k))
}

/// Bytes needed to hold every permutation of a sequence of `size` elements,
/// saturating at `usize::MAX`.
pub fn estimated_bytes(size: u32) -> usize {
    let per_sequence = std::mem::size_of::<Sequence>() + size as usize * std::mem::size_of::<u32>();
    factorial(size).saturating_mul(per_sequence)
}

/// Computes all permutations of `[1, ..., size]` with [`DEFAULT_SIZE_LIMIT`].
pub fn permutations(size: i64) -> EngineResult<PermutationSet> {
    permutations_with_limit(size, DEFAULT_SIZE_LIMIT)
}

/// Computes all permutations of `[1, ..., size]`, rejecting sizes above
/// `limit` (itself clamped to [`MAX_SIZE_LIMIT`]).
pub fn permutations_with_limit(size: i64, limit: u32) -> EngineResult<PermutationSet> {
    if size < 0 {
        return Err(EngineError::NegativeSize(size));
    }
    let limit = limit.min(MAX_SIZE_LIMIT);
    if size > i64::from(limit) {
        return Err(EngineError::SizeLimitExceeded { size, limit });
    }

    let size = size as u32;
    if estimated_bytes(size) > MEMORY_BUDGET {
        return Err(EngineError::SizeLimitExceeded { size: i64::from(size), limit });
    }
    tracing::trace!("generating {} permutations of size {}", factorial(size), size);
    Ok(PermutationSet(generate(size)))
}

fn generate(size: u32) -> Vec<Sequence> {
    if size == 0 {
        // the empty sequence is the only ordering of nothing
        return vec![Vec::new()];
    }

    let sublist = generate(size - 1);
    let mut answer = Vec::with_capacity(factorial(size));
    for permutation in &sublist {
        for pos in 0..=permutation.len() {
            let mut next = Vec::with_capacity(permutation.len() + 1);
            next.extend_from_slice(&permutation[..pos]);
            next.push(size);
            next.extend_from_slice(&permutation[pos..]);
            answer.push(next);
        }
    }
    answer
}
