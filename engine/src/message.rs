//! Messages exchanged with a background execution context. Exactly one
//! request goes in and exactly one response comes out.

#[cfg(target_arch = "wasm32")]
use rkyv::{Archive, Deserialize as ArchiveDeserialize, Serialize as ArchiveSerialize};
use serde::{Deserialize, Serialize};

use crate::{error::EngineError, grayscale::Luminance, grayscale::PixelBuffer, permutation::PermutationSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(Archive, ArchiveDeserialize, ArchiveSerialize))]
pub enum WorkRequest {
    Permutations {
        size: i64,
        limit: u32,
    },
    Grayscale {
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        luminance: Luminance,
    },
}

impl WorkRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkRequest::Permutations { .. } => "permutations",
            WorkRequest::Grayscale { .. } => "grayscale",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(Archive, ArchiveDeserialize, ArchiveSerialize))]
pub enum WorkResponse {
    Permutations(PermutationSet),
    Grayscale(PixelBuffer),
    Failed(EngineError),
}

impl WorkResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkResponse::Permutations(_) => "permutations",
            WorkResponse::Grayscale(_) => "grayscale",
            WorkResponse::Failed(_) => "failed",
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wire {
    use super::*;
    use rkyv::{Deserialize, Infallible};

    macro_rules! impl_wire {
        ($ty:ty) => {
            impl $ty {
                /// Encodes this message for posting to / from a web worker.
                pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
                    rkyv::to_bytes::<_, 2048>(self)
                        .map(Into::into)
                        .map_err(|err| format!("failed to encode {}: {:?}", self.kind(), err))
                }

                /// Decodes a message produced by `to_bytes`.
                pub fn from_bytes(data: &[u8]) -> Self {
                    #[allow(unsafe_code)]
                    let archived = unsafe { rkyv::archived_root::<Self>(data) };
                    match archived.deserialize(&mut Infallible) {
                        Ok(message) => message,
                        Err(never) => match never {},
                    }
                }
            }
        };
    }

    impl_wire!(WorkRequest);
    impl_wire!(WorkResponse);
}
