#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub(crate) mod futures;
pub mod state;
pub mod task;

pub use engine;
pub use error::{Error, Result};
pub use futures::Futures;
pub use state::State;
pub use task::{grayscale_offloaded, permutations_inline, permutations_offloaded, run_in_background, BackgroundTask};
