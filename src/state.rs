use engine::{render_sequence, tracing, AHashMap, Image, PermutationSet, PixelBuffer};
use instant::Instant;

use crate::{
    config::LocalConfig,
    error::Result,
    futures::{handle_future, Futures},
    task::{grayscale_offloaded, permutations_inline, permutations_offloaded},
};

/// Output of an offloaded permutation run.
pub struct PermutationsComputed {
    pub size: i64,
    pub started: Instant,
    pub result: Result<PermutationSet>,
}

/// Output of an offloaded grayscale conversion.
pub struct ImageConverted {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub started: Instant,
    pub result: Result<PixelBuffer>,
}

/// A converted image, ready to be re-encoded by whatever displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelBuffer,
}

/// Holds everything a presentation layer renders.
pub struct State {
    /// Config that is local to this instance.
    pub config: LocalConfig,
    /// Futures task manager and output handler.
    pub futures: Futures,

    /// Rendered permutations, one line per permutation.
    permutation_results: Vec<String>,
    /// Status text shown while a computation is running.
    permutation_message: String,
    /// Grayscale images by the id they were requested with.
    converted_images: AHashMap<String, ConvertedImage>,
    /// Images we are currently converting.
    converting_images: Vec<String>,
    /// Latest errors received.
    latest_errors: Vec<String>,
}

impl State {
    pub fn new(config: LocalConfig) -> Self {
        Self {
            config,
            futures: Futures::new(),
            permutation_results: Vec::new(),
            permutation_message: String::new(),
            converted_images: AHashMap::default(),
            converting_images: Vec::new(),
            latest_errors: Vec::new(),
        }
    }

    pub fn permutation_results(&self) -> &[String] {
        &self.permutation_results
    }

    pub fn permutation_message(&self) -> &str {
        &self.permutation_message
    }

    pub fn converted_image(&self, id: &str) -> Option<&ConvertedImage> {
        self.converted_images.get(id)
    }

    pub fn is_converting(&self, id: &str) -> bool {
        self.converting_images.iter().any(|pending| pending == id)
    }

    pub fn latest_errors(&self) -> &[String] {
        &self.latest_errors
    }

    /// Computes permutations on the calling thread and renders them.
    pub fn permute_inline(&mut self, size: i64) {
        self.permutation_message = "Calculating in main...".to_string();
        self.permutation_results.clear();

        let started = Instant::now();
        let result = permutations_inline(size, self.config.permutation_limit());
        self.render_permutations(size, started, result);
    }

    /// Sends the computation to a background context. Results are rendered
    /// by [`State::maintain`] once they arrive.
    pub fn permute_offloaded(&mut self, size: i64) {
        self.permutation_results.clear();
        self.permutation_message = "Calculating in background...".to_string();

        let limit = self.config.permutation_limit();
        let started = Instant::now();
        tracing::debug!("dispatching permutations of size {}", size);
        self.futures.spawn(async move {
            PermutationsComputed {
                size,
                started,
                result: permutations_offloaded(size, limit).await,
            }
        });
    }

    /// Sends an image to a background context for grayscale conversion.
    pub fn grayscale(&mut self, id: impl Into<String>, image: Image) {
        let id = id.into();
        let luminance = self.config.luminance;
        let (width, height) = (image.width(), image.height());
        let started = Instant::now();

        tracing::debug!("dispatching grayscale conversion of {} ({}x{})", id, width, height);
        self.converting_images.push(id.clone());
        self.futures.spawn(async move {
            ImageConverted {
                id,
                width,
                height,
                started,
                result: grayscale_offloaded(image, luminance).await,
            }
        });
    }

    /// Clears rendered permutations. Computations already in flight still
    /// render when they finish.
    pub fn reset(&mut self) {
        self.permutation_results.clear();
        self.permutation_message.clear();
    }

    /// Whether there are background computations whose output hasn't been
    /// handled yet.
    pub fn is_busy(&self) -> bool {
        !self.futures.is_idle()
    }

    /// Waits until at least one background computation finishes, then handles
    /// every output that is available.
    pub async fn wait_and_maintain(&mut self) {
        if self.is_busy() {
            self.futures.completed().await;
        }
        self.maintain();
    }

    /// This must be run regularly to handle completed background outputs.
    pub fn maintain(&mut self) {
        self.futures.poll();

        self.handle_permutations();
        self.handle_images();
    }

    #[inline(always)]
    fn handle_permutations(&mut self) {
        handle_future!(self, |computed: PermutationsComputed| {
            let PermutationsComputed { size, started, result } = computed;
            self.render_permutations(size, started, result);
        });
    }

    #[inline(always)]
    fn handle_images(&mut self) {
        handle_future!(self, |converted: ImageConverted| {
            if let Some(pos) = self.converting_images.iter().position(|id| id == &converted.id) {
                self.converting_images.remove(pos);
            }
            match converted.result {
                Ok(pixels) => {
                    tracing::info!(
                        "converted {} to grayscale in {:?}",
                        converted.id,
                        converted.started.elapsed()
                    );
                    self.converted_images.insert(
                        converted.id,
                        ConvertedImage {
                            width: converted.width,
                            height: converted.height,
                            pixels,
                        },
                    );
                }
                Err(err) => {
                    tracing::error!("failed to convert {}: {}", converted.id, err);
                    self.latest_errors.push(err.to_string());
                }
            }
        });
    }

    fn render_permutations(&mut self, size: i64, started: Instant, result: Result<PermutationSet>) {
        match result {
            Ok(set) => {
                tracing::info!(
                    "computed {} permutations of size {} in {:?}",
                    set.len(),
                    size,
                    started.elapsed()
                );
                self.permutation_results = set.iter().map(|perm| render_sequence(perm)).collect();
            }
            Err(err) => {
                tracing::error!("failed to compute permutations of size {}: {}", size, err);
                self.latest_errors.push(err.to_string());
            }
        }
        self.permutation_message.clear();
    }
}
