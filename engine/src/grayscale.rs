#[cfg(target_arch = "wasm32")]
use rkyv::{Archive, Deserialize as ArchiveDeserialize, Serialize as ArchiveSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Flat RGBA bytes. Length is always a multiple of 4.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(Archive, ArchiveDeserialize, ArchiveSerialize))]
pub struct PixelBuffer(Vec<u8>);

impl PixelBuffer {
    pub fn new(data: Vec<u8>) -> EngineResult<Self> {
        if data.len() % 4 != 0 {
            return Err(EngineError::MisalignedBuffer { len: data.len() });
        }
        Ok(Self(data))
    }

    /// Amount of pixels, not bytes.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.0.len() / 4
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

/// A pixel buffer along with the dimensions it was extracted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: PixelBuffer,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: PixelBuffer) -> EngineResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(4));
        if expected != Some(pixels.as_bytes().len()) {
            return Err(EngineError::DimensionMismatch {
                len: pixels.as_bytes().len(),
                width,
                height,
            });
        }
        Ok(Self { width, height, pixels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn into_parts(self) -> (u32, u32, PixelBuffer) {
        (self.width, self.height, self.pixels)
    }
}

/// How a gray value is derived from a pixel's color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(target_arch = "wasm32", derive(Archive, ArchiveDeserialize, ArchiveSerialize))]
pub enum Luminance {
    /// Equal weights, `(r + g + b) / 3` truncated.
    Average,
    /// ITU-R BT.601 luma weights.
    Rec601,
    /// ITU-R BT.709 luma weights.
    Rec709,
}

impl Default for Luminance {
    fn default() -> Self {
        Self::Average
    }
}

impl Luminance {
    pub fn apply(self, r: u8, g: u8, b: u8) -> u8 {
        let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
        let value = match self {
            Luminance::Average => (r + g + b) / 3,
            Luminance::Rec601 => (299 * r + 587 * g + 114 * b + 500) / 1000,
            Luminance::Rec709 => (2126 * r + 7152 * g + 722 * b + 5000) / 10000,
        };
        value.min(255) as u8
    }
}

/// Returns a new buffer where each pixel's red, green and blue are replaced
/// by its luminance. Alpha is copied through untouched.
pub fn grayscale(buffer: &PixelBuffer, luminance: Luminance) -> PixelBuffer {
    let mut out = Vec::with_capacity(buffer.0.len());
    for pixel in buffer.0.chunks_exact(4) {
        let gray = luminance.apply(pixel[0], pixel[1], pixel[2]);
        out.extend_from_slice(&[gray, gray, gray, pixel[3]]);
    }
    PixelBuffer(out)
}
