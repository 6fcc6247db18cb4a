//! Persistent per-pixel running means, invalidated by scene epochs.

use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use caustic_math::Vec3;

/// Scene version counter.
///
/// Any change to the scene, camera or materials advances the epoch. An
/// accumulator that sees a new epoch discards everything it holds before the
/// next sample is written.
#[derive(Debug, Default)]
pub struct SceneEpoch(AtomicU64);

impl SceneEpoch {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate all accumulated samples. Returns the new epoch.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Running mean of one pixel, laid out as `(r, g, b, count)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PixelState {
    pub mean: [f32; 3],
    pub count: u32,
}

impl PixelState {
    /// Fold one sample into the running mean.
    #[inline]
    pub fn add_sample(&mut self, sample: Vec3) {
        let n = self.count as f32;
        let mean = (Vec3::from_array(self.mean) * n + sample) / (n + 1.0);
        self.mean = mean.to_array();
        self.count += 1;
    }

    #[inline]
    pub fn mean(&self) -> Vec3 {
        Vec3::from_array(self.mean)
    }
}

/// Image-sized buffer of pixel states tied to one scene epoch.
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: u32,
    height: u32,
    pixels: Vec<PixelState>,
    epoch: u64,
}

impl Accumulator {
    pub fn new(width: u32, height: u32, epoch: u64) -> Self {
        Self {
            width,
            height,
            pixels: vec![PixelState::default(); width as usize * height as usize],
            epoch,
        }
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
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Zero every pixel.
    pub fn reset(&mut self) {
        self.pixels.fill(PixelState::default());
    }

    /// Adopt `epoch`, resetting if it differs from the one held. Returns true on reset.
    pub fn sync(&mut self, epoch: u64) -> bool {
        if self.epoch == epoch {
            return false;
        }
        log::info!("Scene epoch {} -> {}, resetting accumulation", self.epoch, epoch);
        self.epoch = epoch;
        self.reset();
        true
    }

    /// Row-major index of pixel (x, y).
    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> PixelState {
        self.pixels[self.index(x, y)]
    }

    pub fn add_sample(&mut self, x: u32, y: u32, sample: Vec3) {
        let index = self.index(x, y);
        self.pixels[index].add_sample(sample);
    }

    pub fn pixels(&self) -> &[PixelState] {
        &self.pixels
    }

    /// Row-major pixel states, for handing rows to workers.
    pub fn pixels_mut(&mut self) -> &mut [PixelState] {
        &mut self.pixels
    }

    /// Samples in the least sampled pixel.
    pub fn min_count(&self) -> u32 {
        self.pixels.iter().map(|p| p.count).min().unwrap_or(0)
    }

    /// Raw `(r, g, b, count)` bytes, four 32-bit words per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
