//! Progressive frame renderer.
//!
//! Implements progressive spectral rendering with:
//! - One sample per pixel per pass, folded into persistent running means
//! - Rows rendered in parallel with rayon
//! - Deterministic per-pixel random streams
//! - Automatic reset when the scene epoch changes

use std::sync::Arc;
use std::time::Instant;

use caustic_core::{ConfigResult, RenderSettings, SceneDescription};
use caustic_math::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::accumulator::{Accumulator, SceneEpoch};
use crate::camera::Camera;
use crate::integrator::sample_pixel;
use crate::scene::Scene;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Maximum number of scattering events per path
    pub max_bounces: u32,
    /// Samples folded into each pixel per frame
    pub samples_per_frame: u32,
    /// Terminate dim paths stochastically after the second bounce
    pub russian_roulette: bool,
    /// Base seed of every per-pixel random stream
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_bounces: 3,
            samples_per_frame: 1,
            russian_roulette: false,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            max_bounces: settings.max_bounces,
            samples_per_frame: settings.samples_per_frame.max(1),
            russian_roulette: settings.russian_roulette,
            seed: settings.seed,
        }
    }
}

/// Seed of the random stream for one pixel in one frame.
#[inline]
pub fn pixel_seed(seed: u64, frame: u32, pixel: u64) -> u64 {
    // splitmix64 finalizer over the combined inputs
    let mut z = seed
        ^ (frame as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ pixel.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Owns the scene, camera and accumulation state of a progressive render.
pub struct ProgressiveRenderer {
    scene: Scene,
    camera: Camera,
    config: RenderConfig,
    accumulator: Accumulator,
    epoch: Arc<SceneEpoch>,
    /// Frames rendered since the last reset
    frame: u32,
}

impl ProgressiveRenderer {
    pub fn new(scene: Scene, camera: Camera, config: RenderConfig) -> Self {
        let epoch = Arc::new(SceneEpoch::new());
        let accumulator =
            Accumulator::new(camera.image_width, camera.image_height, epoch.current());
        Self {
            scene,
            camera,
            config,
            accumulator,
            epoch,
            frame: 0,
        }
    }

    /// Build scene, camera and settings from a description.
    pub fn from_description(desc: &SceneDescription) -> ConfigResult<Self> {
        let scene = Scene::from_description(desc)?;
        let camera = Camera::from_desc(&desc.camera, desc.render.width, desc.render.height);
        Ok(Self::new(scene, camera, RenderConfig::from_settings(&desc.render)))
    }

    /// Shared epoch counter. Advancing it from anywhere resets accumulation.
    pub fn epoch(&self) -> Arc<SceneEpoch> {
        Arc::clone(&self.epoch)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access. Invalidates accumulated samples.
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.epoch.advance();
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Replace the camera. Invalidates accumulated samples.
    pub fn set_camera(&mut self, camera: Camera) {
        if camera.image_width != self.accumulator.width()
            || camera.image_height != self.accumulator.height()
        {
            self.accumulator = Accumulator::new(
                camera.image_width,
                camera.image_height,
                self.accumulator.epoch(),
            );
        }
        self.camera = camera;
        self.epoch.advance();
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the integrator settings. Invalidates accumulated samples.
    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
        self.epoch.advance();
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Frames accumulated since the last reset.
    pub fn frames(&self) -> u32 {
        self.frame
    }

    /// Render one progressive frame into the accumulator.
    pub fn render_frame(&mut self) {
        if self.accumulator.sync(self.epoch.current()) {
            self.frame = 0;
        }

        let start = Instant::now();
        let width = self.accumulator.width();
        let frame = self.frame;
        let scene = &self.scene;
        let camera = &self.camera;
        let config = &self.config;

        self.accumulator
            .pixels_mut()
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let index = y as u64 * width as u64 + x as u64;
                    let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, frame, index));
                    for _ in 0..config.samples_per_frame {
                        let sample =
                            sample_pixel(scene, camera, x as u32, y as u32, config, &mut rng);
                        pixel.add_sample(sample);
                    }
                }
            });

        self.frame += 1;
        log::debug!(
            "Frame {} rendered in {:.1} ms",
            self.frame,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    /// Render `count` frames.
    pub fn render_frames(&mut self, count: u32) {
        let start = Instant::now();
        for _ in 0..count {
            self.render_frame();
        }
        log::info!(
            "Rendered {} frames ({} samples per pixel) in {:.2} s",
            count,
            self.accumulator.min_count(),
            start.elapsed().as_secs_f64()
        );
    }

    /// Current running means as an image.
    pub fn image(&self) -> ImageBuffer {
        let mut image = ImageBuffer::new(self.accumulator.width(), self.accumulator.height());
        for (dst, src) in image.pixels.iter_mut().zip(self.accumulator.pixels()) {
            *dst = src.mean();
        }
        image
    }
}

/// Apply gamma correction (gamma = 2.2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Simple image buffer for storing render output.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            let rgba = color_to_rgba(*color);
            bytes.extend_from_slice(&rgba);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caustic_core::{EmissionSpectrum, ShapeDesc};

    fn small_scene() -> SceneDescription {
        let mut desc = SceneDescription::default();
        desc.render.width = 12;
        desc.render.height = 8;
        desc.camera.position = [0.0, 1.0, 4.0];
        desc.camera.target = [0.0, 0.5, 0.0];
        desc.emitter.spectrum = EmissionSpectrum::Flat;
        desc.geometry.diffuse.push(ShapeDesc::Plane {
            normal: [0.0, 1.0, 0.0],
            offset: 0.0,
        });
        desc.geometry.dielectric.push(ShapeDesc::Sphere {
            center: [0.0, 0.5, 0.0],
            radius: 0.5,
        });
        desc
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.218) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::splat(4.0)), [255, 255, 255, 255]);
    }

    #[test]
    fn test_image_index_past_u32_range() {
        let image = ImageBuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };
        assert_eq!(image.index(69_999, 69_999), 4_899_999_999);
    }

    #[test]
    fn test_pixel_seeds_differ() {
        assert_ne!(pixel_seed(0, 0, 0), pixel_seed(0, 0, 1));
        assert_ne!(pixel_seed(0, 0, 0), pixel_seed(0, 1, 0));
        assert_ne!(pixel_seed(0, 0, 0), pixel_seed(1, 0, 0));
        assert_eq!(pixel_seed(3, 4, 5), pixel_seed(3, 4, 5));
    }

    #[test]
    fn test_frames_accumulate() {
        let mut renderer = ProgressiveRenderer::from_description(&small_scene()).unwrap();
        renderer.render_frames(3);
        assert_eq!(renderer.frames(), 3);
        assert_eq!(renderer.accumulator().min_count(), 3);

        let image = renderer.image();
        assert_eq!(image.pixels.len(), 12 * 8);
        assert!(image.pixels.iter().all(|c| c.is_finite()));
        assert!(image.pixels.iter().any(|c| c.length() > 0.0));
        assert_eq!(image.to_rgba().len(), 12 * 8 * 4);
    }

    #[test]
    fn test_reset_reproduces_bit_exact() {
        let mut renderer = ProgressiveRenderer::from_description(&small_scene()).unwrap();
        renderer.render_frames(2);
        let first = renderer.accumulator().as_bytes().to_vec();

        // Any change advances the epoch and the next frame starts over
        renderer.set_config(renderer.config().clone());
        renderer.render_frames(2);
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.accumulator().as_bytes(), first.as_slice());
    }

    #[test]
    fn test_external_epoch_advance_resets() {
        let mut renderer = ProgressiveRenderer::from_description(&small_scene()).unwrap();
        renderer.render_frame();
        renderer.render_frame();
        let epoch = renderer.epoch();
        epoch.advance();
        renderer.render_frame();
        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.accumulator().min_count(), 1);
    }

    #[test]
    fn test_set_camera_resizes() {
        let mut renderer = ProgressiveRenderer::from_description(&small_scene()).unwrap();
        renderer.render_frame();
        let camera = Camera::from_desc(&small_scene().camera, 6, 4);
        renderer.set_camera(camera);
        renderer.render_frame();
        assert_eq!(renderer.accumulator().width(), 6);
        assert_eq!(renderer.image().pixels.len(), 24);
    }
}
