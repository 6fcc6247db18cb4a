//! Caustic Renderer - Spectral SDF Path Tracing
//!
//! A hero-wavelength Monte Carlo path tracer for signed distance field
//! scenes, built for dispersion and caustics.
//!
//! Each sample traces a single wavelength drawn from the emitter spectrum
//! through dielectric, metal and diffuse surfaces, combining BSDF sampling
//! with light sampling through multiple importance sampling. Samples are
//! folded into a progressive accumulator that resets whenever the scene
//! epoch changes.

pub mod accumulator;
pub mod bsdf;
pub mod camera;
pub mod fresnel;
pub mod geometry;
pub mod integrator;
pub mod light;
pub mod microfacet;
pub mod renderer;
pub mod sampling;
pub mod scene;
pub mod sdf;
pub mod wavelength;

pub use accumulator::{Accumulator, PixelState, SceneEpoch};
pub use bsdf::{Bsdf, BsdfSample, ConductorBsdf, DielectricBsdf, LambertianBsdf, SurfaceBsdf};
pub use camera::Camera;
pub use geometry::{MarchConfig, SdfScene, ShadingPoint, SurfaceHit};
pub use integrator::{path_radiance, sample_pixel, spectral_to_rgb};
pub use light::{Emitter, Environment, Lights};
pub use microfacet::Beckmann;
pub use renderer::{color_to_rgba, Color, ImageBuffer, ProgressiveRenderer, RenderConfig};
pub use scene::Scene;
pub use sdf::{shape_sdf, Sdf, SdfUnion};
pub use wavelength::{WavelengthSample, WavelengthSampler};

/// Re-export Vec3 and common math types from caustic_math
pub use caustic_math::{Interval, Ray, Vec3};
