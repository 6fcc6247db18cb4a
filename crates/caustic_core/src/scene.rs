//! Scene description types for Caustic.
//!
//! A scene is described declaratively (and usually loaded from JSON) and then
//! resolved by the renderer. Resolution is where preset names and numeric
//! ranges are validated, so a scene that resolves can always be rendered.

use std::path::Path;

use caustic_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::dispersion::DispersionCurve;
use crate::error::{require_non_negative, require_positive, ConfigResult};
use crate::material::{DielectricMaterial, DiffuseMaterial, MaterialSet, MetalMaterial};
use crate::presets::{dielectric_preset, metal_preset, CONSTANT_IOR_DIELECTRIC};
use crate::spectrum::EmissionSpectrum;

/// Pinhole camera placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub vfov: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 5.0],
            target: [0.0, 0.5, 0.0],
            up: [0.0, 1.0, 0.0],
            vfov: 45.0,
            zoom: 1.0,
            near: 1.0e-3,
            far: 1.0e3,
        }
    }
}

/// Disk light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterDesc {
    pub position: [f32; 3],
    /// Direction the emitting face points towards
    pub direction: [f32; 3],
    pub radius: f32,
    /// Half-angle of the emission cone in degrees
    pub spread: f32,
    /// Mean spectral radiance over the visible range
    pub brightness: f32,
    pub spectrum: EmissionSpectrum,
}

impl Default for EmitterDesc {
    fn default() -> Self {
        Self {
            position: [0.0, 4.0, 0.0],
            direction: [0.0, -1.0, 0.0],
            radius: 0.5,
            spread: 90.0,
            brightness: 20.0,
            spectrum: EmissionSpectrum::default(),
        }
    }
}

/// Blackbody sky.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentDesc {
    /// Sky temperature in kelvin
    pub temperature: f32,
    /// Mean spectral radiance over the visible range
    pub brightness: f32,
}

impl Default for EnvironmentDesc {
    fn default() -> Self {
        Self {
            temperature: 8000.0,
            brightness: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DielectricDesc {
    pub preset: String,
    /// Index used by the constant IOR preset
    pub ior: Option<f32>,
    pub roughness: f32,
    pub absorption_color: [f32; 3],
    pub absorption_scale: f32,
}

impl Default for DielectricDesc {
    fn default() -> Self {
        Self {
            preset: "Glass (BK7)".to_string(),
            ior: None,
            roughness: 0.0,
            absorption_color: [1.0, 1.0, 1.0],
            absorption_scale: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetalDesc {
    pub preset: String,
    pub roughness: f32,
}

impl Default for MetalDesc {
    fn default() -> Self {
        Self {
            preset: "Gold".to_string(),
            roughness: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffuseDesc {
    pub albedo: [f32; 3],
}

impl Default for DiffuseDesc {
    fn default() -> Self {
        Self {
            albedo: [0.5, 0.5, 0.5],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialsDesc {
    pub dielectric: DielectricDesc,
    pub metal: MetalDesc,
    pub diffuse: DiffuseDesc,
}

impl MaterialsDesc {
    /// Resolve preset names into a concrete material set.
    pub fn resolve(&self) -> ConfigResult<MaterialSet> {
        let d = &self.dielectric;
        let preset = dielectric_preset(&d.preset)?;
        let dispersion = match (preset.name, d.ior) {
            (CONSTANT_IOR_DIELECTRIC, Some(ior)) => {
                DispersionCurve::constant(require_positive("dielectric.ior", ior)?)
            }
            _ => preset.curve(),
        };
        let dielectric = DielectricMaterial::new(
            preset.name,
            dispersion,
            require_non_negative("dielectric.roughness", d.roughness)?,
        )
        .with_absorption(
            Vec3::from_array(d.absorption_color),
            require_non_negative("dielectric.absorption_scale", d.absorption_scale)?,
        );

        let m = &self.metal;
        let metal_preset = metal_preset(&m.preset)?;
        let metal = MetalMaterial::new(
            metal_preset.name,
            metal_preset.curve(),
            require_non_negative("metal.roughness", m.roughness)?,
        );

        let diffuse = DiffuseMaterial::new(Vec3::from_array(self.diffuse.albedo));

        log::debug!(
            "Resolved materials: dielectric={}, metal={}",
            dielectric.name,
            metal.name
        );

        Ok(MaterialSet {
            dielectric,
            metal,
            diffuse,
        })
    }
}

/// Signed distance primitives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    /// Half-space below the plane `dot(p, normal) = offset`
    Plane {
        normal: [f32; 3],
        offset: f32,
    },
    Box {
        center: [f32; 3],
        half_extents: [f32; 3],
    },
    RoundedBox {
        center: [f32; 3],
        half_extents: [f32; 3],
        radius: f32,
    },
    /// Torus lying in the xz plane
    Torus {
        center: [f32; 3],
        major_radius: f32,
        minor_radius: f32,
    },
    /// Capped cylinder along y
    Cylinder {
        center: [f32; 3],
        radius: f32,
        half_height: f32,
    },
}

impl ShapeDesc {
    /// Check that sizes are positive.
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            ShapeDesc::Sphere { radius, .. } => {
                require_positive("sphere.radius", *radius)?;
            }
            ShapeDesc::Plane { normal, .. } => {
                require_positive("plane.normal", Vec3::from_array(*normal).length())?;
            }
            ShapeDesc::Box { half_extents, .. } => {
                require_positive(
                    "box.half_extents",
                    Vec3::from_array(*half_extents).min_element(),
                )?;
            }
            ShapeDesc::RoundedBox {
                half_extents,
                radius,
                ..
            } => {
                require_positive(
                    "rounded_box.half_extents",
                    Vec3::from_array(*half_extents).min_element(),
                )?;
                require_non_negative("rounded_box.radius", *radius)?;
            }
            ShapeDesc::Torus {
                major_radius,
                minor_radius,
                ..
            } => {
                require_positive("torus.major_radius", *major_radius)?;
                require_positive("torus.minor_radius", *minor_radius)?;
            }
            ShapeDesc::Cylinder {
                radius,
                half_height,
                ..
            } => {
                require_positive("cylinder.radius", *radius)?;
                require_positive("cylinder.half_height", *half_height)?;
            }
        }
        Ok(())
    }
}

/// Shapes bound to each material channel. Each list is a union.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryDesc {
    pub dielectric: Vec<ShapeDesc>,
    pub metal: Vec<ShapeDesc>,
    pub diffuse: Vec<ShapeDesc>,
}

/// Image and integrator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub max_bounces: u32,
    pub samples_per_frame: u32,
    pub seed: u64,
    pub russian_roulette: bool,
    /// Distance below which a field value counts as a hit
    pub hit_threshold: f32,
    /// Distance beyond which a ray counts as a miss
    pub max_distance: f32,
    pub max_steps: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            max_bounces: 3,
            samples_per_frame: 1,
            seed: 0,
            russian_roulette: false,
            hit_threshold: 1.0e-4,
            max_distance: 1.0e3,
            max_steps: 512,
        }
    }
}

/// Complete declarative scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: CameraDesc,
    pub emitter: EmitterDesc,
    pub environment: EnvironmentDesc,
    pub materials: MaterialsDesc,
    pub geometry: GeometryDesc,
    pub render: RenderSettings,
}

impl SceneDescription {
    /// Parse a scene from JSON text.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_json_str(&text)?;
        log::info!(
            "Loaded scene {} ({} dielectric, {} metal, {} diffuse shapes)",
            path.as_ref().display(),
            scene.geometry.dielectric.len(),
            scene.geometry.metal.len(),
            scene.geometry.diffuse.len()
        );
        Ok(scene)
    }

    /// Validate numeric ranges and preset names.
    pub fn validate(&self) -> ConfigResult<()> {
        require_positive("render.width", self.render.width as f32)?;
        require_positive("render.height", self.render.height as f32)?;
        require_positive("render.samples_per_frame", self.render.samples_per_frame as f32)?;
        require_positive("render.hit_threshold", self.render.hit_threshold)?;
        require_positive("render.max_distance", self.render.max_distance)?;
        require_positive("render.max_steps", self.render.max_steps as f32)?;

        require_positive("camera.vfov", self.camera.vfov)?;
        require_positive("camera.zoom", self.camera.zoom)?;
        require_non_negative("camera.near", self.camera.near)?;
        require_positive("camera.far", self.camera.far - self.camera.near)?;

        require_positive("emitter.radius", self.emitter.radius)?;
        require_positive("emitter.spread", self.emitter.spread)?;
        require_non_negative("emitter.brightness", self.emitter.brightness)?;
        require_positive(
            "emitter.direction",
            Vec3::from_array(self.emitter.direction).length(),
        )?;

        require_positive("environment.temperature", self.environment.temperature)?;
        require_non_negative("environment.brightness", self.environment.brightness)?;

        self.geometry
            .dielectric
            .iter()
            .chain(&self.geometry.metal)
            .chain(&self.geometry.diffuse)
            .try_for_each(ShapeDesc::validate)?;

        self.materials.resolve().map(|_| ())
    }
}
