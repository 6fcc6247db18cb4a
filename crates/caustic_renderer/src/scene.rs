//! Renderable scene assembled from a description.

use caustic_core::{ConfigResult, MaterialSet, SceneDescription};

use crate::geometry::{MarchConfig, SdfScene};
use crate::light::{Emitter, Environment, Lights};
use crate::wavelength::WavelengthSampler;

/// Everything the integrator reads while tracing paths.
pub struct Scene {
    pub geometry: SdfScene,
    pub materials: MaterialSet,
    pub lights: Lights,
    pub wavelengths: WavelengthSampler,
}

impl Scene {
    pub fn new(
        geometry: SdfScene,
        materials: MaterialSet,
        lights: Lights,
        wavelengths: WavelengthSampler,
    ) -> Self {
        Self {
            geometry,
            materials,
            lights,
            wavelengths,
        }
    }

    /// Validate a description and build its renderable form.
    ///
    /// Unknown preset names and invalid parameters are reported here, never
    /// during rendering.
    pub fn from_description(desc: &SceneDescription) -> ConfigResult<Self> {
        desc.validate()?;
        let materials = desc.materials.resolve()?;

        let wavelengths = WavelengthSampler::new(&desc.emitter.spectrum);
        let emitter = Emitter::new(&desc.emitter, wavelengths.emission_mean());
        let environment = Environment::new(&desc.environment);

        let march = MarchConfig::from_settings(&desc.render);
        let geometry = SdfScene::from_geometry(&desc.geometry, march);

        log::info!(
            "Scene ready: dielectric '{}', metal '{}', emitter radius {}",
            materials.dielectric.name,
            materials.metal.name,
            desc.emitter.radius
        );

        Ok(Self::new(
            geometry,
            materials,
            Lights::new(emitter, environment),
            wavelengths,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caustic_core::{ConfigError, MaterialClass, ShapeDesc};
    use caustic_math::{Ray, Vec3};

    #[test]
    fn test_from_description() {
        let mut desc = SceneDescription::default();
        desc.geometry.metal.push(ShapeDesc::Sphere {
            center: [0.0, 0.0, -3.0],
            radius: 1.0,
        });
        desc.materials.metal.preset = "Silver".to_string();

        let scene = Scene::from_description(&desc).unwrap();
        assert_eq!(scene.materials.metal.name, "Silver");
        let hit = scene
            .geometry
            .trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z))
            .unwrap();
        assert_eq!(hit.class, MaterialClass::Metal);
    }

    #[test]
    fn test_unknown_preset_fails_at_setup() {
        let mut desc = SceneDescription::default();
        desc.materials.dielectric.preset = "Unobtainium".to_string();
        assert!(matches!(
            Scene::from_description(&desc),
            Err(ConfigError::UnknownDielectric(_))
        ));
    }
}
