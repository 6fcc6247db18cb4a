//! Pinhole camera for primary ray generation.

use caustic_core::CameraDesc;
use caustic_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::gen_f32;

/// Camera for generating rays into the scene.
#[derive(Clone, Debug)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32, // Vertical field of view in degrees
    zoom: f32, // Divides the viewport size

    // Clip distances along each primary ray
    near: f32,
    far: f32,

    // Cached computed values (set by initialize())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 640,
            image_height: 360,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            zoom: 1.0,
            near: 0.0,
            far: f32::INFINITY,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        }
    }

    /// Build and initialize a camera from a scene description.
    pub fn from_desc(desc: &CameraDesc, width: u32, height: u32) -> Self {
        let mut camera = Self::new()
            .with_resolution(width, height)
            .with_position(
                Vec3::from_array(desc.position),
                Vec3::from_array(desc.target),
                Vec3::from_array(desc.up),
            )
            .with_lens(desc.vfov, desc.zoom)
            .with_clip(desc.near, desc.far);
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, zoom: f32) -> Self {
        self.vfov = vfov;
        self.zoom = zoom;
        self
    }

    /// Set near and far clip distances.
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        // Calculate viewport dimensions on a plane at unit distance
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan() / self.zoom.max(1.0e-3);
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * self.aspect_ratio();

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left = self.look_from - self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height.max(1) as f32
    }

    /// Generate a jittered ray for pixel (i, j).
    ///
    /// The ray starts on the near clip plane.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let (ox, oy) = (gen_f32(rng) - 0.5, gen_f32(rng) - 0.5);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + ox) * self.pixel_delta_u
            + ((j as f32) + oy) * self.pixel_delta_v;

        let direction = (pixel_sample - self.look_from).normalize();
        let origin = self.look_from + direction * self.near_distance(direction);
        Ray::new(origin, direction)
    }

    /// Distance along a primary ray from the near plane to the far plane.
    pub fn clip_length(&self, direction: Vec3) -> f32 {
        (self.far - self.near) / self.cos_to_forward(direction)
    }

    fn near_distance(&self, direction: Vec3) -> f32 {
        self.near / self.cos_to_forward(direction)
    }

    fn cos_to_forward(&self, direction: Vec3) -> f32 {
        (-self.w).dot(direction).max(1.0e-3)
    }

    /// Forward, right and up vectors.
    pub fn frame(&self) -> (Vec3, Vec3, Vec3) {
        (-self.w, self.u, self.v)
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(0.0, 1.0, 0.0),
            )
            .with_lens(90.0, 1.0);

        camera.initialize();

        let (forward, right, up) = camera.frame();
        assert!((forward - Vec3::NEG_Z).length() < 0.001);
        assert!((right - Vec3::X).length() < 0.001);
        assert!((up - Vec3::Y).length() < 0.001);
        assert!((camera.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_ray_direction() {
        let mut camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 1.0);

        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);

        // Center ray should point roughly towards -Z
        let ray = camera.get_ray(50, 50, &mut rng);
        assert!(ray.direction().z < -0.99);

        // Top-left corner ray leans left and up at the 90° field of view
        let corner = camera.get_ray(0, 0, &mut rng);
        assert!(corner.direction().x < -0.5);
        assert!(corner.direction().y > 0.5);
    }

    #[test]
    fn test_zoom_narrows_field() {
        let mut wide = Camera::new().with_resolution(100, 100).with_lens(60.0, 1.0);
        let mut narrow = Camera::new().with_resolution(100, 100).with_lens(60.0, 4.0);
        wide.initialize();
        narrow.initialize();

        let mut rng = StdRng::seed_from_u64(1);
        let a = wide.get_ray(0, 50, &mut rng).direction();
        let mut rng = StdRng::seed_from_u64(1);
        let b = narrow.get_ray(0, 50, &mut rng).direction();
        assert!(b.x.abs() < a.x.abs());
    }

    #[test]
    fn test_near_plane_offsets_origin() {
        let desc = CameraDesc {
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            vfov: 40.0,
            zoom: 1.0,
            near: 0.5,
            far: 10.0,
        };
        let camera = Camera::from_desc(&desc, 10, 10);
        let mut rng = StdRng::seed_from_u64(3);
        let ray = camera.get_ray(5, 5, &mut rng);
        let along = (ray.origin() - camera.position()).dot(Vec3::NEG_Z);
        assert!((along - 0.5).abs() < 1e-4);
        assert!((camera.clip_length(ray.direction()) - 9.5).abs() < 0.1);
    }
}
