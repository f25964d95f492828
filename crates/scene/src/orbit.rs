use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Exactly overhead degenerates the view basis; keep a little margin.
const POLAR_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    yaw: f32,
    polar: f32,
    distance: f32,
}

impl Pose {
    fn lerp(self, other: Pose, t: f32) -> Pose {
        Pose {
            yaw: self.yaw + (other.yaw - self.yaw) * t,
            polar: self.polar + (other.polar - self.polar) * t,
            distance: self.distance + (other.distance - self.distance) * t,
        }
    }
}

/// Timed ease between two orbit poses, used for the opening fly-in.
#[derive(Debug)]
struct Glide {
    from: Pose,
    to: Pose,
    elapsed: f32,
    duration: f32,
}

/// Orbit camera: yaw and polar angle around a target at a clamped distance.
///
/// Orbit motion lives outside the scene data; the renderer only ever sees
/// the resulting matrices.
#[derive(Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    /// Angle from straight overhead (+Y), radians.
    pub polar: f32,
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    max_polar: f32,
    /// Pose the fly-in settles at.
    rest: Pose,
    glide: Option<Glide>,
    fly_in_seconds: f32,
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let offset = config.eye - config.target;
        let distance = offset
            .length()
            .clamp(config.min_distance, config.max_distance);
        let max_polar = config.max_polar_degrees.to_radians();
        let polar = (offset.y / offset.length())
            .clamp(-1.0, 1.0)
            .acos()
            .clamp(POLAR_EPSILON, max_polar);
        let yaw = offset.z.atan2(offset.x);
        let rest = Pose {
            yaw,
            polar,
            distance,
        };

        Self {
            target: config.target,
            yaw,
            polar,
            distance,
            fov: config.fov_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            max_polar,
            rest,
            glide: None,
            fly_in_seconds: config.fly_in_seconds,
        }
    }

    pub fn position(&self) -> Vec3 {
        let dir = Vec3::new(
            self.polar.sin() * self.yaw.cos(),
            self.polar.cos(),
            self.polar.sin() * self.yaw.sin(),
        );
        self.target + dir * self.distance
    }

    /// Orbit by a mouse delta. Cancels any active glide.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.cancel_glide();
        self.yaw += dx * self.sensitivity;
        self.polar = (self.polar - dy * self.sensitivity).clamp(POLAR_EPSILON, self.max_polar);
    }

    /// Zoom by scroll lines; positive zooms in. Cancels any active glide.
    pub fn zoom(&mut self, delta: f32) {
        self.cancel_glide();
        self.distance = (self.distance * (1.0 - delta * self.zoom_speed))
            .clamp(self.min_distance, self.max_distance);
    }

    /// Start the opening fly-in: swing out to the distance limit, then
    /// ease back to the configured rest pose.
    pub fn begin_fly_in(&mut self) {
        let from = Pose {
            yaw: self.rest.yaw - 0.7,
            polar: (self.rest.polar - 0.35).max(POLAR_EPSILON),
            distance: self.max_distance,
        };
        self.yaw = from.yaw;
        self.polar = from.polar;
        self.distance = from.distance;
        self.glide = Some(Glide {
            from,
            to: self.rest,
            elapsed: 0.0,
            duration: self.fly_in_seconds.max(0.01),
        });
    }

    pub fn cancel_glide(&mut self) {
        self.glide = None;
    }

    pub fn is_gliding(&self) -> bool {
        self.glide.is_some()
    }

    /// Advance the glide, if any. Returns true while still gliding.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(glide) = &mut self.glide else {
            return false;
        };

        glide.elapsed += dt;
        let t = (glide.elapsed / glide.duration).clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        let pose = glide.from.lerp(glide.to, eased);
        self.yaw = pose.yaw;
        self.polar = pose.polar;
        self.distance = pose.distance;

        if t >= 1.0 {
            self.glide = None;
            false
        } else {
            true
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn from_config_reconstructs_eye() {
        let config = CameraConfig::default();
        let cam = OrbitCamera::from_config(&config, 1.0);
        let eye = cam.position();
        assert!((eye - config.eye).length() < 1e-4);
    }

    #[test]
    fn rotate_respects_polar_clamp() {
        let mut cam = camera();
        cam.rotate(0.0, -10_000.0);
        assert!(cam.polar <= cam.max_polar + 1e-6);
        cam.rotate(0.0, 10_000.0);
        assert!(cam.polar >= POLAR_EPSILON);
    }

    #[test]
    fn zoom_respects_distance_clamp() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.zoom(-5.0);
        }
        assert!(cam.distance <= cam.max_distance + 1e-6);
        for _ in 0..100 {
            cam.zoom(5.0);
        }
        assert!(cam.distance >= cam.min_distance - 1e-6);
    }

    #[test]
    fn fly_in_settles_at_rest_pose() {
        let mut cam = camera();
        let rest_distance = cam.distance;
        let rest_yaw = cam.yaw;

        cam.begin_fly_in();
        assert!(cam.is_gliding());
        assert_eq!(cam.distance, cam.max_distance);

        while cam.update(0.1) {}
        assert!(!cam.is_gliding());
        assert!((cam.distance - rest_distance).abs() < 1e-4);
        assert!((cam.yaw - rest_yaw).abs() < 1e-4);
    }

    #[test]
    fn input_cancels_fly_in() {
        let mut cam = camera();
        cam.begin_fly_in();
        cam.rotate(1.0, 0.0);
        assert!(!cam.is_gliding());
        assert!(!cam.update(0.1));
    }

    #[test]
    fn matrices_are_finite() {
        let cam = camera();
        let vp = cam.view_projection();
        for col in 0..4 {
            assert!(vp.col(col).is_finite());
        }
    }
}
