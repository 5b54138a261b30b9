/// Camera - look-at camera turned into view and projection matrices by the renderer

use glam::{Mat4, Vec3};

use candid_core::candid::{Error, Result};

/// Perspective look-at camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Width / height; `<= 0` uses the surface aspect ratio
    pub aspect_ratio: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near_plane: 0.1,
            far_plane: 100.0,
            aspect_ratio: 0.0,
        }
    }
}

impl Camera {
    /// Camera at `position` looking at `target` with the default lens
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self { position, target, ..Default::default() }
    }

    /// Right-handed look-at view matrix
    ///
    /// forward = normalize(target - position), right = normalize(forward x up),
    /// true up = right x forward.
    pub fn view_matrix(&self) -> Result<Mat4> {
        let forward = self.target - self.position;
        if !forward.is_finite() || forward.length_squared() <= f32::EPSILON {
            return Err(Error::InvalidArgument("camera position and target coincide".to_string()));
        }
        let forward = forward.normalize();
        if !self.up.is_finite() || forward.cross(self.up).length_squared() <= f32::EPSILON {
            return Err(Error::InvalidArgument("camera up vector is zero or parallel to the view direction".to_string()));
        }
        Ok(Mat4::look_to_rh(self.position, forward, self.up.normalize()))
    }

    /// Right-handed perspective projection with a 0..1 depth range
    ///
    /// # Arguments
    ///
    /// * `surface_aspect` - Used when `aspect_ratio <= 0`
    pub fn projection_matrix(&self, surface_aspect: f32) -> Result<Mat4> {
        let aspect = if self.aspect_ratio > 0.0 { self.aspect_ratio } else { surface_aspect };
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(Error::InvalidArgument(format!("invalid aspect ratio {}", aspect)));
        }
        if !self.fov_y.is_finite() || self.fov_y <= 0.0 || self.fov_y >= std::f32::consts::PI {
            return Err(Error::InvalidArgument(format!("field of view {} rad outside (0, pi)", self.fov_y)));
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane && self.far_plane.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "invalid clip planes (near {}, far {})",
                self.near_plane, self.far_plane
            )));
        }
        Ok(Mat4::perspective_rh(self.fov_y, aspect, self.near_plane, self.far_plane))
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
