use glam::{Mat4, Vec2, Vec3};

use crate::scene::Viewport;

/// A perspective camera looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position in world units.
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

/// A world point projected to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Position in viewport pixels.
    pub position: Vec2,
    /// Distance along the view direction.
    pub depth: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

impl Camera {
    const NEAR: f32 = 0.1;
    const FAR: f32 = 1000.0;

    /// Constructs a new [`Camera`].
    pub const fn new(position: Vec3, fov: f32) -> Self {
        Self { position, fov }
    }

    /// Returns the combined view-projection matrix for the viewport.
    pub fn view_projection(&self, viewport: Viewport) -> Mat4 {
        let projection =
            Mat4::perspective_rh_gl(self.fov.to_radians(), viewport.aspect(), Self::NEAR, Self::FAR);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        projection * view
    }

    /// Projects a world point with a precomputed
    /// [`view_projection`](Camera::view_projection) matrix.
    ///
    /// Returns `None` for points behind the camera or outside the viewport.
    pub fn project(&self, matrix: &Mat4, point: Vec3, viewport: Viewport) -> Option<Projected> {
        let clip = *matrix * point.extend(1.0);
        if clip.w <= Self::NEAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
            return None;
        }
        let size = viewport.size();
        let focal = size.y / (2.0 * (self.fov.to_radians() / 2.0).tan());
        Some(Projected {
            position: Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y),
            depth: clip.w,
            scale: focal / clip.w,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_center() {
        let viewport = Viewport::new(800, 600);
        let camera = Camera::new(Vec3::new(0.0, 0.0, 15.0), 60.0);
        let matrix = camera.view_projection(viewport);
        let projected = camera.project(&matrix, Vec3::ZERO, viewport).unwrap();
        assert!((projected.position - Vec2::new(400.0, 300.0)).length() < 1e-3);
        assert!((projected.depth - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_up_is_up_and_behind_is_hidden() {
        let viewport = Viewport::new(800, 600);
        let camera = Camera::new(Vec3::new(0.0, 0.0, 15.0), 60.0);
        let matrix = camera.view_projection(viewport);
        let up = camera.project(&matrix, Vec3::new(0.0, 1.0, 0.0), viewport).unwrap();
        assert!(up.position.y < 300.0);
        assert_eq!(camera.project(&matrix, Vec3::new(0.0, 0.0, 20.0), viewport), None);
    }

    #[test]
    fn test_nearer_points_are_larger() {
        let viewport = Viewport::new(800, 600);
        let camera = Camera::new(Vec3::new(0.0, 0.0, 15.0), 60.0);
        let matrix = camera.view_projection(viewport);
        let near = camera.project(&matrix, Vec3::new(0.0, 0.0, 5.0), viewport).unwrap();
        let far = camera.project(&matrix, Vec3::new(0.0, 0.0, -5.0), viewport).unwrap();
        assert!(near.scale > far.scale);
    }
}
