//! View frustum and plane primitives

use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::bounds::{Aabb, Sphere};

/// Plane defined by normal and distance from origin.
///
/// Points with a non-negative [`Plane::distance_to_point`] lie on the inner
/// side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Signed offset along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Build from `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`,
    /// rescaled so the normal has unit length.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.norm();
        if length > f32::EPSILON {
            Self {
                normal: normal / length,
                distance: coefficients.w / length,
            }
        } else {
            Self {
                normal,
                distance: coefficients.w,
            }
        }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes with inward normals: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb-Hartmann extraction for OpenGL-style clip space
    /// (`-w <= x, y, z <= w`) and column vectors (`clip = vp * world`).
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// World-space box around the frustum volume.
    ///
    /// Unprojects the eight clip-space corners; `None` when the matrix is
    /// singular.
    pub fn bounds(view_projection: &Mat4) -> Option<Aabb> {
        let inverse = view_projection.try_inverse()?;
        let mut corners = Vec::with_capacity(8);
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    let world = inverse * Vec4::new(x, y, z, 1.0);
                    if world.w.abs() <= f32::EPSILON {
                        return None;
                    }
                    corners.push(world.xyz() / world.w);
                }
            }
        }
        Aabb::from_points(corners)
    }

    /// Whether `point` is inside all six planes
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Whether any part of the sphere is inside the frustum
    pub fn contains_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(&sphere.center) >= -sphere.radius)
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn contains_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // Corner furthest along the plane normal
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 {
                p.x = aabb.max.x;
            }
            if plane.normal.y >= 0.0 {
                p.y = aabb.max.y;
            }
            if plane.normal.z >= 0.0 {
                p.z = aabb.max.z;
            }

            if plane.distance_to_point(&p) < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    fn camera() -> Mat4 {
        let eye = Point3::new(0.0, 0.0, 10.0);
        let target = Point3::origin();
        let view = Mat4::look_at_rh(&eye, &target, &Vec3::y());
        let projection = Mat4::new_perspective(16.0 / 9.0, 60f32.to_radians(), 0.1, 100.0);
        projection * view
    }

    #[test]
    fn test_look_at_target_is_inside() {
        let frustum = Frustum::from_view_projection(&camera());
        assert!(frustum.contains_point(&Vec3::zeros()));
    }

    #[test]
    fn test_point_behind_camera_is_outside() {
        let frustum = Frustum::from_view_projection(&camera());
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, 20.0)));
    }

    #[test]
    fn test_point_beyond_far_plane_is_outside() {
        let frustum = Frustum::from_view_projection(&camera());
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, -200.0)));
    }

    #[test]
    fn test_planes_are_normalized() {
        let frustum = Frustum::from_view_projection(&camera());
        for plane in &frustum.planes {
            assert_relative_eq!(plane.normal.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sphere_straddling_plane_is_visible() {
        let frustum = Frustum::from_view_projection(&camera());
        // Centre just behind the eye, radius reaching past the near plane
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 10.5), 1.0);
        assert!(frustum.contains_sphere(&sphere));
        assert!(!frustum.contains_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 20.0), 1.0)));
    }

    #[test]
    fn test_aabb_positive_vertex() {
        let frustum = Frustum::from_view_projection(&camera());
        let inside = Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        let far_left = Aabb::from_center_extents(Vec3::new(-500.0, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(frustum.contains_aabb(&inside));
        assert!(!frustum.contains_aabb(&far_left));
    }

    #[test]
    fn test_bounds_enclose_view_volume() {
        let bounds = Frustum::bounds(&camera()).unwrap();
        assert!(bounds.contains(&Vec3::zeros()));
        // Near plane sits 0.1 in front of the eye, far plane 100 away
        assert_relative_eq!(bounds.max.z, 9.9, epsilon = 1e-2);
        assert_relative_eq!(bounds.min.z, -90.0, epsilon = 1.0);
    }

    #[test]
    fn test_bounds_of_singular_matrix() {
        assert!(Frustum::bounds(&Mat4::zeros()).is_none());
    }
}
