//! Bounding volumes

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box enclosing every point; `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(&p),
            max: acc.max.sup(&p),
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box by `margin` on every side
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        let m = Vec3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Check if this AABB contains a point (boundary inclusive)
    pub fn contains(&self, point: &Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Closest point inside the box to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        point.sup(&self.min).inf(&self.max)
    }

    /// Test ray intersection with this AABB using the slab method.
    ///
    /// Returns the distance along `ray_dir` to the entry point, or 0 when the
    /// origin is inside the box.
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let inv = |d: f32| if d == 0.0 { f32::INFINITY } else { 1.0 / d };
        let inv_dir = Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

        let t1 = (self.min - ray_origin).component_mul(&inv_dir);
        let t2 = (self.max - ray_origin).component_mul(&inv_dir);

        let tmin = t1.inf(&t2).max();
        let tmax = t1.sup(&t2).min();

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center in world space
    pub center: Vec3,
    /// Radius, expected non-negative
    pub radius: f32,
}

impl Sphere {
    /// Create a sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside or on the sphere
    pub fn contains(&self, point: &Vec3) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Sphere/box overlap, boundary inclusive
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let closest = aabb.closest_point(&self.center);
        (closest - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Sphere/sphere overlap, boundary inclusive
    pub fn intersects_sphere(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).norm_squared() <= reach * reach
    }

    /// Box tightly enclosing the sphere
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::repeat(self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = unit_box();
        assert!(aabb.contains(&Vec3::new(0.5, 0.5, 0.5)));
        assert!(aabb.contains(&Vec3::new(1.0, 0.0, 1.0)));
        assert!(!aabb.contains(&Vec3::new(1.01, 0.5, 0.5)));
    }

    #[test]
    fn test_aabb_touching_boxes_intersect() {
        let a = unit_box();
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_aabb_center_extents() {
        let aabb = Aabb::from_center_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(aabb.extents(), Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(aabb.expanded(2.0).extents(), Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 5.0),
        ])
        .unwrap();
        assert_relative_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_relative_eq!(aabb.max, Vec3::new(1.0, 3.0, 5.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_ray_hits_box() {
        let aabb = unit_box();
        let t = aabb
            .intersect_ray(Vec3::new(-2.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(t, 2.0);
    }

    #[test]
    fn test_ray_misses_box() {
        let aabb = unit_box();
        assert!(aabb
            .intersect_ray(Vec3::new(-2.0, 5.0, 0.5), Vec3::new(1.0, 0.0, 0.0))
            .is_none());
        // Pointing away
        assert!(aabb
            .intersect_ray(Vec3::new(-2.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_ray_from_inside_returns_zero() {
        let aabb = unit_box();
        let t = aabb
            .intersect_ray(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.0, 1.0, 0.0))
            .unwrap();
        assert_relative_eq!(t, 0.0);
    }

    #[test]
    fn test_sphere_intersections() {
        let sphere = Sphere::new(Vec3::new(3.0, 0.5, 0.5), 2.0);
        assert!(sphere.intersects_aabb(&unit_box()));
        assert!(!Sphere::new(Vec3::new(3.0, 0.5, 0.5), 1.5).intersects_aabb(&unit_box()));

        let other = Sphere::new(Vec3::new(6.0, 0.5, 0.5), 1.0);
        assert!(sphere.intersects_sphere(&other));
        assert!(!Sphere::new(Vec3::new(7.0, 0.5, 0.5), 1.0).intersects_sphere(&sphere));
    }
}
