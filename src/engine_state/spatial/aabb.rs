//! Axis-aligned bounding boxes.

use cgmath::{EuclideanSpace, Point3, Vector3};

/// An axis-aligned box. Bounds are inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3<f32>,
    /// Maximum corner
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its corners.
    #[inline]
    pub const fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Aabb { min, max }
    }

    /// Creates a box from its minimum corner and size.
    pub fn from_min_size(min: Point3<f32>, size: Vector3<f32>) -> Self {
        Aabb {
            min,
            max: min + size,
        }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// Edge lengths.
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Check if a point is inside the box
    #[inline]
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if `other` lies entirely inside this box
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Check if this box intersects another. Touching boxes intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Bounds of one of the eight equal octants.
    ///
    /// Bit 0 of `index` selects the upper half along X, bit 1 along Y, bit 2 along Z.
    pub fn octant(&self, index: usize) -> Aabb {
        let center = self.center();
        let pick = |bit: usize, low: f32, mid: f32, high: f32| {
            if index & bit != 0 {
                (mid, high)
            } else {
                (low, mid)
            }
        };
        let (min_x, max_x) = pick(1, self.min.x, center.x, self.max.x);
        let (min_y, max_y) = pick(2, self.min.y, center.y, self.max.y);
        let (min_z, max_z) = pick(4, self.min.z, center.z, self.max.z);
        Aabb::new(
            Point3::new(min_x, min_y, min_z),
            Point3::new(max_x, max_y, max_z),
        )
    }

    /// The octant that fully contains `bounds`, if exactly one does.
    ///
    /// The minimum corner picks the upper half on ties with the center and the maximum
    /// corner the lower half, so a box ending exactly on the center plane still fits
    /// the lower octant.
    pub fn child_octant(&self, bounds: &Aabb) -> Option<usize> {
        let center = self.center();
        let low_corner = (bounds.min.x >= center.x) as usize
            | ((bounds.min.y >= center.y) as usize) << 1
            | ((bounds.min.z >= center.z) as usize) << 2;
        let high_corner = (bounds.max.x > center.x) as usize
            | ((bounds.max.y > center.y) as usize) << 1
            | ((bounds.max.z > center.z) as usize) << 2;
        (low_corner == high_corner).then_some(low_corner)
    }

    /// Slab test against a ray.
    ///
    /// # Arguments
    /// * `origin` - Ray start
    /// * `direction` - Ray direction; need not be normalized, `t` is in its units
    /// * `max_distance` - Largest accepted `t`
    ///
    /// # Returns
    /// The entry parameter `t` (0 if the origin is inside), or `None` if the ray misses
    /// the box within `0..=max_distance`.
    pub fn intersect_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<f32> {
        self.ray_span(origin, direction, max_distance)
            .map(|(t_near, _)| t_near)
    }

    /// Entry and exit parameters of a ray through the box, clipped to
    /// `0..=max_distance`.
    pub fn ray_span(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<(f32, f32)> {
        let mut t_near = 0.0f32;
        let mut t_far = max_distance;

        for axis in 0..3 {
            let (o, d, min, max) = (origin[axis], direction[axis], self.min[axis], self.max[axis]);
            if d == 0.0 {
                if o < min || o > max {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t1, t2) = ((min - o) * inv, (max - o) * inv);
            let (t_min, t_max) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            t_near = t_near.max(t_min);
            t_far = t_far.min(t_max);
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(min: f32, max: f32) -> Aabb {
        Aabb::new(Point3::new(min, min, min), Point3::new(max, max, max))
    }

    #[test]
    fn containment_and_intersection() {
        let outer = cube(0.0, 16.0);
        assert!(outer.contains(&cube(2.0, 4.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&cube(8.0, 20.0)));
        assert!(outer.intersects(&cube(8.0, 20.0)));
        assert!(outer.intersects(&cube(16.0, 20.0)));
        assert!(!outer.intersects(&cube(17.0, 20.0)));
    }

    #[test]
    fn octants_partition_the_box() {
        let bounds = cube(-8.0, 8.0);
        assert_eq!(bounds.octant(0), cube(-8.0, 0.0));
        assert_eq!(bounds.octant(7), cube(0.0, 8.0));
        let east_low = bounds.octant(1);
        assert_eq!(east_low.min, Point3::new(0.0, -8.0, -8.0));
        assert_eq!(east_low.max, Point3::new(8.0, 0.0, 0.0));
    }

    #[test]
    fn child_octant_handles_center_plane() {
        let bounds = cube(-32.0, 32.0);
        assert_eq!(bounds.child_octant(&cube(-16.0, 0.0)), Some(0));
        assert_eq!(bounds.child_octant(&cube(0.0, 16.0)), Some(7));
        assert_eq!(bounds.child_octant(&cube(-8.0, 8.0)), None);
        for index in 0..8 {
            let octant = bounds.octant(index);
            assert_eq!(bounds.child_octant(&octant), Some(index));
        }
    }

    #[test]
    fn ray_hits_and_misses() {
        let bounds = cube(0.0, 1.0);
        let hit = bounds.intersect_ray(Point3::new(-1.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0), 10.0);
        assert_eq!(hit, Some(1.0));
        // Inside the box the entry distance is zero.
        let inside = bounds.intersect_ray(Point3::new(0.5, 0.5, 0.5), Vector3::new(0.0, -1.0, 0.0), 10.0);
        assert_eq!(inside, Some(0.0));
        // Parallel and outside the slab.
        let parallel = bounds.intersect_ray(Point3::new(-1.0, 2.0, 0.5), Vector3::new(1.0, 0.0, 0.0), 10.0);
        assert_eq!(parallel, None);
        // Pointing away.
        let away = bounds.intersect_ray(Point3::new(-1.0, 0.5, 0.5), Vector3::new(-1.0, 0.0, 0.0), 10.0);
        assert_eq!(away, None);
        // Too short.
        let short = bounds.intersect_ray(Point3::new(-5.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0), 2.0);
        assert_eq!(short, None);
    }

    #[test]
    fn ray_span_reports_the_exit() {
        let bounds = cube(0.0, 4.0);
        let origin = Point3::new(-2.0, 1.0, 1.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(bounds.ray_span(origin, direction, f32::INFINITY), Some((2.0, 6.0)));
        assert_eq!(bounds.ray_span(origin, direction, 3.0), Some((2.0, 3.0)));
    }
}
