//! Mapping between the 2D canvas and the 3D room, plus camera rays.
//!
//! The 3D view places the canvas on the floor plane `y = 0`. One world unit
//! is 100 canvas pixels and the canvas origin sits at world `(-3, 0, -3)`:
//!
//! ```text
//! world.x = canvas.x / 100 - 3        canvas.x = (world.x + 3) * 100
//! world.z = canvas.y / 100 - 3        canvas.y = (world.z + 3) * 100
//! ```

use nalgebra::{Isometry3, Perspective3, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::CanvasType;
use super::furniture::{CanvasPoint, FurnitureItem};

/// Canvas pixels per world unit.
pub const PIXELS_PER_UNIT: f32 = 100.0;

/// World-space offset of the canvas origin along X and Z.
pub const CANVAS_ORIGIN_OFFSET: f32 = 3.0;

/// Convert a canvas point to world `(x, z)` on the floor.
#[must_use]
pub fn canvas_to_world(point: CanvasPoint) -> (f32, f32) {
    (
        point.x / PIXELS_PER_UNIT - CANVAS_ORIGIN_OFFSET,
        point.y / PIXELS_PER_UNIT - CANVAS_ORIGIN_OFFSET,
    )
}

/// Convert a world floor coordinate back to a canvas point.
#[must_use]
pub fn world_to_canvas(x: f32, z: f32) -> CanvasPoint {
    CanvasPoint::new(
        (x + CANVAS_ORIGIN_OFFSET) * PIXELS_PER_UNIT,
        (z + CANVAS_ORIGIN_OFFSET) * PIXELS_PER_UNIT,
    )
}

/// World position of an item's 3D group origin.
#[must_use]
pub fn item_world_position(item: &FurnitureItem) -> Point3<f32> {
    let (x, z) = canvas_to_world(CanvasPoint::new(item.position.x, item.position.y));
    Point3::new(x, item.kind.lift(), z)
}

/// The room the 3D canvas is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

impl Room {
    /// Room matching a canvas shape.
    #[must_use]
    pub const fn for_canvas(canvas_type: CanvasType) -> Self {
        let width = match canvas_type {
            CanvasType::Square => 10.0,
            CanvasType::Rectangle => 13.33,
        };
        Self {
            width,
            depth: 10.0,
            height: 5.0,
        }
    }

    /// Whether a floor point lies on the room's floor.
    #[must_use]
    pub fn contains_floor_point(&self, x: f32, z: f32) -> bool {
        x.abs() <= self.width / 2.0 && z.abs() <= self.depth / 2.0
    }
}

/// A pointer position in normalized device coordinates: `x` and `y` in
/// `[-1, 1]`, `y` pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ndc {
    pub x: f32,
    pub y: f32,
}

impl Ndc {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert a pixel position inside a viewport (origin top-left) to NDC.
    #[must_use]
    pub fn from_viewport(px: f32, py: f32, width: f32, height: f32) -> Self {
        Self {
            x: (px / width).mul_add(2.0, -1.0),
            y: -(py / height).mul_add(2.0, -1.0),
        }
    }
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }

    /// Intersect with the horizontal plane `y = height`.
    ///
    /// Returns `None` when the ray is parallel to the plane or points away
    /// from it.
    #[must_use]
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<Point3<f32>> {
        let dy = self.direction.y;
        if dy.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / dy;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Intersect with the room's floor, limited to its footprint.
    #[must_use]
    pub fn intersect_floor(&self, room: &Room) -> Option<Point3<f32>> {
        self.intersect_horizontal_plane(0.0)
            .filter(|hit| room.contains_floor_point(hit.x, hit.z))
    }

    /// Distance to an axis-aligned box (slab test), or `None` on a miss.
    #[must_use]
    pub fn intersect_aabb(&self, min: &Point3<f32>, max: &Point3<f32>) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];

            if dir.abs() < f32::EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }

            let t1 = (min[axis] - origin) / dir;
            let t2 = (max[axis] - origin) / dir;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}

/// A perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// The design canvas camera: above and in front of the room.
    #[must_use]
    pub const fn design(aspect: f32) -> Self {
        Self {
            eye: [0.0, 5.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov_y: 50.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// The product preview camera: low and close to a single model.
    #[must_use]
    pub const fn preview(aspect: f32) -> Self {
        Self {
            eye: [0.0, 2.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_y: 45.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    #[must_use]
    pub fn eye_point(&self) -> Point3<f32> {
        Point3::from(self.eye)
    }

    /// World-to-camera transform.
    #[must_use]
    pub fn view(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(
            &self.eye_point(),
            &Point3::from(self.target),
            &Vector3::y(),
        )
    }

    #[must_use]
    pub fn projection(&self) -> Perspective3<f32> {
        Perspective3::new(self.aspect, self.fov_y.to_radians(), self.near, self.far)
    }

    /// Project a world point to NDC `(x, y, depth)`.
    ///
    /// Returns `None` for points at or behind the near plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f32>) -> Option<Point3<f32>> {
        let view_point = self.view().transform_point(point);
        if -view_point.z < self.near {
            return None;
        }
        Some(self.projection().project_point(&view_point))
    }

    /// The ray from the eye through a pointer position.
    #[must_use]
    pub fn ray(&self, ndc: Ndc) -> Ray {
        let on_near_plane = self
            .projection()
            .unproject_point(&Point3::new(ndc.x, ndc.y, -1.0));
        let world = self.view().inverse_transform_point(&on_near_plane);
        let eye = self.eye_point();
        Ray::new(eye, world - eye)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::canvas::FurnitureKind;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_canvas_world_round_trip() {
        let (x, z) = canvas_to_world(CanvasPoint::new(100.0, 450.0));
        assert!(close(x, -2.0) && close(z, 1.5));

        let back = world_to_canvas(x, z);
        assert!(close(back.x, 100.0) && close(back.y, 450.0));
    }

    #[test]
    fn test_item_world_position_uses_lift() {
        let item = FurnitureItem::new(FurnitureKind::Table);
        let p = item_world_position(&item);
        assert!(close(p.x, -2.0) && close(p.y, 0.25) && close(p.z, -2.0));
    }

    #[test]
    fn test_center_ray_hits_floor_at_origin() {
        let camera = Camera::design(4.0 / 3.0);
        let hit = camera
            .ray(Ndc::new(0.0, 0.0))
            .intersect_floor(&Room::for_canvas(CanvasType::Square))
            .unwrap();
        assert!(close(hit.x, 0.0) && close(hit.y, 0.0) && close(hit.z, 0.0));
    }

    #[test]
    fn test_project_then_ray_recovers_floor_point() {
        let camera = Camera::design(4.0 / 3.0);
        let floor_point = Point3::new(1.5, 0.0, -2.0);

        let ndc = camera.project(&floor_point).unwrap();
        let hit = camera
            .ray(Ndc::new(ndc.x, ndc.y))
            .intersect_horizontal_plane(0.0)
            .unwrap();

        assert!(close(hit.x, 1.5), "{hit:?}");
        assert!(close(hit.z, -2.0), "{hit:?}");
    }

    #[test]
    fn test_rays_off_the_floor_miss_it() {
        let room = Room::for_canvas(CanvasType::Square);
        // The top edge of the view meets the floor plane far behind the back wall
        let ray = Camera::design(1.0).ray(Ndc::new(0.0, 1.0));
        let far_hit = ray.intersect_horizontal_plane(0.0).unwrap();
        assert!(far_hit.z < -room.depth / 2.0, "{far_hit:?}");
        assert!(ray.intersect_floor(&room).is_none());

        assert!(Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0))
            .intersect_horizontal_plane(0.0)
            .is_none());
        assert!(Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            .intersect_horizontal_plane(0.0)
            .is_none());
    }

    #[test]
    fn test_floor_hit_outside_room_is_ignored() {
        let room = Room::for_canvas(CanvasType::Square);
        let ray = Ray::new(Point3::new(20.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(ray.intersect_horizontal_plane(0.0).is_some());
        assert!(ray.intersect_floor(&room).is_none());
        assert!(Room::for_canvas(CanvasType::Rectangle).contains_floor_point(6.0, 0.0));
    }

    #[test]
    fn test_ray_aabb() {
        let ray = Ray::new(Point3::new(0.0, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let min = Point3::new(-1.0, 0.0, -1.0);
        let max = Point3::new(1.0, 1.0, 1.0);
        assert!(close(ray.intersect_aabb(&min, &max).unwrap(), 9.0));

        let miss = Ray::new(Point3::new(3.0, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(miss.intersect_aabb(&min, &max).is_none());

        let behind = Ray::new(Point3::new(0.0, 0.5, 10.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(behind.intersect_aabb(&min, &max).is_none());
    }

    #[test]
    fn test_ndc_from_viewport() {
        let ndc = Ndc::from_viewport(400.0, 300.0, 800.0, 600.0);
        assert!(close(ndc.x, 0.0) && close(ndc.y, 0.0));
        let corner = Ndc::from_viewport(0.0, 0.0, 800.0, 600.0);
        assert!(close(corner.x, -1.0) && close(corner.y, 1.0));
    }
}
