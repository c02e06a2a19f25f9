//! Declarative 3D scene graph.
//!
//! Furniture and rooms are assembled from primitive meshes (boxes, cylinders,
//! spheres, planes, rings) grouped under a transform. The same scene is
//! serialized for the browser's 3D view and tessellated into triangles for
//! server-side rendering and picking.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::Serialize;

use super::Design;
use super::furniture::{FurnitureItem, FurnitureKind};
use super::projection::{Camera, Room, item_world_position};
use crate::types::{FurnitureId, HexColor};

/// Background of the design view.
pub const DESIGN_BACKGROUND: HexColor = HexColor::from_rgb(0, 0, 0);

/// Background of product previews (deep navy).
pub const PREVIEW_BACKGROUND: HexColor = HexColor::from_rgb(0x0f, 0x17, 0x2a);

/// Shape of a primitive mesh, in its local frame.
///
/// Dimensions follow the usual WebGL conventions: boxes and cylinders are
/// centred on the origin with height along Y; planes and rings lie in the XY
/// plane facing +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    Sphere {
        radius: f32,
        segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        segments: u32,
    },
}

/// What a mesh represents, for picking and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum MeshTag {
    Floor,
    Wall,
    Furniture(FurnitureId),
    SelectionRing(FurnitureId),
    Handle(FurnitureId),
    /// Furniture in a product preview, which has no canvas identity.
    Model,
}

/// Translation, Euler rotation (radians, XYZ order) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: [0.0; 3],
        rotation: [0.0; 3],
        scale: 1.0,
    };

    #[must_use]
    pub const fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            rotation: [0.0; 3],
            scale: 1.0,
        }
    }

    #[must_use]
    pub const fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = [x, y, z];
        self
    }

    #[must_use]
    pub const fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Homogeneous matrix `T * Rx * Ry * Rz * S`.
    #[must_use]
    pub fn matrix(&self) -> Matrix4<f32> {
        let [rx, ry, rz] = self.rotation;
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), rx)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), rz);

        Matrix4::new_translation(&Vector3::from(self.position))
            * rotation.to_homogeneous()
            * Matrix4::new_scaling(self.scale)
    }
}

/// A primitive with a material color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mesh {
    pub geometry: Geometry,
    pub transform: Transform,
    pub color: HexColor,
    /// `1.0` is opaque.
    pub opacity: f32,
    pub tag: MeshTag,
}

impl Mesh {
    #[must_use]
    pub const fn new(
        geometry: Geometry,
        transform: Transform,
        color: HexColor,
        tag: MeshTag,
    ) -> Self {
        Self {
            geometry,
            transform,
            color,
            opacity: 1.0,
            tag,
        }
    }

    #[must_use]
    pub const fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Meshes sharing a parent transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub transform: Transform,
    pub meshes: Vec<Mesh>,
}

/// A world-space triangle with its material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub color: HexColor,
    pub opacity: f32,
    pub tag: MeshTag,
}

impl Triangle {
    /// Unit face normal (counter-clockwise winding), or zero for degenerate
    /// triangles.
    #[must_use]
    pub fn normal(&self) -> Vector3<f32> {
        let [a, b, c] = self.vertices;
        (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Bounds of a set of points, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(acc.map_or(Self { min: *p, max: *p }, |b: Self| Self {
                min: b.min.inf(p),
                max: b.max.sup(p),
            }))
        })
    }
}

/// Directional light used when shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    /// Position the directional light shines from, towards the origin.
    pub direction_from: [f32; 3],
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.5,
            directional: 1.0,
            direction_from: [10.0, 10.0, 5.0],
        }
    }
}

impl Lighting {
    /// Diffuse intensity for a surface normal. Surfaces are lit from both
    /// sides.
    #[must_use]
    pub fn intensity(&self, normal: &Vector3<f32>) -> f32 {
        let to_light = Vector3::from(self.direction_from).normalize();
        self.directional
            .mul_add(normal.dot(&to_light).abs(), self.ambient)
            .min(1.0)
    }
}

/// A complete scene: camera, lights, background and geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub camera: Camera,
    pub lighting: Lighting,
    pub background: HexColor,
    pub groups: Vec<Group>,
}

impl Scene {
    /// The 3D view of a design: the room plus every placed item.
    #[must_use]
    pub fn for_design(design: &Design, aspect: f32) -> Self {
        let room = Room::for_canvas(design.canvas_type());
        let mut groups = vec![room_group(&room, design.canvas_color())];
        groups.extend(
            design
                .items()
                .iter()
                .map(|item| furniture_group(item, design.selected() == Some(item.id))),
        );

        Self {
            camera: Camera::design(aspect),
            lighting: Lighting::default(),
            background: DESIGN_BACKGROUND,
            groups,
        }
    }

    /// A single product model in a plain room.
    #[must_use]
    pub fn for_product(kind: FurnitureKind, color: HexColor, aspect: f32) -> Self {
        let room_color = HexColor::from_rgb(0xf8, 0xfa, 0xfc);
        let room = Group {
            transform: Transform::IDENTITY,
            meshes: vec![
                plane(
                    20.0,
                    20.0,
                    Transform::at(0.0, -0.2, 0.0).rotated(-FRAC_PI_2, 0.0, 0.0),
                    room_color,
                    MeshTag::Floor,
                ),
                plane(20.0, 5.0, Transform::at(0.0, 2.0, -5.0), room_color, MeshTag::Wall),
                plane(
                    20.0,
                    5.0,
                    Transform::at(-10.0, 2.0, 0.0).rotated(0.0, FRAC_PI_2, 0.0),
                    room_color,
                    MeshTag::Wall,
                ),
                plane(
                    20.0,
                    5.0,
                    Transform::at(10.0, 2.0, 0.0).rotated(0.0, -FRAC_PI_2, 0.0),
                    room_color,
                    MeshTag::Wall,
                ),
            ],
        };
        let model = Group {
            transform: Transform::IDENTITY.scaled(1.5),
            meshes: model_meshes(kind, color, MeshTag::Model),
        };

        Self {
            camera: Camera::preview(aspect),
            lighting: Lighting::default(),
            background: PREVIEW_BACKGROUND,
            groups: vec![room, model],
        }
    }

    /// Every mesh tessellated into world-space triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.groups.iter().flat_map(|group| {
            let parent = group.transform.matrix();
            group
                .meshes
                .iter()
                .flat_map(move |mesh| mesh_triangles(mesh, &parent))
        })
    }

    /// World bounds of the furniture meshes of one item.
    #[must_use]
    pub fn furniture_bounds(&self, id: FurnitureId) -> Option<Aabb> {
        let vertices: Vec<Point3<f32>> = self
            .triangles()
            .filter(|tri| tri.tag == MeshTag::Furniture(id))
            .flat_map(|tri| tri.vertices)
            .collect();
        Aabb::from_points(&vertices)
    }
}

// =============================================================================
// Room & Furniture Models
// =============================================================================

fn plane(width: f32, height: f32, transform: Transform, color: HexColor, tag: MeshTag) -> Mesh {
    Mesh::new(Geometry::Plane { width, height }, transform, color, tag)
}

fn cuboid(size: [f32; 3], at: [f32; 3], color: HexColor, tag: MeshTag) -> Mesh {
    let [width, height, depth] = size;
    Mesh::new(
        Geometry::Box {
            width,
            height,
            depth,
        },
        Transform::at(at[0], at[1], at[2]),
        color,
        tag,
    )
}

fn leg(radius: f32, height: f32, at: [f32; 2], tag: MeshTag) -> Mesh {
    Mesh::new(
        Geometry::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            segments: 8,
        },
        Transform::at(at[0], height / 2.0, at[1]),
        HexColor::WOOD,
        tag,
    )
}

/// Floor and three walls in the canvas color.
fn room_group(room: &Room, color: HexColor) -> Group {
    let (w, d, h) = (room.width, room.depth, room.height);
    Group {
        transform: Transform::IDENTITY,
        meshes: vec![
            plane(w, d, Transform::IDENTITY.rotated(-FRAC_PI_2, 0.0, 0.0), color, MeshTag::Floor),
            plane(w, h, Transform::at(0.0, h / 2.0, -d / 2.0), color, MeshTag::Wall),
            plane(
                d,
                h,
                Transform::at(-w / 2.0, h / 2.0, 0.0).rotated(0.0, FRAC_PI_2, 0.0),
                color,
                MeshTag::Wall,
            ),
            plane(
                d,
                h,
                Transform::at(w / 2.0, h / 2.0, 0.0).rotated(0.0, -FRAC_PI_2, 0.0),
                color,
                MeshTag::Wall,
            ),
        ],
    }
}

/// Primitive meshes making up one furniture model, in model space.
#[must_use]
pub fn model_meshes(kind: FurnitureKind, color: HexColor, tag: MeshTag) -> Vec<Mesh> {
    match kind {
        FurnitureKind::Sofa => vec![
            cuboid([2.0, 0.4, 1.0], [0.0, 0.2, 0.0], color, tag),
            cuboid([2.0, 0.8, 0.2], [0.0, 0.6, -0.4], color, tag),
            cuboid([0.2, 0.6, 0.8], [-0.9, 0.5, 0.0], color, tag),
            cuboid([0.2, 0.6, 0.8], [0.9, 0.5, 0.0], color, tag),
        ],
        FurnitureKind::Chair => {
            let mut meshes = vec![
                cuboid([0.6, 0.1, 0.6], [0.0, 0.2, 0.0], color, tag),
                cuboid([0.6, 0.8, 0.1], [0.0, 0.6, -0.25], color, tag),
            ];
            meshes.extend(
                [[-0.25, -0.25], [0.25, -0.25], [-0.25, 0.25], [0.25, 0.25]]
                    .map(|at| leg(0.05, 0.2, at, tag)),
            );
            meshes
        }
        FurnitureKind::Table => {
            let mut meshes = vec![cuboid([1.2, 0.05, 1.2], [0.0, 0.25, 0.0], color, tag)];
            meshes.extend(
                [[-0.5, -0.5], [0.5, -0.5], [-0.5, 0.5], [0.5, 0.5]]
                    .map(|at| leg(0.05, 0.25, at, tag)),
            );
            meshes
        }
        FurnitureKind::Bed => vec![
            cuboid([2.0, 0.3, 3.0], [0.0, 0.15, 0.0], HexColor::WOOD, tag),
            cuboid([1.9, 0.2, 2.9], [0.0, 0.35, 0.0], HexColor::WHITE, tag),
            cuboid([2.0, 1.0, 0.1], [0.0, 0.7, -1.4], color, tag),
            cuboid([0.6, 0.1, 0.4], [-0.6, 0.5, -1.0], HexColor::WHITE, tag),
            cuboid([0.6, 0.1, 0.4], [0.6, 0.5, -1.0], HexColor::WHITE, tag),
            cuboid([1.9, 0.05, 1.8], [0.0, 0.5, 0.5], color, tag),
        ],
    }
}

/// A placed item: its model, plus a selection ring and drag handles when
/// selected.
///
/// Canvas rotation is clockwise on screen; with the canvas Y axis mapped to
/// world +Z, that is a negative rotation about world +Y.
fn furniture_group(item: &FurnitureItem, selected: bool) -> Group {
    let origin = item_world_position(item);
    let transform = Transform::at(origin.x, origin.y, origin.z)
        .rotated(0.0, -item.rotation.to_radians(), 0.0);

    let mut meshes = model_meshes(item.kind, item.color, MeshTag::Furniture(item.id));

    if selected {
        let blue = HexColor::from_rgb(0, 0, 0xff);
        meshes.push(
            Mesh::new(
                Geometry::Ring {
                    inner_radius: 1.2,
                    outer_radius: 1.3,
                    segments: 32,
                },
                Transform::at(0.0, -0.1, 0.0).rotated(-FRAC_PI_2, 0.0, 0.0),
                blue,
                MeshTag::SelectionRing(item.id),
            )
            .with_opacity(0.5),
        );
        for (at, color) in [
            ([1.5, 0.0, 0.0], HexColor::from_rgb(0xff, 0, 0)),
            ([0.0, 0.0, 1.5], HexColor::from_rgb(0, 0x80, 0)),
        ] {
            meshes.push(Mesh::new(
                Geometry::Sphere {
                    radius: 0.1,
                    segments: 16,
                },
                Transform::at(at[0], at[1], at[2]),
                color,
                MeshTag::Handle(item.id),
            ));
        }
    }

    Group { transform, meshes }
}

// =============================================================================
// Tessellation
// =============================================================================

fn mesh_triangles(mesh: &Mesh, parent: &Matrix4<f32>) -> Vec<Triangle> {
    let world = parent * mesh.transform.matrix();
    local_triangles(&mesh.geometry)
        .into_iter()
        .map(|[a, b, c]| Triangle {
            vertices: [
                world.transform_point(&a),
                world.transform_point(&b),
                world.transform_point(&c),
            ],
            color: mesh.color,
            opacity: mesh.opacity,
            tag: mesh.tag,
        })
        .collect()
}

type Tri = [Point3<f32>; 3];

fn quad(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, d: Point3<f32>) -> [Tri; 2] {
    [[a, b, c], [a, c, d]]
}

fn local_triangles(geometry: &Geometry) -> Vec<Tri> {
    match *geometry {
        Geometry::Box {
            width,
            height,
            depth,
        } => box_triangles(width / 2.0, height / 2.0, depth / 2.0),
        Geometry::Plane { width, height } => {
            let (x, y) = (width / 2.0, height / 2.0);
            quad(
                Point3::new(-x, -y, 0.0),
                Point3::new(x, -y, 0.0),
                Point3::new(x, y, 0.0),
                Point3::new(-x, y, 0.0),
            )
            .to_vec()
        }
        Geometry::Cylinder {
            radius_top,
            radius_bottom,
            height,
            segments,
        } => cylinder_triangles(radius_top, radius_bottom, height, segments.max(3)),
        Geometry::Sphere { radius, segments } => sphere_triangles(radius, segments.max(4)),
        Geometry::Ring {
            inner_radius,
            outer_radius,
            segments,
        } => ring_triangles(inner_radius, outer_radius, segments.max(3)),
    }
}

fn box_triangles(x: f32, y: f32, z: f32) -> Vec<Tri> {
    let p = |sx: f32, sy: f32, sz: f32| Point3::new(sx * x, sy * y, sz * z);
    [
        quad(p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)), // front
        quad(p(1., -1., -1.), p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)), // back
        quad(p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.), p(-1., 1., -1.)), // top
        quad(p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)), // bottom
        quad(p(1., -1., 1.), p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)), // right
        quad(p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)), // left
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn circle_point(radius: f32, angle: f32, y: f32) -> Point3<f32> {
    let (sin, cos) = angle.sin_cos();
    Point3::new(radius * sin, y, radius * cos)
}

fn cylinder_triangles(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Vec<Tri> {
    let (top, bottom) = (height / 2.0, -height / 2.0);
    let step = TAU / segments as f32;
    let mut tris = Vec::with_capacity(segments as usize * 4);

    for i in 0..segments {
        let (a0, a1) = (i as f32 * step, (i + 1) as f32 * step);
        let (t0, t1) = (circle_point(radius_top, a0, top), circle_point(radius_top, a1, top));
        let (b0, b1) = (
            circle_point(radius_bottom, a0, bottom),
            circle_point(radius_bottom, a1, bottom),
        );

        tris.extend(quad(b0, b1, t1, t0));
        tris.push([Point3::new(0.0, top, 0.0), t0, t1]);
        tris.push([Point3::new(0.0, bottom, 0.0), b1, b0]);
    }
    tris
}

fn sphere_triangles(radius: f32, segments: u32) -> Vec<Tri> {
    let rings = (segments / 2).max(2);
    let step_lon = TAU / segments as f32;
    let step_lat = PI / rings as f32;

    let point = |lat: u32, lon: u32| {
        let theta = lat as f32 * step_lat;
        let (sin_t, cos_t) = theta.sin_cos();
        circle_point(radius * sin_t, lon as f32 * step_lon, radius * cos_t)
    };

    let mut tris = Vec::with_capacity((rings * segments * 2) as usize);
    for lat in 0..rings {
        for lon in 0..segments {
            tris.extend(quad(
                point(lat, lon),
                point(lat + 1, lon),
                point(lat + 1, lon + 1),
                point(lat, lon + 1),
            ));
        }
    }
    tris
}

fn ring_triangles(inner: f32, outer: f32, segments: u32) -> Vec<Tri> {
    let step = TAU / segments as f32;
    let flat = |r: f32, a: f32| {
        let (sin, cos) = a.sin_cos();
        Point3::new(r * cos, r * sin, 0.0)
    };

    (0..segments)
        .flat_map(|i| {
            let (a0, a1) = (i as f32 * step, (i + 1) as f32 * step);
            quad(flat(inner, a0), flat(outer, a0), flat(outer, a1), flat(inner, a1))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasType, Design};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_design_scene_has_room_and_items() {
        let mut design = Design::new();
        let sofa = design.add_furniture(FurnitureKind::Sofa);
        design.add_furniture(FurnitureKind::Chair);

        let scene = Scene::for_design(&design, 4.0 / 3.0);
        assert_eq!(scene.groups.len(), 3);
        assert_eq!(scene.groups[0].meshes.len(), 4);
        // The sofa is not selected: just its four boxes.
        assert_eq!(scene.groups[1].meshes.len(), 4);
        assert!(scene.groups[1].meshes.iter().all(|m| m.tag == MeshTag::Furniture(sofa)));
    }

    #[test]
    fn test_selected_item_gets_ring_and_handles() {
        let mut design = Design::new();
        let chair = design.add_furniture(FurnitureKind::Chair);

        let scene = Scene::for_design(&design, 1.0);
        let meshes = &scene.groups[1].meshes;
        assert_eq!(meshes.iter().filter(|m| m.tag == MeshTag::SelectionRing(chair)).count(), 1);
        assert_eq!(meshes.iter().filter(|m| m.tag == MeshTag::Handle(chair)).count(), 2);
    }

    #[test]
    fn test_room_width_follows_canvas_type() {
        let mut design = Design::new();
        design.set_canvas_type(CanvasType::Rectangle);
        let scene = Scene::for_design(&design, 1.0);

        let floor: Vec<Point3<f32>> = scene
            .triangles()
            .filter(|t| t.tag == MeshTag::Floor)
            .flat_map(|t| t.vertices)
            .collect();
        let bounds = Aabb::from_points(&floor).unwrap();
        assert!(close(bounds.max.x - bounds.min.x, 13.33));
        assert!(close(bounds.max.y, 0.0) && close(bounds.min.y, 0.0));
        assert!(close(bounds.max.z - bounds.min.z, 10.0));
    }

    #[test]
    fn test_furniture_bounds_follow_position() {
        let mut design = Design::new();
        let table = design.add_furniture(FurnitureKind::Table);
        design.update_position(table, 300.0, 300.0).unwrap();

        let scene = Scene::for_design(&design, 1.0);
        let bounds = scene.furniture_bounds(table).unwrap();
        // Table top is 1.2 wide, centred on world (0, _, 0).
        assert!(close(bounds.min.x, -0.6) && close(bounds.max.x, 0.6));
        assert!(close(bounds.min.y, 0.25));
        assert!(close(bounds.max.y, 0.25 + 0.275));
    }

    #[test]
    fn test_box_tessellation_normals_point_outward() {
        let tris = box_triangles(1.0, 1.0, 1.0);
        assert_eq!(tris.len(), 12);
        for tri in tris {
            let t = Triangle {
                vertices: tri,
                color: HexColor::WHITE,
                opacity: 1.0,
                tag: MeshTag::Model,
            };
            let centroid = (tri[0].coords + tri[1].coords + tri[2].coords) / 3.0;
            assert!(t.normal().dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_primitive_triangle_counts() {
        assert_eq!(cylinder_triangles(0.05, 0.05, 0.2, 8).len(), 32);
        assert_eq!(ring_triangles(1.2, 1.3, 32).len(), 64);
        assert_eq!(sphere_triangles(0.1, 16).len(), 8 * 16 * 2);
    }

    #[test]
    fn test_rotation_turns_model_about_y() {
        let mut design = Design::new();
        let sofa = design.add_furniture(FurnitureKind::Sofa);
        design.update_position(sofa, 300.0, 300.0).unwrap();
        design.rotate(sofa, 90.0).unwrap();

        let scene = Scene::for_design(&design, 1.0);
        let bounds = scene.furniture_bounds(sofa).unwrap();
        // The 2-wide sofa now spans Z instead of X.
        assert!(close(bounds.max.z - bounds.min.z, 2.0));
        assert!(close(bounds.max.x - bounds.min.x, 1.0));
    }

    #[test]
    fn test_lighting_is_bounded() {
        let light = Lighting::default();
        let up = Vector3::new(0.0, 1.0, 0.0);
        let i = light.intensity(&up);
        assert!(i > light.ambient && i <= 1.0);
        assert!(close(light.intensity(&Vector3::zeros()), light.ambient));
    }

    #[test]
    fn test_scene_serializes_for_browser() {
        let mut design = Design::new();
        design.add_furniture(FurnitureKind::Bed);
        let json = serde_json::to_value(Scene::for_design(&design, 1.0)).unwrap();

        assert_eq!(json["background"], "#000000");
        assert_eq!(json["groups"][0]["meshes"][0]["tag"]["role"], "floor");
        assert_eq!(json["groups"][1]["meshes"][0]["geometry"]["kind"], "box");
    }

    #[test]
    fn test_product_scene() {
        let scene = Scene::for_product(FurnitureKind::Chair, HexColor::GOLD, 1.0);
        assert_eq!(scene.background, PREVIEW_BACKGROUND);
        assert!(scene.triangles().any(|t| t.tag == MeshTag::Model && t.color == HexColor::GOLD));
    }
}
