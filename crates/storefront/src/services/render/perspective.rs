//! Software rasterizer for 3D scenes.
//!
//! Triangles are transformed into view space, clipped against the near
//! plane, projected, and filled with a depth test. Each face gets flat
//! Lambert shading from the scene's lighting. Translucent meshes are drawn
//! after opaque ones, blended over them without writing depth.

use elegant_haven_core::canvas::projection::Camera;
use elegant_haven_core::canvas::scene::{Scene, Triangle};
use image::{Rgba, RgbaImage};
use nalgebra::Point3;

use super::RenderError;

/// A projected vertex: pixel coordinates plus NDC depth.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
}

/// Color and depth targets for one frame.
struct Target {
    frame: RgbaImage,
    depth: Vec<f32>,
}

impl Target {
    fn new(width: u32, height: u32, clear: Rgba<u8>) -> Self {
        Self {
            frame: RgbaImage::from_pixel(width, height, clear),
            depth: vec![f32::INFINITY; width as usize * height as usize],
        }
    }
}

/// Render a scene from its camera into a `width` x `height` frame.
///
/// # Errors
///
/// Returns [`RenderError::Dimensions`] for an empty frame.
pub fn render_scene(scene: &Scene, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::Dimensions);
    }

    let mut target = Target::new(width, height, Rgba(scene.background.rgba(255)));
    let (opaque, translucent): (Vec<Triangle>, Vec<Triangle>) =
        scene.triangles().partition(|tri| tri.opacity >= 1.0);

    for tri in opaque.iter().chain(&translucent) {
        let intensity = scene.lighting.intensity(&tri.normal());
        let color = tri.color.shade(intensity).rgba(255);

        for screen in project_triangle(&scene.camera, tri, width, height) {
            fill(&mut target, &screen, color, tri.opacity);
        }
    }

    Ok(target.frame)
}

/// Project a world triangle to screen space, splitting it if the near plane
/// cuts through it.
fn project_triangle(
    camera: &Camera,
    tri: &Triangle,
    width: u32,
    height: u32,
) -> Vec<[ScreenVertex; 3]> {
    let view = camera.view();
    let projection = camera.projection();
    let in_view = tri.vertices.map(|v| view.transform_point(&v));

    let polygon = clip_near(&in_view, camera.near);
    let Some((first, rest)) = polygon.split_first() else {
        return Vec::new();
    };

    let to_screen = |p: &Point3<f32>| {
        let ndc = projection.project_point(p);
        ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * width as f32,
            y: (1.0 - ndc.y) * 0.5 * height as f32,
            depth: ndc.z,
        }
    };

    let anchor = to_screen(first);
    rest.windows(2)
        .filter_map(|pair| match pair {
            [b, c] => Some([anchor, to_screen(b), to_screen(c)]),
            _ => None,
        })
        .collect()
}

/// Clip a view-space triangle to the region in front of the near plane
/// (`-z >= near`). Returns a convex polygon of 0, 3 or 4 vertices.
fn clip_near(triangle: &[Point3<f32>; 3], near: f32) -> Vec<Point3<f32>> {
    let inside = |p: &Point3<f32>| -p.z >= near;
    let mut out = Vec::with_capacity(4);

    for (current, next) in triangle.iter().zip(triangle.iter().cycle().skip(1)) {
        if inside(current) {
            out.push(*current);
        }
        if inside(current) != inside(next) {
            let t = (-near - current.z) / (next.z - current.z);
            out.push(current + (next - current) * t);
        }
    }
    out
}

/// Signed doubled area of `(a, b, p)`.
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x).mul_add(py - a.y, -((b.y - a.y) * (px - a.x)))
}

/// Fill a screen-space triangle with depth testing.
fn fill(target: &mut Target, [a, b, c]: &[ScreenVertex; 3], color: [u8; 4], opacity: f32) {
    let area = edge(a, b, c.x, c.y);
    if area.abs() < f32::EPSILON {
        return;
    }

    let (width, height) = target.frame.dimensions();
    let x0 = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
    let y0 = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
    let x1 = (a.x.max(b.x).max(c.x).ceil().max(0.0) as u32).min(width);
    let y1 = (a.y.max(b.y).max(c.y).ceil().max(0.0) as u32).min(height);

    let translucent = opacity < 1.0;

    for py in y0..y1 {
        for px in x0..x1 {
            let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(b, c, sx, sy) / area;
            let w1 = edge(c, a, sx, sy) / area;
            let w2 = edge(a, b, sx, sy) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0.mul_add(a.depth, w1.mul_add(b.depth, w2 * c.depth));
            let index = (py * width + px) as usize;
            let Some(stored) = target.depth.get_mut(index) else {
                continue;
            };
            if depth >= *stored {
                continue;
            }

            let pixel = target.frame.get_pixel_mut(px, py);
            if translucent {
                pixel.0 = blend(pixel.0, color, opacity);
            } else {
                *stored = depth;
                pixel.0 = color;
            }
        }
    }
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: [u8; 4], src: [u8; 4], alpha: f32) -> [u8; 4] {
    let mix = |d: u8, s: u8| {
        f32::from(s)
            .mul_add(alpha, f32::from(d) * (1.0 - alpha))
            .round() as u8
    };
    [mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), 255]
}
