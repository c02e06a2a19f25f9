//! Top-down 2D plan of a design.
//!
//! One output pixel per canvas pixel. The canvas color is painted first, then
//! the background image scaled to cover, then every item as a rotated filled
//! rectangle. The selected item is drawn last with a gold outline.

use elegant_haven_core::canvas::{CanvasPoint, FurnitureItem};
use elegant_haven_core::{Design, HexColor};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::{RenderError, decode_data_url};

/// Selection outline thickness, in pixels.
const OUTLINE_WIDTH: f32 = 2.0;

/// Render the plan view of a design.
///
/// # Errors
///
/// Returns an error if the stored background image cannot be decoded.
pub fn render_plan(design: &Design) -> Result<RgbaImage, RenderError> {
    let size = design.size();
    let (width, height) = (size.width as u32, size.height as u32);
    let mut frame = RgbaImage::from_pixel(width, height, Rgba(design.canvas_color().rgba(255)));

    if let Some(url) = design.background() {
        let background = decode_data_url(url)?;
        let cover = cover(&background, width, height)?;
        imageops::overlay(&mut frame, &cover, 0, 0);
    }

    let selected = design.selected();
    for item in design.items().iter().filter(|item| Some(item.id) != selected) {
        fill_item(&mut frame, item, 0.0, item.color);
    }
    if let Some(item) = design.selected_item() {
        fill_item(&mut frame, item, OUTLINE_WIDTH, HexColor::GOLD);
        fill_item(&mut frame, item, 0.0, item.color);
    }

    Ok(frame)
}

/// Scale an image to cover `width` x `height`, centered, cropping overflow.
fn cover(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(RenderError::Dimensions);
    }

    let scale = (width as f32 / src_w as f32).max(height as f32 / src_h as f32);
    let scaled_w = ((src_w as f32 * scale).ceil() as u32).max(width);
    let scaled_h = ((src_h as f32 * scale).ceil() as u32).max(height);

    let scaled = imageops::resize(image, scaled_w, scaled_h, FilterType::Triangle);
    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    Ok(imageops::crop_imm(&scaled, x, y, width, height).to_image())
}

/// Fill an item's rotated footprint, grown by `grow` pixels on every side.
fn fill_item(frame: &mut RgbaImage, item: &FurnitureItem, grow: f32, color: HexColor) {
    let center = item.center();
    let half_w = item.width / 2.0 + grow;
    let half_h = item.height / 2.0 + grow;
    let (sin, cos) = item.rotation.to_radians().sin_cos();

    // Bounding box of the rotated rectangle
    let extent_x = half_w * cos.abs() + half_h * sin.abs();
    let extent_y = half_w * sin.abs() + half_h * cos.abs();
    let (frame_w, frame_h) = frame.dimensions();
    let x_range = pixel_span(center.x - extent_x, center.x + extent_x, frame_w);
    let y_range = pixel_span(center.y - extent_y, center.y + extent_y, frame_h);

    let pixel = Rgba(color.rgba(255));
    for py in y_range {
        for px in x_range.clone() {
            let p = CanvasPoint::new(px as f32 + 0.5, py as f32 + 0.5);
            let (dx, dy) = (p.x - center.x, p.y - center.y);
            // Rotate back into the item's local frame
            let local_x = dx.mul_add(cos, dy * sin);
            let local_y = dy.mul_add(cos, -(dx * sin));
            if local_x.abs() <= half_w && local_y.abs() <= half_h {
                frame.put_pixel(px, py, pixel);
            }
        }
    }
}

/// Pixel indices whose centres may fall inside `[min, max]`, clipped to the frame.
fn pixel_span(min: f32, max: f32, limit: u32) -> std::ops::Range<u32> {
    let start = min.floor().max(0.0) as u32;
    let end = (max.ceil().max(0.0) as u32).min(limit);
    start.min(end)..end
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_haven_core::{CanvasType, FurnitureKind};

    use super::*;
    use crate::services::render::{image_data_url, tests::tiny_png};

    fn px(frame: &RgbaImage, x: u32, y: u32) -> [u8; 3] {
        let Rgba([r, g, b, _]) = *frame.get_pixel(x, y);
        [r, g, b]
    }

    #[test]
    fn test_empty_design_is_canvas_color() {
        let mut design = Design::new();
        design.set_canvas_type(CanvasType::Rectangle);

        let frame = render_plan(&design).unwrap();
        assert_eq!(frame.dimensions(), (800, 600));
        assert!(frame.pixels().all(|p| p.0 == HexColor::CANVAS_DEFAULT.rgba(255)));
    }

    #[test]
    fn test_items_are_filled_in_their_color() {
        let mut design = Design::new();
        let table = design.add_furniture(FurnitureKind::Table);
        design.update_color(table, HexColor::WOOD).unwrap();
        design.select(None).unwrap();

        let frame = render_plan(&design).unwrap();
        // Table spans 100..200 on both axes
        assert_eq!(px(&frame, 150, 150), HexColor::WOOD.rgb());
        assert_eq!(px(&frame, 100, 100), HexColor::WOOD.rgb());
        assert_eq!(px(&frame, 200, 150), HexColor::CANVAS_DEFAULT.rgb());
        assert_eq!(px(&frame, 99, 150), HexColor::CANVAS_DEFAULT.rgb());
    }

    #[test]
    fn test_selected_item_outlined_in_gold() {
        let mut design = Design::new();
        design.add_furniture(FurnitureKind::Chair);

        let frame = render_plan(&design).unwrap();
        assert_eq!(px(&frame, 98, 150), HexColor::GOLD.rgb());
        assert_eq!(px(&frame, 150, 201), HexColor::GOLD.rgb());
        assert_eq!(px(&frame, 150, 150), HexColor::FURNITURE_DEFAULT.rgb());
        assert_eq!(px(&frame, 95, 150), HexColor::CANVAS_DEFAULT.rgb());
    }

    #[test]
    fn test_selected_item_drawn_on_top() {
        let mut design = Design::new();
        let first = design.add_furniture(FurnitureKind::Chair);
        let second = design.add_furniture(FurnitureKind::Chair);
        design.update_color(first, HexColor::WOOD).unwrap();
        design.update_color(second, HexColor::WHITE).unwrap();
        design.select(Some(first)).unwrap();

        let frame = render_plan(&design).unwrap();
        assert_eq!(px(&frame, 150, 150), HexColor::WOOD.rgb());
    }

    #[test]
    fn test_rotation_turns_footprint() {
        let mut design = Design::new();
        let sofa = design.add_furniture(FurnitureKind::Sofa);
        design.update_position(sofa, 200.0, 200.0).unwrap();
        design.select(None).unwrap();

        // 200x100 sofa centred at (300, 250)
        let flat = render_plan(&design).unwrap();
        assert_eq!(px(&flat, 390, 250), HexColor::FURNITURE_DEFAULT.rgb());
        assert_eq!(px(&flat, 300, 330), HexColor::CANVAS_DEFAULT.rgb());

        design.rotate(sofa, 90.0).unwrap();
        let turned = render_plan(&design).unwrap();
        assert_eq!(px(&turned, 390, 250), HexColor::CANVAS_DEFAULT.rgb());
        assert_eq!(px(&turned, 300, 330), HexColor::FURNITURE_DEFAULT.rgb());
    }

    #[test]
    fn test_background_covers_canvas() {
        let mut design = Design::new();
        let url = image_data_url(&tiny_png([200, 10, 10, 255])).unwrap();
        design.set_background(Some(url));

        let frame = render_plan(&design).unwrap();
        assert_eq!(px(&frame, 0, 0), [200, 10, 10]);
        assert_eq!(px(&frame, 599, 599), [200, 10, 10]);
    }

    #[test]
    fn test_corrupt_background_is_an_error() {
        let mut design = Design::new();
        design.set_background(Some("data:image/png;base64,AAAA".to_string()));
        assert!(render_plan(&design).is_err());
    }

    #[test]
    fn test_pixel_span_clips() {
        assert_eq!(pixel_span(-20.0, 10.2, 600), 0..11);
        assert_eq!(pixel_span(590.5, 700.0, 600), 590..600);
        assert_eq!(pixel_span(700.0, 800.0, 600), 600..600);
    }
}
