//! Pointer interaction in the 3D view.
//!
//! Clicks are turned into camera rays. A ray selects the nearest piece of
//! furniture whose bounds it hits; dragging moves the selected item to
//! wherever the ray meets the floor, expressed back in canvas pixels.

use super::projection::{Camera, Ndc, Room, world_to_canvas};
use super::scene::Scene;
use super::{CanvasError, Design, Position};
use crate::types::FurnitureId;

impl Design {
    /// Select the furniture under a pointer in the 3D view.
    ///
    /// The nearest hit wins. Clicking empty space clears the selection.
    pub fn pick(&mut self, camera: &Camera, pointer: Ndc) -> Option<FurnitureId> {
        let ray = camera.ray(pointer);
        let scene = Scene::for_design(self, camera.aspect);

        let hit = self
            .items()
            .iter()
            .filter_map(|item| {
                let bounds = scene.furniture_bounds(item.id)?;
                let distance = ray.intersect_aabb(&bounds.min, &bounds.max)?;
                Some((item.id, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        self.selected = hit;
        hit
    }

    /// Move an item to the floor point under a pointer in the 3D view.
    ///
    /// The floor point becomes the item's canvas position, clamped like any
    /// other move. Returns `Ok(None)` when the pointer is not over the floor.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownFurniture`] if the ID is not on the canvas.
    pub fn drag_on_floor(
        &mut self,
        id: FurnitureId,
        camera: &Camera,
        pointer: Ndc,
    ) -> Result<Option<Position>, CanvasError> {
        self.require(id)?;

        let room = Room::for_canvas(self.canvas_type());
        let Some(hit) = camera.ray(pointer).intersect_floor(&room) else {
            return Ok(None);
        };

        let point = world_to_canvas(hit.x, hit.z);
        self.update_position(id, point.x, point.y).map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::canvas::FurnitureKind;
    use crate::canvas::projection::item_world_position;

    fn ndc_of(camera: &Camera, point: &Point3<f32>) -> Ndc {
        let p = camera.project(point).unwrap();
        Ndc::new(p.x, p.y)
    }

    #[test]
    fn test_pick_selects_item_under_pointer() {
        let camera = Camera::design(4.0 / 3.0);
        let mut design = Design::new();
        let sofa = design.add_furniture(FurnitureKind::Sofa);
        design.update_position(sofa, 200.0, 250.0).unwrap();
        design.select(None).unwrap();

        let target = item_world_position(design.item(sofa).unwrap());
        assert_eq!(design.pick(&camera, ndc_of(&camera, &target)), Some(sofa));
        assert_eq!(design.selected(), Some(sofa));
    }

    #[test]
    fn test_pick_on_empty_space_clears_selection() {
        let camera = Camera::design(4.0 / 3.0);
        let mut design = Design::new();
        design.add_furniture(FurnitureKind::Chair);

        assert_eq!(design.pick(&camera, Ndc::new(0.95, 0.95)), None);
        assert_eq!(design.selected(), None);
    }

    #[test]
    fn test_pick_prefers_nearest_item() {
        let camera = Camera::design(1.0);
        let mut design = Design::new();
        let sofa = design.add_furniture(FurnitureKind::Sofa);
        design.update_position(sofa, 300.0, 250.0).unwrap();
        let chair = design.add_furniture(FurnitureKind::Chair);
        design.update_position(chair, 300.0, 350.0).unwrap();

        // A point inside the sofa; the ray passes through the chair first.
        let pointer = ndc_of(&camera, &Point3::new(0.0, 0.5, -0.5));
        assert_eq!(design.pick(&camera, pointer), Some(chair));

        design.remove(chair).unwrap();
        assert_eq!(design.pick(&camera, pointer), Some(sofa));
    }

    #[test]
    fn test_drag_on_floor_moves_item() {
        let camera = Camera::design(4.0 / 3.0);
        let mut design = Design::new();
        let chair = design.add_furniture(FurnitureKind::Chair);

        let pos = design
            .drag_on_floor(chair, &camera, ndc_of(&camera, &Point3::origin()))
            .unwrap()
            .unwrap();
        assert!((pos.x - 300.0).abs() < 0.5, "{pos:?}");
        assert!((pos.y - 300.0).abs() < 0.5, "{pos:?}");
    }

    #[test]
    fn test_drag_on_floor_clamps_to_canvas() {
        let camera = Camera::design(4.0 / 3.0);
        let mut design = Design::new();
        let bed = design.add_furniture(FurnitureKind::Bed);

        // World (4.5, 0, 4.5) is canvas (750, 750), past the square canvas.
        let pointer = ndc_of(&camera, &Point3::new(4.5, 0.0, 4.5));
        let pos = design.drag_on_floor(bed, &camera, pointer).unwrap().unwrap();
        assert_eq!(pos, Position::new(350.0, 420.0));
    }

    #[test]
    fn test_drag_off_floor_is_ignored() {
        let camera = Camera::design(4.0 / 3.0);
        let mut design = Design::new();
        let sofa = design.add_furniture(FurnitureKind::Sofa);

        assert_eq!(design.drag_on_floor(sofa, &camera, Ndc::new(0.0, 1.0)).unwrap(), None);
        assert_eq!(design.item(sofa).unwrap().position, Position::new(100.0, 100.0));

        let ghost = FurnitureId::generate();
        assert!(design.drag_on_floor(ghost, &camera, Ndc::new(0.0, 0.0)).is_err());
    }
}
