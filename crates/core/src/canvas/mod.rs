//! Room-design canvas.
//!
//! A [`Design`] is the state behind the 2D/3D furniture canvas: the canvas
//! settings, the placed furniture, the current selection and an in-progress
//! pointer drag. Every mutation keeps each item inside the canvas:
//!
//! ```text
//! 0 <= x <= canvas_width  - item_width
//! 0 <= y <= canvas_height - item_height
//! ```
//!
//! # Modules
//!
//! - [`furniture`] - Furniture kinds, items and canvas-space geometry
//! - [`projection`] - Mapping between the 2D canvas and the 3D room, camera rays
//! - [`scene`] - Declarative 3D scene graph built from primitive meshes
//! - [`picking`] - Ray-cast selection and floor dragging for the 3D view

pub mod furniture;
pub mod picking;
pub mod projection;
pub mod scene;

use serde::{Deserialize, Serialize};

use crate::types::{FurnitureId, HexColor};

pub use furniture::{
    CanvasPoint, FurnitureItem, FurnitureKind, Position, UnknownFurnitureKind, normalize_degrees,
};

/// Errors from canvas operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// No furniture item with this ID exists on the canvas.
    #[error("furniture not found: {0}")]
    UnknownFurniture(FurnitureId),
}

/// Canvas shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasType {
    #[default]
    Square,
    Rectangle,
}

impl CanvasType {
    /// Canvas size in pixels.
    #[must_use]
    pub const fn size(&self) -> CanvasSize {
        match self {
            Self::Square => CanvasSize {
                width: 600.0,
                height: 600.0,
            },
            Self::Rectangle => CanvasSize {
                width: 800.0,
                height: 600.0,
            },
        }
    }
}

/// Width and height of the drawing surface, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    /// Clamp a top-left position so an item of the given size stays on the
    /// canvas. An item larger than the canvas is pinned to the origin.
    #[must_use]
    pub fn clamp(&self, x: f32, y: f32, item_width: f32, item_height: f32) -> Position {
        Position::new(
            clamp_axis(x, self.width, item_width),
            clamp_axis(y, self.height, item_height),
        )
    }
}

fn clamp_axis(value: f32, extent: f32, item_extent: f32) -> f32 {
    value.min(extent - item_extent).max(0.0)
}

/// An in-progress pointer drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub id: FurnitureId,
    /// Pointer position relative to the item's top-left corner at drag start.
    pub offset: CanvasPoint,
}

/// The furniture layout a visitor is working on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    canvas_type: CanvasType,
    canvas_color: HexColor,
    /// Background image as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background: Option<String>,
    items: Vec<FurnitureItem>,
    #[serde(default)]
    selected: Option<FurnitureId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    drag: Option<DragState>,
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl Design {
    /// An empty square canvas in the default cream color.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            canvas_type: CanvasType::Square,
            canvas_color: HexColor::CANVAS_DEFAULT,
            background: None,
            items: Vec::new(),
            selected: None,
            drag: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub const fn canvas_type(&self) -> CanvasType {
        self.canvas_type
    }

    #[must_use]
    pub const fn size(&self) -> CanvasSize {
        self.canvas_type.size()
    }

    #[must_use]
    pub const fn canvas_color(&self) -> HexColor {
        self.canvas_color
    }

    #[must_use]
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Items in insertion (paint) order.
    #[must_use]
    pub fn items(&self) -> &[FurnitureItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: FurnitureId) -> Option<&FurnitureItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub const fn selected(&self) -> Option<FurnitureId> {
        self.selected
    }

    #[must_use]
    pub fn selected_item(&self) -> Option<&FurnitureItem> {
        self.selected.and_then(|id| self.item(id))
    }

    #[must_use]
    pub const fn drag(&self) -> Option<DragState> {
        self.drag
    }

    // -------------------------------------------------------------------------
    // Canvas settings
    // -------------------------------------------------------------------------

    /// Change the canvas shape. Items that would fall off a smaller canvas are
    /// pulled back inside.
    pub fn set_canvas_type(&mut self, canvas_type: CanvasType) {
        self.canvas_type = canvas_type;
        let size = self.size();
        for item in &mut self.items {
            item.position = size.clamp(item.position.x, item.position.y, item.width, item.height);
        }
    }

    pub const fn set_canvas_color(&mut self, color: HexColor) {
        self.canvas_color = color;
    }

    pub fn set_background(&mut self, data_url: Option<String>) {
        self.background = data_url;
    }

    // -------------------------------------------------------------------------
    // Furniture
    // -------------------------------------------------------------------------

    /// Place a new item of `kind` and select it.
    pub fn add_furniture(&mut self, kind: FurnitureKind) -> FurnitureId {
        let mut item = FurnitureItem::new(kind);
        item.position = self
            .size()
            .clamp(item.position.x, item.position.y, item.width, item.height);

        let id = item.id;
        self.items.push(item);
        self.selected = Some(id);
        id
    }

    /// Select an item, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownFurniture`] if the ID is not on the canvas.
    pub fn select(&mut self, id: Option<FurnitureId>) -> Result<(), CanvasError> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// Move an item, clamping it to the canvas. Returns the applied position.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownFurniture`] if the ID is not on the canvas.
    pub fn update_position(
        &mut self,
        id: FurnitureId,
        x: f32,
        y: f32,
    ) -> Result<Position, CanvasError> {
        let size = self.size();
        let item = self.require_mut(id)?;
        item.position = size.clamp(x, y, item.width, item.height);
        Ok(item.position)
    }

    /// Recolor an item.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownFurniture`] if the ID is not on the canvas.
    pub fn update_color(&mut self, id: FurnitureId, color: HexColor) -> Result<(), CanvasError> {
        self.require_mut(id)?.color = color;
        Ok(())
    }

    /// Set an item's rotation in degrees. Returns the normalized angle.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownFurniture`] if the ID is not on the canvas.
    pub fn rotate(&mut self, id: FurnitureId, degrees: f32) -> Result<f32, CanvasError> {
        let item = self.require_mut(id)?;
        item.rotation = normalize_degrees(degrees);
        Ok(item.rotation)
    }

    /// Remove an item. Removing the selected item clears the selection and
    /// removing the dragged item ends the drag.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownFurniture`] if the ID is not on the canvas.
    pub fn remove(&mut self, id: FurnitureId) -> Result<FurnitureItem, CanvasError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CanvasError::UnknownFurniture(id))?;
        let removed = self.items.remove(index);

        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.drag.is_some_and(|drag| drag.id == id) {
            self.drag = None;
        }
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Pointer interaction (2D)
    // -------------------------------------------------------------------------

    /// The topmost item under a canvas point.
    ///
    /// The selected item is drawn above the rest; otherwise later items are
    /// drawn over earlier ones.
    #[must_use]
    pub fn item_at(&self, point: CanvasPoint) -> Option<&FurnitureItem> {
        if let Some(selected) = self.selected_item()
            && selected.contains(point)
        {
            return Some(selected);
        }
        self.items.iter().rev().find(|item| item.contains(point))
    }

    /// Pointer pressed on the canvas.
    ///
    /// Selects the item under the pointer and starts dragging it. Pressing on
    /// empty canvas clears the selection.
    pub fn begin_drag(&mut self, pointer: CanvasPoint) -> Option<FurnitureId> {
        let Some(item) = self.item_at(pointer) else {
            self.selected = None;
            self.drag = None;
            return None;
        };

        let id = item.id;
        let offset = CanvasPoint::new(pointer.x - item.position.x, pointer.y - item.position.y);
        self.selected = Some(id);
        self.drag = Some(DragState { id, offset });
        Some(id)
    }

    /// Pointer moved. Moves the dragged item so it keeps its grab offset,
    /// clamped to the canvas. Does nothing when no drag is active.
    pub fn drag_to(&mut self, pointer: CanvasPoint) -> Option<Position> {
        let drag = self.drag?;
        self.update_position(drag.id, pointer.x - drag.offset.x, pointer.y - drag.offset.y)
            .ok()
    }

    /// Pointer released or left the canvas.
    pub const fn end_drag(&mut self) {
        self.drag = None;
    }

    fn require(&self, id: FurnitureId) -> Result<&FurnitureItem, CanvasError> {
        self.item(id).ok_or(CanvasError::UnknownFurniture(id))
    }

    fn require_mut(&mut self, id: FurnitureId) -> Result<&mut FurnitureItem, CanvasError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CanvasError::UnknownFurniture(id))
    }
}
