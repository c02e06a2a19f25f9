//! Furniture items placed on a design canvas.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Category, FurnitureId, HexColor};

/// The kinds of furniture a visitor can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FurnitureKind {
    Sofa,
    Chair,
    Table,
    Bed,
}

impl FurnitureKind {
    /// Every kind, in the order the furniture panel lists them.
    pub const ALL: [Self; 4] = [Self::Sofa, Self::Chair, Self::Table, Self::Bed];

    /// Lowercase identifier, also used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sofa => "sofa",
            Self::Chair => "chair",
            Self::Table => "table",
            Self::Bed => "bed",
        }
    }

    /// Capitalized name for buttons and labels.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sofa => "Sofa",
            Self::Chair => "Chair",
            Self::Table => "Table",
            Self::Bed => "Bed",
        }
    }

    /// Footprint on the 2D canvas, in canvas pixels: `(width, height)`.
    #[must_use]
    pub const fn footprint(&self) -> (f32, f32) {
        match self {
            Self::Sofa => (200.0, 100.0),
            Self::Bed => (250.0, 180.0),
            Self::Chair | Self::Table => (100.0, 100.0),
        }
    }

    /// Height at which the 3D model's group origin sits above the floor.
    #[must_use]
    pub const fn lift(&self) -> f32 {
        match self {
            Self::Sofa | Self::Chair => 0.4,
            Self::Table | Self::Bed => 0.25,
        }
    }

    /// Pick the model that best represents a catalog product.
    ///
    /// The product name wins when it names a furniture type; otherwise the
    /// category decides, falling back to a sofa.
    #[must_use]
    pub fn for_product(category: Category, name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("sofa") || name.contains("couch") {
            Self::Sofa
        } else if name.contains("chair") {
            Self::Chair
        } else if name.contains("table") || name.contains("desk") {
            Self::Table
        } else if name.contains("bed") {
            Self::Bed
        } else {
            match category {
                Category::Office => Self::Chair,
                Category::Dining => Self::Table,
                Category::Bedroom => Self::Bed,
                Category::LivingRoom | Category::Outdoor | Category::Decor => Self::Sofa,
            }
        }
    }
}

impl fmt::Display for FurnitureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FurnitureKind {
    type Err = UnknownFurnitureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFurnitureKind(s.to_string()))
    }
}

/// Error returned when parsing an unsupported furniture type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown furniture type: {0}")]
pub struct UnknownFurnitureKind(pub String);

/// Position on the canvas. `x`/`y` are canvas pixels of the item's top-left
/// corner; `z` is reserved for stacking and stays 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// A point in canvas pixel space (pointer positions, drag offsets).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A placeable, colorable, rotatable piece of furniture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureItem {
    pub id: FurnitureId,
    #[serde(rename = "type")]
    pub kind: FurnitureKind,
    pub position: Position,
    /// Clockwise rotation in degrees, in `[0, 360)`.
    pub rotation: f32,
    pub color: HexColor,
    pub width: f32,
    pub height: f32,
}

impl FurnitureItem {
    /// Starting position of newly added furniture.
    pub const SPAWN: Position = Position::new(100.0, 100.0);

    /// Create an item of the given kind with default size, color and position.
    #[must_use]
    pub fn new(kind: FurnitureKind) -> Self {
        let (width, height) = kind.footprint();
        Self {
            id: FurnitureId::generate(),
            kind,
            position: Self::SPAWN,
            rotation: 0.0,
            color: HexColor::FURNITURE_DEFAULT,
            width,
            height,
        }
    }

    /// Centre of the item's footprint.
    #[must_use]
    pub fn center(&self) -> CanvasPoint {
        CanvasPoint::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// Whether a canvas point falls inside the item's rotated footprint.
    #[must_use]
    pub fn contains(&self, point: CanvasPoint) -> bool {
        // Undo the item's rotation around its centre, then test the box.
        let c = self.center();
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let dx = point.x - c.x;
        let dy = point.y - c.y;
        let local_x = dx.mul_add(cos, -(dy * sin));
        let local_y = dx.mul_add(sin, dy * cos);

        local_x.abs() <= self.width / 2.0 && local_y.abs() <= self.height / 2.0
    }

    /// Corners of the rotated footprint, clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [CanvasPoint; 4] {
        let c = self.center();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);

        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(dx, dy)| {
            CanvasPoint::new(
                c.x + dx.mul_add(cos, -(dy * sin)),
                c.y + dx.mul_add(sin, dy * cos),
            )
        })
    }
}

/// Normalize an angle in degrees to `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}
