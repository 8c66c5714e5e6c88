//! # Portal Pair
//!
//! Derived state for the teleport collaborator: where each portal color
//! currently sits. Placing a portal moves that color's point; digging the
//! cell that holds it clears the point.

use crate::cell::{Cell, GridGeometry};
use crate::tile::TileType;

/// A placed portal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalPoint {
    /// The cell holding the portal tile.
    pub cell: Cell,
    /// World-space center of that cell; the teleport target.
    pub center: (f32, f32),
}

impl PortalPoint {
    /// Builds a point at a cell's center.
    #[must_use]
    pub fn at(cell: Cell, geometry: &GridGeometry) -> Self {
        Self {
            cell,
            center: geometry.cell_center(cell),
        }
    }
}

/// Both portal positions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortalPair {
    /// The blue portal, if placed.
    pub blue: Option<PortalPoint>,
    /// The orange portal, if placed.
    pub orange: Option<PortalPoint>,
}

impl PortalPair {
    /// Returns true once both colors are placed.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.blue.is_some() && self.orange.is_some()
    }

    /// The point for a portal tile type; `None` for any other type.
    #[must_use]
    pub const fn get(&self, tile: TileType) -> Option<PortalPoint> {
        match tile {
            TileType::PortalBlue => self.blue,
            TileType::PortalOrange => self.orange,
            _ => None,
        }
    }

    /// Moves the point for `tile`'s color. Non-portal types are ignored.
    pub fn place(&mut self, tile: TileType, point: PortalPoint) {
        match tile {
            TileType::PortalBlue => self.blue = Some(point),
            TileType::PortalOrange => self.orange = Some(point),
            _ => {}
        }
    }

    /// Clears whichever point sits at `cell`.
    pub fn clear_at(&mut self, cell: Cell) {
        if self.blue.is_some_and(|p| p.cell == cell) {
            self.blue = None;
        }
        if self.orange.is_some_and(|p| p.cell == cell) {
            self.orange = None;
        }
    }
}
