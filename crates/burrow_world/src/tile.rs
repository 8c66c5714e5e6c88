//! # Tile Catalog
//!
//! The closed set of tile types and their three capability flags.
//!
//! Capabilities are resolved by an exhaustive `match`, so adding a variant
//! without deciding its flags is a compile error, not a runtime surprise.
//!
//! | Tile                | collides | destructible | placeable |
//! |---------------------|----------|--------------|-----------|
//! | Blank               |          |              | x         |
//! | Grass               | x        | x            |           |
//! | Dirt                | x        | x            |           |
//! | SandyDirt           | x        | x            |           |
//! | LightStone          | x        |              |           |
//! | StoneWithMushroom   | x        | x            |           |
//! | Stone               |          |              | x         |
//! | PortalBlue          |          | x            |           |
//! | PortalOrange        |          | x            |           |
//! | SolidBoundary       | x        |              |           |
//!
//! `placeable` describes a *cell*: it holds a void that may be refilled.
//! What may be poured into it is any destructible material (see
//! [`TileType::is_fill_material`]).

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

/// Tile types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TileType {
    /// Open air above the surface.
    Blank = 1,
    /// The surface row.
    Grass = 2,
    /// Ordinary dirt.
    Dirt = 3,
    /// Rarer dirt variant.
    SandyDirt = 4,
    /// Harder material that cannot be dug.
    LightStone = 5,
    /// Bonus material with a bouncy mushroom on top.
    StoneWithMushroom = 6,
    /// Dug-out void below the surface.
    Stone = 7,
    /// Blue end of the portal pair.
    PortalBlue = 8,
    /// Orange end of the portal pair.
    PortalOrange = 9,
    /// Indestructible boundary material.
    SolidBoundary = 10,
}

/// The capability flags of one tile type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// A body resting against this cell is blocked.
    pub collides: bool,
    /// The dig engine may remove this cell.
    pub destructible: bool,
    /// The cell holds a void that may be refilled.
    pub placeable: bool,
}

impl Capabilities {
    const fn new(collides: bool, destructible: bool, placeable: bool) -> Self {
        Self {
            collides,
            destructible,
            placeable,
        }
    }
}

impl TileType {
    /// Every tile type, in wire-id order.
    pub const ALL: [Self; 10] = [
        Self::Blank,
        Self::Grass,
        Self::Dirt,
        Self::SandyDirt,
        Self::LightStone,
        Self::StoneWithMushroom,
        Self::Stone,
        Self::PortalBlue,
        Self::PortalOrange,
        Self::SolidBoundary,
    ];

    /// Returns the capability flags for this tile type.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Blank | Self::Stone => Capabilities::new(false, false, true),
            Self::Grass | Self::Dirt | Self::SandyDirt | Self::StoneWithMushroom => {
                Capabilities::new(true, true, false)
            }
            Self::LightStone | Self::SolidBoundary => Capabilities::new(true, false, false),
            Self::PortalBlue | Self::PortalOrange => Capabilities::new(false, true, false),
        }
    }

    /// Returns true if a physics body is blocked by this tile.
    #[inline]
    #[must_use]
    pub const fn collides(self) -> bool {
        self.capabilities().collides
    }

    /// Returns true if this tile may be dug out.
    #[inline]
    #[must_use]
    pub const fn destructible(self) -> bool {
        self.capabilities().destructible
    }

    /// Returns true if a cell holding this tile may be refilled.
    #[inline]
    #[must_use]
    pub const fn placeable(self) -> bool {
        self.capabilities().placeable
    }

    /// Returns true if this type may be poured into a placeable cell.
    ///
    /// Only material that can be dug can be carried, so voids (`Blank`,
    /// `Stone`) and undiggable rock are rejected.
    #[inline]
    #[must_use]
    pub const fn is_fill_material(self) -> bool {
        self.destructible()
    }

    /// Returns true for either portal color.
    #[inline]
    #[must_use]
    pub const fn is_portal(self) -> bool {
        matches!(self, Self::PortalBlue | Self::PortalOrange)
    }

    /// Returns the stable wire id (1..=10) used by the change-log format.
    #[inline]
    #[must_use]
    pub const fn wire_id(self) -> u8 {
        self as u8
    }

    /// Converts a wire id back to a tile type.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::UnknownChangeTag` for ids outside the catalog.
    pub fn from_wire_id(id: u8) -> WorldResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tile| tile.wire_id() == id)
            .ok_or(WorldError::UnknownChangeTag(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voids_are_placeable_and_never_destructible() {
        for tile in TileType::ALL {
            if tile.placeable() {
                assert!(!tile.destructible(), "{tile:?} is both void and material");
                assert!(!tile.collides(), "{tile:?} void should not collide");
            }
        }
        assert!(TileType::Blank.placeable());
        assert!(TileType::Stone.placeable());
    }

    #[test]
    fn test_catalog_matches_original_tuning() {
        assert!(TileType::Grass.destructible());
        assert!(TileType::StoneWithMushroom.collides());
        assert!(!TileType::LightStone.destructible());
        assert!(!TileType::SolidBoundary.destructible());
        assert!(TileType::PortalBlue.destructible());
        assert!(!TileType::PortalOrange.collides());
    }

    #[test]
    fn test_fill_material() {
        assert!(TileType::Dirt.is_fill_material());
        assert!(TileType::PortalOrange.is_fill_material());
        assert!(!TileType::Stone.is_fill_material());
        assert!(!TileType::Blank.is_fill_material());
        assert!(!TileType::LightStone.is_fill_material());
    }

    #[test]
    fn test_wire_ids_are_unique_and_nonzero() {
        for tile in TileType::ALL {
            assert_ne!(tile.wire_id(), 0, "0 is reserved for Remove");
            assert_eq!(TileType::from_wire_id(tile.wire_id()), Ok(tile));
        }
        assert_eq!(TileType::from_wire_id(0), Err(WorldError::UnknownChangeTag(0)));
        assert_eq!(TileType::from_wire_id(11), Err(WorldError::UnknownChangeTag(11)));
    }
}
