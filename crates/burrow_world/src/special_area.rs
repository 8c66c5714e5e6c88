//! # Special Areas
//!
//! Hand-authored rectangles of tiles that override the weighted pools.
//! Areas are checked in declaration order and the first hit wins, so a later
//! area overlapping an earlier one is partly (or wholly) unreachable.

use crate::cell::Cell;
use crate::error::{WorldError, WorldResult};
use crate::tile::TileType;

/// An axis-aligned rectangle of authored tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialArea {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    /// Row-major tiles, `width * height` entries.
    tiles: Vec<TileType>,
}

impl SpecialArea {
    /// Creates an area from rows of tiles, top row first.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidSpecialArea` if there are no rows, a row is
    /// empty, or the rows have different lengths.
    pub fn new(x: u32, y: u32, rows: &[Vec<TileType>]) -> WorldResult<Self> {
        let invalid = |reason: &str| WorldError::InvalidSpecialArea {
            x,
            y,
            reason: reason.to_string(),
        };

        let first = rows.first().ok_or_else(|| invalid("no rows"))?;
        if first.is_empty() {
            return Err(invalid("empty row"));
        }
        if rows.iter().any(|row| row.len() != first.len()) {
            return Err(invalid("ragged rows"));
        }

        let width = u32::try_from(first.len()).map_err(|_| invalid("too wide"))?;
        let height = u32::try_from(rows.len()).map_err(|_| invalid("too tall"))?;
        Ok(Self {
            x,
            y,
            width,
            height,
            tiles: rows.iter().flatten().copied().collect(),
        })
    }

    /// A `size` x `size` pocket of dug-out void.
    #[must_use]
    pub fn square_empty(x: u32, y: u32, size: u32) -> Self {
        let size = size.max(1);
        Self {
            x,
            y,
            width: size,
            height: size,
            tiles: vec![TileType::Stone; (size * size) as usize],
        }
    }

    /// The built-in areas, placed around the grid's horizontal center line.
    ///
    /// `shallow_end` is the first row of the deep band. Areas that would not
    /// fit inside a small grid are left out.
    #[must_use]
    pub fn default_set(width: u32, height: u32, shallow_end: u32) -> Vec<Self> {
        let center = width / 2;
        let pocket = [
            vec![TileType::Stone, TileType::Stone, TileType::Dirt],
            vec![TileType::Stone, TileType::Stone, TileType::StoneWithMushroom],
        ];

        let candidates = [
            Self::new(
                center.saturating_add(2),
                shallow_end.saturating_sub(1),
                &[vec![TileType::StoneWithMushroom]],
            ),
            Self::new(center.saturating_add(1), shallow_end.saturating_add(3), &pocket),
            Ok(Self::square_empty(
                center.saturating_sub(3),
                shallow_end.saturating_add(6),
                3,
            )),
        ];

        candidates
            .into_iter()
            .flatten()
            .filter(|area| area.fits(width, height))
            .collect()
    }

    /// Left column.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Top row.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns true if the whole area lies inside a `width` x `height` grid.
    #[must_use]
    pub fn fits(&self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    /// Returns true if the cell is covered by this area.
    #[inline]
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x
            && cell.y >= self.y
            && u64::from(cell.x) < u64::from(self.x) + u64::from(self.width)
            && u64::from(cell.y) < u64::from(self.y) + u64::from(self.height)
    }

    /// Returns the authored tile at a covered cell.
    #[inline]
    #[must_use]
    pub fn tile_at(&self, cell: Cell) -> Option<TileType> {
        if !self.contains(cell) {
            return None;
        }
        let local = (cell.y - self.y) * self.width + (cell.x - self.x);
        self.tiles.get(local as usize).copied()
    }

    /// Returns true if the two areas share at least one cell.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let (ax1, ay1) = (u64::from(self.x) + u64::from(self.width), u64::from(self.y) + u64::from(self.height));
        let (bx1, by1) = (u64::from(other.x) + u64::from(other.width), u64::from(other.y) + u64::from(other.height));
        u64::from(self.x) < bx1 && u64::from(other.x) < ax1 && u64::from(self.y) < by1 && u64::from(other.y) < ay1
    }
}

/// Returns `(earlier, later)` index pairs of overlapping areas.
///
/// Cells in the overlap always resolve to the earlier area.
#[must_use]
pub fn shadowed_pairs(areas: &[SpecialArea]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, earlier) in areas.iter().enumerate() {
        for (j, later) in areas.iter().enumerate().skip(i + 1) {
            if earlier.overlaps(later) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_rows() {
        assert!(SpecialArea::new(0, 0, &[]).is_err());
        assert!(SpecialArea::new(0, 0, &[vec![]]).is_err());
        let ragged = [vec![TileType::Dirt, TileType::Dirt], vec![TileType::Dirt]];
        assert!(matches!(
            SpecialArea::new(3, 4, &ragged),
            Err(WorldError::InvalidSpecialArea { x: 3, y: 4, .. })
        ));
    }

    #[test]
    fn test_tile_at_uses_local_offsets() {
        let area = SpecialArea::new(
            10,
            5,
            &[
                vec![TileType::Stone, TileType::Dirt],
                vec![TileType::Grass, TileType::LightStone],
            ],
        )
        .unwrap();
        assert_eq!(area.tile_at(Cell::new(10, 5)), Some(TileType::Stone));
        assert_eq!(area.tile_at(Cell::new(11, 5)), Some(TileType::Dirt));
        assert_eq!(area.tile_at(Cell::new(10, 6)), Some(TileType::Grass));
        assert_eq!(area.tile_at(Cell::new(11, 6)), Some(TileType::LightStone));
        assert_eq!(area.tile_at(Cell::new(12, 6)), None);
        assert_eq!(area.tile_at(Cell::new(9, 5)), None);
    }

    #[test]
    fn test_default_set_layout() {
        let areas = SpecialArea::default_set(40, 200, 8);
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[0].tile_at(Cell::new(22, 7)), Some(TileType::StoneWithMushroom));
        assert_eq!(areas[1].tile_at(Cell::new(23, 12)), Some(TileType::StoneWithMushroom));
        assert_eq!(areas[2].tile_at(Cell::new(17, 14)), Some(TileType::Stone));
        assert_eq!(areas[2].tile_at(Cell::new(19, 16)), Some(TileType::Stone));
    }

    #[test]
    fn test_default_set_has_no_shadowed_areas() {
        let areas = SpecialArea::default_set(40, 200, 8);
        assert!(shadowed_pairs(&areas).is_empty());
    }

    #[test]
    fn test_overlap_flags_later_area() {
        let areas = vec![
            SpecialArea::square_empty(5, 5, 3),
            SpecialArea::new(7, 7, &[vec![TileType::Dirt, TileType::Dirt]]).unwrap(),
            SpecialArea::square_empty(20, 20, 2),
        ];
        assert_eq!(shadowed_pairs(&areas), vec![(0, 1)]);
    }

    #[test]
    fn test_default_set_drops_areas_that_do_not_fit() {
        let areas = SpecialArea::default_set(4, 12, 8);
        assert!(areas.iter().all(|a| a.fits(4, 12)));
        assert!(areas.len() < 3);
    }

    #[test]
    fn test_default_set_past_the_grid_is_empty() {
        assert!(SpecialArea::default_set(40, 200, u32::MAX).is_empty());
    }
}
