//! # Grid Window
//!
//! Keeps exactly the cells around the camera materialized, plus every cell
//! the player has edited.
//!
//! ## Update pass
//!
//! ```text
//! visible rect ──expand(margin)──▶ clamp to grid ──▶ CellRect
//!                                                     │
//!     create: cells in rect not yet resident  ◀───────┤
//!     evict:  resident cells outside rect      ◀──────┘
//!             that have no change-log entry
//! ```
//!
//! Evicted cells come back identical on re-entry because generation is
//! deterministic and edited cells never leave.

use std::collections::HashMap;

use tracing::trace;

use crate::cell::{Cell, CellRect, GridGeometry, WorldRect};
use crate::change_log::{ChangeAction, ChangeLog};
use crate::generator::TileGenerator;
use crate::tile::TileType;

/// A resident cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterializedTile {
    /// Resolved type.
    pub tile: TileType,
    /// Always `tile.collides()`; stored for the physics collaborator.
    pub collides: bool,
}

impl MaterializedTile {
    /// Materializes a type with its derived collision flag.
    #[inline]
    #[must_use]
    pub const fn new(tile: TileType) -> Self {
        Self {
            tile,
            collides: tile.collides(),
        }
    }
}

/// Counters from one [`GridWindow::update`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// Cells materialized this pass.
    pub created: usize,
    /// Cells dropped this pass.
    pub evicted: usize,
    /// Cells resident after the pass.
    pub resident: usize,
}

/// The materialized part of the grid.
#[derive(Debug)]
pub struct GridWindow {
    geometry: GridGeometry,
    margin: f32,
    generator: TileGenerator,
    tiles: HashMap<u64, MaterializedTile>,
    window: Option<CellRect>,
}

impl GridWindow {
    /// Creates an empty window over a grid.
    #[must_use]
    pub fn new(geometry: GridGeometry, margin: f32, generator: TileGenerator) -> Self {
        Self {
            geometry,
            margin,
            generator,
            tiles: HashMap::new(),
            window: None,
        }
    }

    /// Grid dimensions and scale.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// The generator behind untouched cells.
    #[must_use]
    pub const fn generator(&self) -> &TileGenerator {
        &self.generator
    }

    /// The cell bounds of the last update, if it touched the grid.
    #[must_use]
    pub const fn window(&self) -> Option<CellRect> {
        self.window
    }

    /// Number of resident cells.
    #[must_use]
    pub fn resident(&self) -> usize {
        self.tiles.len()
    }

    /// Materializes the cells around `visible` and evicts unedited cells
    /// that fell out of it.
    ///
    /// A rect entirely outside the grid leaves only edited cells resident.
    pub fn update(&mut self, visible: WorldRect, log: &ChangeLog) -> WindowStats {
        let window = self.geometry.cells_covering(visible.expanded(self.margin));
        let width = self.geometry.width;
        let mut stats = WindowStats::default();

        if let Some(rect) = window {
            for cell in rect.cells() {
                let index = cell.index(width);
                if self.tiles.contains_key(&index) {
                    continue;
                }
                let tile = self.resolve_unmaterialized(cell, log);
                self.tiles.insert(index, MaterializedTile::new(tile));
                stats.created += 1;
            }
        }

        let before = self.tiles.len();
        self.tiles.retain(|&index, _| {
            log.contains(index)
                || window.is_some_and(|rect| rect.contains(Cell::from_index(index, width)))
        });
        stats.evicted = before - self.tiles.len();
        stats.resident = self.tiles.len();
        self.window = window;

        trace!(
            created = stats.created,
            evicted = stats.evicted,
            resident = stats.resident,
            "window updated"
        );
        stats
    }

    /// The resident tile at a cell, if materialized.
    #[inline]
    #[must_use]
    pub fn materialized(&self, cell: Cell) -> Option<MaterializedTile> {
        self.tiles.get(&cell.index(self.geometry.width)).copied()
    }

    /// Returns true if the cell is resident.
    #[must_use]
    pub fn is_materialized(&self, cell: Cell) -> bool {
        self.tiles.contains_key(&cell.index(self.geometry.width))
    }

    /// Resident cells in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = (Cell, MaterializedTile)> + '_ {
        let width = self.geometry.width;
        self.tiles
            .iter()
            .map(move |(&index, &tile)| (Cell::from_index(index, width), tile))
    }

    /// The tile the player sees at a cell, materialized or not.
    ///
    /// Returns `None` outside the grid.
    #[must_use]
    pub fn resolve(&self, cell: Cell, log: &ChangeLog) -> Option<TileType> {
        if !self.geometry.contains(cell.x, cell.y) {
            return None;
        }
        Some(
            self.materialized(cell)
                .map_or_else(|| self.resolve_unmaterialized(cell, log), |m| m.tile),
        )
    }

    /// The void a dig leaves behind: open sky above the grass row, stone
    /// void from the grass row down.
    #[inline]
    #[must_use]
    pub const fn void_at(&self, cell: Cell) -> TileType {
        if cell.y < self.generator.sky_height() {
            TileType::Blank
        } else {
            TileType::Stone
        }
    }

    /// The tile an action leaves at a cell.
    #[must_use]
    pub const fn apply_action(&self, cell: Cell, action: ChangeAction) -> TileType {
        match action {
            ChangeAction::Remove => self.void_at(cell),
            ChangeAction::PlaceAs(tile) => tile,
        }
    }

    /// Writes a resolved type into the window, recomputing its collision
    /// flag. Out-of-grid cells are ignored.
    pub fn set_tile(&mut self, cell: Cell, tile: TileType) {
        if self.geometry.contains(cell.x, cell.y) {
            self.tiles
                .insert(cell.index(self.geometry.width), MaterializedTile::new(tile));
        }
    }

    fn resolve_unmaterialized(&self, cell: Cell, log: &ChangeLog) -> TileType {
        log.get(cell.index(self.geometry.width)).map_or_else(
            || self.generator.tile_at(cell),
            |action| self.apply_action(cell, action),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::WorldSeed;

    const TILE: f32 = 10.0;

    fn window() -> GridWindow {
        let generator = TileGenerator::new(WorldSeed::new(42), 20, 4, 4, Vec::new());
        GridWindow::new(GridGeometry::new(20, 100, TILE), 1.0, generator)
    }

    #[test]
    fn test_update_materializes_visible_cells() {
        let mut win = window();
        let log = ChangeLog::new();
        let stats = win.update(WorldRect::new(0.0, 0.0, 50.0, 50.0), &log);
        assert_eq!(stats.created, 25);
        assert_eq!(stats.evicted, 0);
        assert_eq!(stats.resident, 25);
        assert_eq!(win.materialized(Cell::new(2, 4)).map(|m| m.tile), Some(TileType::Grass));
    }

    #[test]
    fn test_second_update_is_incremental() {
        let mut win = window();
        let log = ChangeLog::new();
        win.update(WorldRect::new(0.0, 0.0, 50.0, 50.0), &log);
        let stats = win.update(WorldRect::new(0.0, 10.0, 50.0, 50.0), &log);
        assert_eq!(stats.created, 5);
        assert_eq!(stats.evicted, 5);
        assert_eq!(stats.resident, 25);
    }

    #[test]
    fn test_margin_expands_around_center() {
        let generator = TileGenerator::new(WorldSeed::new(42), 20, 4, 4, Vec::new());
        let mut win = GridWindow::new(GridGeometry::new(20, 100, TILE), 2.0, generator);
        win.update(WorldRect::new(50.0, 50.0, 20.0, 20.0), &ChangeLog::new());
        assert_eq!(
            win.window(),
            Some(CellRect { min_x: 4, min_y: 4, max_x: 7, max_y: 7 })
        );
    }

    #[test]
    fn test_edited_cells_survive_eviction() {
        let mut win = window();
        let mut log = ChangeLog::new();
        win.update(WorldRect::new(0.0, 0.0, 50.0, 50.0), &log);

        let edited = Cell::new(1, 3);
        log.record(edited.index(20), ChangeAction::PlaceAs(TileType::Dirt));
        win.set_tile(edited, TileType::Dirt);

        win.update(WorldRect::new(0.0, 500.0, 50.0, 50.0), &log);
        assert!(win.is_materialized(edited));
        assert!(!win.is_materialized(Cell::new(0, 0)));
        assert_eq!(win.materialized(edited), Some(MaterializedTile::new(TileType::Dirt)));
    }

    #[test]
    fn test_rect_outside_grid_materializes_nothing() {
        let mut win = window();
        let log = ChangeLog::new();
        win.update(WorldRect::new(0.0, 0.0, 50.0, 50.0), &log);
        let stats = win.update(WorldRect::new(5000.0, 0.0, 50.0, 50.0), &log);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.resident, 0);
        assert_eq!(win.window(), None);
    }

    #[test]
    fn test_unmaterialized_cells_resolve_through_log() {
        let win = window();
        let mut log = ChangeLog::new();
        let deep = Cell::new(3, 60);
        log.record(deep.index(20), ChangeAction::Remove);
        assert_eq!(win.resolve(deep, &log), Some(TileType::Stone));
        assert_eq!(win.resolve(Cell::new(3, 0), &log), Some(TileType::Blank));
        assert_eq!(win.resolve(Cell::new(20, 0), &log), None);
    }

    #[test]
    fn test_set_tile_recomputes_collision() {
        let mut win = window();
        let cell = Cell::new(5, 10);
        win.set_tile(cell, TileType::Dirt);
        assert!(win.materialized(cell).is_some_and(|m| m.collides));
        win.set_tile(cell, TileType::Stone);
        assert!(win.materialized(cell).is_some_and(|m| !m.collides));
        win.set_tile(Cell::new(99, 10), TileType::Dirt);
        assert_eq!(win.resident(), 1);
    }
}
