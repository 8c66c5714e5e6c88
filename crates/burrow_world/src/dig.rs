//! # Dig Engine
//!
//! The operation surface of the world. Owns the change log, the grid window,
//! the portal pair and the depth tracker for one session.
//!
//! Every accepted edit writes exactly one change-log entry, updates the
//! materialized tile (collision flag included), adjusts the portal pair and
//! recomputes depth. Rejected edits touch nothing.
//!
//! Rejections are gameplay, not errors: they come back as `None` or
//! [`IntentOutcome::Rejected`].

use tracing::{debug, info};

use crate::cell::{Cell, GridGeometry, WorldRect};
use crate::change_log::{ChangeAction, ChangeEntry, ChangeLog};
use crate::config::WorldConfig;
use crate::connectivity::{ConnectivityAnalyzer, DepthReport, DepthTracker};
use crate::error::{WorldError, WorldResult};
use crate::generator::TileGenerator;
use crate::grid_window::{GridWindow, WindowStats};
use crate::portal::{PortalPair, PortalPoint};
use crate::seed::WorldSeed;
use crate::tile::TileType;

/// Result of an accepted undig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// The refilled cell.
    pub cell: Cell,
    /// What now occupies it.
    pub placed: TileType,
    /// The portal pair after the edit, when a portal was placed.
    pub portals: Option<PortalPair>,
}

/// Outcome of a click from the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IntentOutcome {
    /// The shovel was empty and the cell was dug. The shovel now holds
    /// `removed`.
    Dug {
        /// The dug cell.
        cell: Cell,
        /// What was there.
        removed: TileType,
    },
    /// The shovel's contents were poured into the cell. The shovel is empty.
    Placed {
        /// The refilled cell.
        cell: Cell,
        /// What now occupies it.
        placed: TileType,
        /// The portal pair after the edit, when a portal was placed.
        portals: Option<PortalPair>,
    },
    /// Nothing changed.
    Rejected,
}

/// Starter funnel rows, relative to the grass row: (row offset, first x, last x).
const STARTER_PIT: [(u32, u32, u32); 3] = [(0, 1, 7), (1, 2, 6), (2, 3, 5)];

/// Column of the orange portal at the bottom of the starter funnel.
const STARTER_PORTAL_X: u32 = 4;

/// Dig and undig over one world.
#[derive(Debug)]
pub struct DigEngine {
    log: ChangeLog,
    window: GridWindow,
    analyzer: ConnectivityAnalyzer,
    portals: PortalPair,
    depth: DepthTracker,
}

impl DigEngine {
    /// Builds an engine with an empty change log.
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate.
    pub fn new(config: &WorldConfig, seed: WorldSeed) -> WorldResult<Self> {
        config.validate()?;
        let generator = TileGenerator::from_config(config, seed)?;
        let window = GridWindow::new(config.geometry(), config.window_margin, generator);
        Ok(Self {
            log: ChangeLog::new(),
            window,
            analyzer: ConnectivityAnalyzer::new(config.width, config.sky_height),
            portals: PortalPair::default(),
            depth: DepthTracker::default(),
        })
    }

    /// Grid dimensions and scale.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        self.window.geometry()
    }

    /// The seed behind untouched cells.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.window.generator().seed()
    }

    /// The change log.
    #[must_use]
    pub const fn change_log(&self) -> &ChangeLog {
        &self.log
    }

    /// The materialized window.
    #[must_use]
    pub const fn window(&self) -> &GridWindow {
        &self.window
    }

    /// Current portal positions.
    #[must_use]
    pub const fn portals(&self) -> PortalPair {
        self.portals
    }

    /// Depth after the latest edit.
    #[must_use]
    pub const fn depth(&self) -> DepthReport {
        self.depth.current()
    }

    /// Deepest surface-reachable depth this session.
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.depth.max_depth()
    }

    /// The connectivity analyzer for this grid.
    #[must_use]
    pub const fn analyzer(&self) -> &ConnectivityAnalyzer {
        &self.analyzer
    }

    /// The tile currently at (x, y), or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileType> {
        self.window.resolve(Cell::new(x, y), &self.log)
    }

    /// Materializes tiles around the camera rect.
    pub fn update_window(&mut self, visible: WorldRect) -> WindowStats {
        self.window.update(visible, &self.log)
    }

    /// Returns true if the tile at (x, y) can be dug.
    #[must_use]
    pub fn can_dig(&self, x: u32, y: u32) -> bool {
        self.tile_at(x, y).is_some_and(TileType::destructible)
    }

    /// Returns true if the cell at (x, y) holds a void that can be refilled.
    #[must_use]
    pub fn can_undig(&self, x: u32, y: u32) -> bool {
        self.tile_at(x, y).is_some_and(TileType::placeable)
    }

    /// Digs the cell at (x, y). Returns what was removed, or `None` if the
    /// cell cannot be dug.
    pub fn dig(&mut self, x: u32, y: u32) -> Option<TileType> {
        if !self.can_dig(x, y) {
            return None;
        }
        let cell = Cell::new(x, y);
        let removed = self.apply(cell, ChangeAction::Remove);
        debug!(x, y, removed = ?removed, "dug");
        self.refresh_depth();
        Some(removed)
    }

    /// Refills the void at (x, y) with `tile`.
    ///
    /// Returns `None` if the cell is not a void or `tile` is not material the
    /// player could have carried.
    pub fn undig(&mut self, x: u32, y: u32, tile: TileType) -> Option<Placement> {
        if !tile.is_fill_material() || !self.can_undig(x, y) {
            return None;
        }
        let cell = Cell::new(x, y);
        self.apply(cell, ChangeAction::PlaceAs(tile));
        debug!(x, y, placed = ?tile, "undug");
        self.refresh_depth();
        Some(Placement {
            cell,
            placed: tile,
            portals: tile.is_portal().then_some(self.portals),
        })
    }

    /// Handles a click at a world-space point. An empty shovel digs; a full
    /// one pours its contents.
    pub fn apply_intent(
        &mut self,
        world_x: f32,
        world_y: f32,
        shovel: Option<TileType>,
    ) -> IntentOutcome {
        let Some(cell) = self.geometry().world_to_cell(world_x, world_y) else {
            return IntentOutcome::Rejected;
        };
        match shovel {
            None => self
                .dig(cell.x, cell.y)
                .map_or(IntentOutcome::Rejected, |removed| IntentOutcome::Dug {
                    cell,
                    removed,
                }),
            Some(tile) => self.undig(cell.x, cell.y, tile).map_or(
                IntentOutcome::Rejected,
                |placement| IntentOutcome::Placed {
                    cell: placement.cell,
                    placed: placement.placed,
                    portals: placement.portals,
                },
            ),
        }
    }

    /// Digs the opening funnel below the grass row and drops the orange
    /// portal at its bottom. Cells that cannot be dug are skipped.
    ///
    /// Returns the number of accepted edits.
    pub fn carve_starter_pit(&mut self) -> usize {
        let grass = self.window.generator().sky_height();
        let mut edits = 0;
        for (offset, first, last) in STARTER_PIT {
            for x in first..=last {
                if self.dig(x, grass + offset).is_some() {
                    edits += 1;
                }
            }
        }
        if self
            .undig(STARTER_PORTAL_X, grass + 2, TileType::PortalOrange)
            .is_some()
        {
            edits += 1;
        }
        info!(edits, "starter pit carved");
        edits
    }

    /// Applies saved entries in log order without validation or per-edit
    /// logging, then recomputes depth once.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::IndexOutOfGrid` for an entry that does not
    /// address a cell of this grid. Entries before it stay applied.
    pub fn replay(&mut self, entries: impl IntoIterator<Item = ChangeEntry>) -> WorldResult<usize> {
        let geometry = *self.geometry();
        let mut applied = 0;
        for entry in entries {
            let cell = geometry
                .cell_at_index(entry.index)
                .ok_or(WorldError::IndexOutOfGrid {
                    index: entry.index,
                    width: geometry.width,
                    height: geometry.height,
                })?;
            self.apply(cell, entry.action);
            applied += 1;
        }
        self.refresh_depth();
        debug!(
            applied,
            logged = self.log.len(),
            depth = self.depth().depth,
            "change log replayed"
        );
        Ok(applied)
    }

    /// Writes one action: log entry, materialized tile, portal pair.
    /// Returns the tile that was there before.
    fn apply(&mut self, cell: Cell, action: ChangeAction) -> TileType {
        let previous = self
            .window
            .resolve(cell, &self.log)
            .unwrap_or(TileType::SolidBoundary);
        let next = self.window.apply_action(cell, action);
        let index = cell.index(self.geometry().width);

        self.log.record(index, action);
        self.window.set_tile(cell, next);

        if previous.is_portal() {
            self.portals.clear_at(cell);
        }
        if next.is_portal() {
            let point = PortalPoint::at(cell, self.geometry());
            self.portals.place(next, point);
        }
        previous
    }

    fn refresh_depth(&mut self) {
        let report = self.analyzer.compute_depth(&self.log);
        if self.depth.observe(report) {
            info!(depth = report.depth, "new depth record");
        }
    }
}
