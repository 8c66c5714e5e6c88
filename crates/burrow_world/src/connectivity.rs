//! # Connectivity Analysis
//!
//! Turns the set of removed cells into a hole depth.
//!
//! Removed cells are partitioned into 4-connected islands. An island with a
//! member at or above the sky row is surface-connected; anything else is a
//! sealed cavern. Depth counts only surface-connected islands, so a pocket
//! dug through a portal or cut off by a refill never inflates the number.
//!
//! ```text
//!   row 4  . # . . .      island A (touches row 4)  depth 3
//!   row 5  . # . . .
//!   row 6  . # . . .
//!   row 7  . . . . .
//!   row 8  . . . # .      island B (cavern)         hidden
//! ```
//!
//! Recomputation is O(n) in removed cells and only runs on edits.

use std::collections::HashSet;
use std::fmt;

use crate::cell::Cell;
use crate::change_log::ChangeLog;

/// Depth shown to the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthReport {
    /// Deepest surface-reachable row, counted from the grass row as 1.
    pub depth: u32,
    /// At least one removed cell is unreachable from the surface.
    pub has_hidden_caverns: bool,
}

impl fmt::Display for DepthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hole Depth: {}m", self.depth)?;
        if self.has_hidden_caverns {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// A maximal 4-connected group of removed cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Island {
    /// Members, sorted by (y, x).
    pub cells: Vec<Cell>,
    /// Some member is at or above the sky row.
    pub surface_connected: bool,
    /// Depth of the deepest member.
    pub max_depth: u32,
}

/// Flood-fills removed cells into islands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectivityAnalyzer {
    width: u32,
    sky_height: u32,
}

impl ConnectivityAnalyzer {
    /// Creates an analyzer for a grid of `width` columns.
    #[must_use]
    pub const fn new(width: u32, sky_height: u32) -> Self {
        Self { width, sky_height }
    }

    /// Depth of a single row: the grass row is 1, sky rows are 0.
    #[inline]
    #[must_use]
    pub const fn row_depth(&self, y: u32) -> u32 {
        (y + 1).saturating_sub(self.sky_height)
    }

    /// Computes depth from the log's removed cells.
    #[must_use]
    pub fn compute_depth(&self, log: &ChangeLog) -> DepthReport {
        self.depth_of(self.removed_cells(log))
    }

    /// Computes depth from an arbitrary set of removed cells.
    #[must_use]
    pub fn depth_of(&self, removed: HashSet<Cell>) -> DepthReport {
        let mut report = DepthReport::default();
        self.flood(removed, |island| {
            if island.surface_connected {
                report.depth = report.depth.max(island.max_depth);
            } else {
                report.has_hidden_caverns = true;
            }
        });
        report
    }

    /// Partitions the log's removed cells into islands, ordered by their
    /// first member.
    #[must_use]
    pub fn islands(&self, log: &ChangeLog) -> Vec<Island> {
        let mut islands = Vec::new();
        self.flood(self.removed_cells(log), |island| islands.push(island));
        islands.sort_by_key(|island| island.cells.first().map(|c| (c.y, c.x)));
        islands
    }

    fn removed_cells(&self, log: &ChangeLog) -> HashSet<Cell> {
        log.removed_indices()
            .map(|index| Cell::from_index(index, self.width))
            .collect()
    }

    fn flood(&self, mut remaining: HashSet<Cell>, mut visit: impl FnMut(Island)) {
        let mut stack = Vec::new();
        loop {
            let Some(start) = remaining.iter().next().copied() else {
                break;
            };
            remaining.remove(&start);
            stack.push(start);

            let mut cells = Vec::new();
            while let Some(cell) = stack.pop() {
                cells.push(cell);
                for neighbour in cell.neighbours() {
                    if remaining.remove(&neighbour) {
                        stack.push(neighbour);
                    }
                }
            }

            cells.sort_unstable_by_key(|c| (c.y, c.x));
            let surface_connected = cells.iter().any(|c| c.y <= self.sky_height);
            let max_depth = cells.iter().map(|c| self.row_depth(c.y)).max().unwrap_or(0);
            visit(Island {
                cells,
                surface_connected,
                max_depth,
            });
        }
    }
}

/// Current depth plus the session record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthTracker {
    current: DepthReport,
    max_depth: u32,
}

impl DepthTracker {
    /// Records a fresh report. Returns true if it set a new record.
    pub fn observe(&mut self, report: DepthReport) -> bool {
        self.current = report;
        if report.depth > self.max_depth {
            self.max_depth = report.depth;
            return true;
        }
        false
    }

    /// The latest report.
    #[must_use]
    pub const fn current(&self) -> DepthReport {
        self.current
    }

    /// Deepest surface-reachable depth seen this session.
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
