//! # Cells and World Geometry
//!
//! A cell is one grid-addressable tile. The linear index `x + width * y` is
//! the change-log key, so it is only reversible for the grid width it was
//! written with.
//!
//! World space is what the camera and input collaborators speak: floats in
//! world units, `tile_size` units per cell, row 0 at the top.

/// A cell coordinate inside the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column.
    pub x: u32,
    /// Row (0 = top of the sky).
    pub y: u32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the linear change-log index for a grid of `width` columns.
    #[inline]
    #[must_use]
    pub const fn index(self, width: u32) -> u64 {
        self.x as u64 + width as u64 * self.y as u64
    }

    /// Converts a linear index back to a cell for a grid of `width` columns.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u64, width: u32) -> Self {
        Self {
            x: (index % width as u64) as u32,
            y: (index / width as u64) as u32,
        }
    }

    /// Returns the 4-connected neighbours, skipping those below zero.
    ///
    /// Upper bounds are not checked; callers filter by membership.
    pub fn neighbours(self) -> impl Iterator<Item = Cell> {
        let Self { x, y } = self;
        [
            y.checked_sub(1).map(|ny| Cell::new(x, ny)),
            x.checked_add(1).map(|nx| Cell::new(nx, y)),
            y.checked_add(1).map(|ny| Cell::new(x, ny)),
            x.checked_sub(1).map(|nx| Cell::new(nx, y)),
        ]
        .into_iter()
        .flatten()
    }
}

/// An axis-aligned rectangle in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl WorldRect {
    /// Creates a new world rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scales the rectangle around its center.
    #[must_use]
    pub fn expanded(self, factor: f32) -> Self {
        let width = self.width * factor;
        let height = self.height * factor;
        Self {
            x: self.x - (width - self.width) * 0.5,
            y: self.y - (height - self.height) * 0.5,
            width,
            height,
        }
    }
}

/// Inclusive cell bounds, already clamped to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    /// Leftmost column.
    pub min_x: u32,
    /// Topmost row.
    pub min_y: u32,
    /// Rightmost column.
    pub max_x: u32,
    /// Bottom row.
    pub max_y: u32,
}

impl CellRect {
    /// Returns true if the cell lies inside the bounds.
    #[inline]
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min_x && cell.x <= self.max_x && cell.y >= self.min_y && cell.y <= self.max_y
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(&self) -> u64 {
        (self.max_x - self.min_x + 1) as u64 * (self.max_y - self.min_y + 1) as u64
    }

    /// Iterates every covered cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y).flat_map(move |y| (min_x..=max_x).map(move |x| Cell::new(x, y)))
    }
}

/// Grid dimensions plus the world-space scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// World units per cell edge.
    pub tile_size: f32,
}

impl GridGeometry {
    /// Creates grid geometry.
    #[must_use]
    pub const fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
        }
    }

    /// Returns true if (x, y) addresses a cell of this grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Returns the cell for a linear index, or `None` past the last row.
    #[must_use]
    pub fn cell_at_index(&self, index: u64) -> Option<Cell> {
        let width = u64::from(self.width);
        if width == 0 {
            return None;
        }
        // Bound the row before narrowing it.
        let row = index / width;
        if row >= u64::from(self.height) {
            return None;
        }
        let x = u32::try_from(index % width).ok()?;
        let y = u32::try_from(row).ok()?;
        Some(Cell::new(x, y))
    }

    /// Converts a world-space point to the cell under it.
    ///
    /// Returns `None` outside the grid.
    #[must_use]
    pub fn world_to_cell(&self, world_x: f32, world_y: f32) -> Option<Cell> {
        let cx = (world_x / self.tile_size).floor();
        let cy = (world_y / self.tile_size).floor();
        if !cx.is_finite() || !cy.is_finite() || cx < 0.0 || cy < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x, y) = (cx as u32, cy as u32);
        self.contains(x, y).then_some(Cell::new(x, y))
    }

    /// Returns the world-space center of a cell.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn cell_center(&self, cell: Cell) -> (f32, f32) {
        (
            (cell.x as f32 + 0.5) * self.tile_size,
            (cell.y as f32 + 0.5) * self.tile_size,
        )
    }

    /// Returns the cells touched by a world rectangle, clamped to the grid.
    ///
    /// Returns `None` when the rectangle misses the grid entirely.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    #[must_use]
    pub fn cells_covering(&self, rect: WorldRect) -> Option<CellRect> {
        let finite = [rect.x, rect.y, rect.width, rect.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width == 0 || self.height == 0 || rect.width <= 0.0 || rect.height <= 0.0
        {
            return None;
        }
        let min_x = (rect.x / self.tile_size).floor();
        let min_y = (rect.y / self.tile_size).floor();
        let max_x = ((rect.x + rect.width) / self.tile_size).ceil() - 1.0;
        let max_y = ((rect.y + rect.height) / self.tile_size).ceil() - 1.0;

        let last_x = f64::from(self.width - 1);
        let last_y = f64::from(self.height - 1);
        let (min_x, min_y, max_x, max_y) = (
            f64::from(min_x),
            f64::from(min_y),
            f64::from(max_x),
            f64::from(max_y),
        );
        if max_x < 0.0 || max_y < 0.0 || min_x > last_x || min_y > last_y {
            return None;
        }

        #[allow(clippy::cast_sign_loss)]
        Some(CellRect {
            min_x: min_x.clamp(0.0, last_x) as u32,
            min_y: min_y.clamp(0.0, last_y) as u32,
            max_x: max_x.clamp(0.0, last_x) as u32,
            max_y: max_y.clamp(0.0, last_y) as u32,
        })
    }
}
