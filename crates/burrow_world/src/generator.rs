//! # Procedural Tile Generator
//!
//! Answers "what belongs at (x, y) if nobody touched it".
//!
//! ## Bands
//!
//! ```text
//! y <  sky_height              Blank
//! y == sky_height              Grass
//! y <  sky_height + shallow    shallow pool  (dirt, some sandy dirt)
//! otherwise                    deep pool     (dirt, sandy, light stone,
//!                                             mushrooms, stone pockets)
//! ```
//!
//! Special areas override all bands.
//!
//! ## Pools
//!
//! Each pool is a finite list holding every type as many times as its
//! weight, shuffled once from the seed. A cell reads
//! `pool[(x + width * y) % pool.len()]`. This reproduces the tuned ratios
//! exactly, costs one array read per cell, and needs no RNG call at lookup
//! time. The pools are large (hundreds of entries) so the repeat period is
//! far longer than any visible window.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::cell::Cell;
use crate::config::WorldConfig;
use crate::error::WorldResult;
use crate::seed::WorldSeed;
use crate::special_area::{shadowed_pairs, SpecialArea};
use crate::tile::TileType;

/// Weighted contents of a pool.
pub type PoolWeights = &'static [(TileType, usize)];

/// Shallow band: mostly dirt.
pub const SHALLOW_POOL: PoolWeights = &[(TileType::Dirt, 700), (TileType::SandyDirt, 200)];

/// Deep band: wider mixture with rare bonus material and void pockets.
pub const DEEP_POOL: PoolWeights = &[
    (TileType::Dirt, 700),
    (TileType::SandyDirt, 200),
    (TileType::LightStone, 130),
    (TileType::StoneWithMushroom, 40),
    (TileType::Stone, 20),
];

const SHALLOW_PURPOSE: u64 = 1;
const DEEP_PURPOSE: u64 = 2;

/// Deterministic generator for untouched cells.
#[derive(Clone, Debug)]
pub struct TileGenerator {
    seed: WorldSeed,
    width: u32,
    sky_height: u32,
    shallow_end: u32,
    shallow_pool: Vec<TileType>,
    deep_pool: Vec<TileType>,
    special_areas: Vec<SpecialArea>,
}

impl TileGenerator {
    /// Creates a generator from raw parameters.
    #[must_use]
    pub fn new(
        seed: WorldSeed,
        width: u32,
        sky_height: u32,
        shallow_depth: u32,
        special_areas: Vec<SpecialArea>,
    ) -> Self {
        let shallow_pool = Self::shuffled_pool(seed.derive(SHALLOW_PURPOSE), SHALLOW_POOL);
        let deep_pool = Self::shuffled_pool(seed.derive(DEEP_PURPOSE), DEEP_POOL);

        for (earlier, later) in shadowed_pairs(&special_areas) {
            debug!(earlier, later, "special area overlaps an earlier one; overlap is unreachable");
        }
        debug!(
            seed = seed.value(),
            width,
            sky_height,
            shallow_depth,
            shallow_pool = shallow_pool.len(),
            deep_pool = deep_pool.len(),
            special_areas = special_areas.len(),
            "tile generator ready"
        );

        Self {
            seed,
            width,
            sky_height,
            shallow_end: sky_height.saturating_add(shallow_depth),
            shallow_pool,
            deep_pool,
            special_areas,
        }
    }

    /// Creates a generator from a validated config.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured special areas are invalid.
    pub fn from_config(config: &WorldConfig, seed: WorldSeed) -> WorldResult<Self> {
        Ok(Self::new(
            seed,
            config.width,
            config.sky_height,
            config.shallow_depth,
            config.special_areas()?,
        ))
    }

    fn shuffled_pool(seed: WorldSeed, weights: PoolWeights) -> Vec<TileType> {
        let mut pool: Vec<TileType> = weights
            .iter()
            .flat_map(|&(tile, weight)| std::iter::repeat(tile).take(weight))
            .collect();
        pool.shuffle(&mut seed.rng());
        pool
    }

    /// The seed this generator was built from.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The sky band height.
    #[must_use]
    pub const fn sky_height(&self) -> u32 {
        self.sky_height
    }

    /// The overlays, in precedence order.
    #[must_use]
    pub fn special_areas(&self) -> &[SpecialArea] {
        &self.special_areas
    }

    /// Returns the generated tile for a cell.
    #[must_use]
    pub fn tile_at(&self, cell: Cell) -> TileType {
        if let Some(tile) = self.special_areas.iter().find_map(|area| area.tile_at(cell)) {
            return tile;
        }

        if cell.y < self.sky_height {
            TileType::Blank
        } else if cell.y == self.sky_height {
            TileType::Grass
        } else if cell.y < self.shallow_end {
            Self::pick(&self.shallow_pool, cell.index(self.width))
        } else {
            Self::pick(&self.deep_pool, cell.index(self.width))
        }
    }

    #[inline]
    fn pick(pool: &[TileType], index: u64) -> TileType {
        pool[(index % pool.len() as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn generator(seed: u64) -> TileGenerator {
        TileGenerator::new(WorldSeed::new(seed), 40, 4, 4, SpecialArea::default_set(40, 2000, 8))
    }

    #[test]
    fn test_generation_determinism() {
        let gen1 = generator(42);
        let gen2 = generator(42);

        for y in 0..300 {
            for x in 0..40 {
                let cell = Cell::new(x, y);
                assert_eq!(gen1.tile_at(cell), gen2.tile_at(cell), "Mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_seed_changes_deep_layout() {
        let gen1 = generator(1);
        let gen2 = generator(2);
        let differing = (0..40)
            .flat_map(|x| (20..60).map(move |y| Cell::new(x, y)))
            .filter(|&c| gen1.tile_at(c) != gen2.tile_at(c))
            .count();
        assert!(differing > 100, "different seeds should reshuffle, only {differing} differ");
    }

    #[test]
    fn test_sky_and_grass_rows() {
        let gen = generator(42);
        for x in 0..40 {
            for y in 0..4 {
                assert_eq!(gen.tile_at(Cell::new(x, y)), TileType::Blank);
            }
            assert_eq!(gen.tile_at(Cell::new(x, 4)), TileType::Grass);
        }
    }

    #[test]
    fn test_shallow_band_uses_shallow_pool() {
        let gen = TileGenerator::new(WorldSeed::new(42), 40, 4, 4, Vec::new());
        for x in 0..40 {
            for y in 5..8 {
                let tile = gen.tile_at(Cell::new(x, y));
                assert!(
                    matches!(tile, TileType::Dirt | TileType::SandyDirt),
                    "unexpected {tile:?} at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_deep_pool_matches_weights() {
        let gen = TileGenerator::new(WorldSeed::new(7), 1090, 4, 4, Vec::new());
        let mut counts: HashMap<TileType, usize> = HashMap::new();
        // One full row of a pool-length-wide grid visits every pool slot once.
        for x in 0..1090 {
            *counts.entry(gen.tile_at(Cell::new(x, 100))).or_default() += 1;
        }
        for &(tile, weight) in DEEP_POOL {
            assert_eq!(counts.get(&tile).copied().unwrap_or(0), weight, "{tile:?}");
        }
    }

    #[test]
    fn test_special_areas_take_precedence() {
        let gen = generator(42);
        // Mushroom marker sits in the shallow band where the pool never yields it.
        assert_eq!(gen.tile_at(Cell::new(22, 7)), TileType::StoneWithMushroom);
        for y in 14..17 {
            for x in 17..20 {
                assert_eq!(gen.tile_at(Cell::new(x, y)), TileType::Stone);
            }
        }
    }

    #[test]
    fn test_first_declared_area_wins() {
        let areas = vec![
            SpecialArea::new(5, 10, &vec![vec![TileType::Dirt; 3]; 3]).unwrap(),
            SpecialArea::new(6, 11, &vec![vec![TileType::LightStone; 3]; 3]).unwrap(),
        ];
        let gen = TileGenerator::new(WorldSeed::new(1), 40, 4, 4, areas);
        assert_eq!(gen.tile_at(Cell::new(7, 12)), TileType::Dirt);
        assert_eq!(gen.tile_at(Cell::new(8, 13)), TileType::LightStone);
    }
}
