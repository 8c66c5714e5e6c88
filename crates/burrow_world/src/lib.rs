//! # Burrow World
//!
//! World-state core of a 2D digging game: a tall grid of typed tiles the
//! player can dig out and refill, with a hole depth derived from which dug
//! cells are still reachable from the surface.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same terrain
//! 2. **Sparse**: Only player edits are stored; everything else is regenerated
//! 3. **Windowed**: Only cells near the camera (plus edits) are materialized
//! 4. **No I/O**: Durability lives in `burrow_store`
//!
//! ## Core Components
//!
//! - `TileType`: The closed tile catalog and its capability flags
//! - `TileGenerator`: Seeded terrain with hand-authored overlays
//! - `ChangeLog`: Last-write-wins record of player edits
//! - `GridWindow`: Materializes cells around the camera
//! - `DigEngine`: Dig, undig, portals and depth
//! - `ConnectivityAnalyzer`: Islands of dug cells and the surface depth
//!
//! ## Example
//!
//! ```rust,ignore
//! use burrow_world::{DigEngine, WorldConfig, WorldRect, WorldSeed};
//!
//! let config = WorldConfig::default();
//! let mut engine = DigEngine::new(&config, WorldSeed::new(12345))?;
//!
//! engine.update_window(WorldRect::new(0.0, 0.0, 1280.0, 720.0));
//! engine.dig(10, 4);
//! println!("{}", engine.depth()); // "Hole Depth: 1m"
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cell;
pub mod change_log;
pub mod config;
pub mod connectivity;
pub mod dig;
pub mod error;
pub mod generator;
pub mod grid_window;
pub mod portal;
pub mod seed;
pub mod special_area;
pub mod tile;

pub use cell::{Cell, CellRect, GridGeometry, WorldRect};
pub use change_log::{ChangeAction, ChangeEntry, ChangeLog};
pub use config::{SpecialAreaConfig, WorldConfig};
pub use connectivity::{ConnectivityAnalyzer, DepthReport, DepthTracker, Island};
pub use dig::{DigEngine, IntentOutcome, Placement};
pub use error::{WorldError, WorldResult};
pub use generator::{PoolWeights, TileGenerator, DEEP_POOL, SHALLOW_POOL};
pub use grid_window::{GridWindow, MaterializedTile, WindowStats};
pub use portal::{PortalPair, PortalPoint};
pub use seed::WorldSeed;
pub use special_area::{shadowed_pairs, SpecialArea};
pub use tile::{Capabilities, TileType};
