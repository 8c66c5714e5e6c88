//! # Session
//!
//! The explicit per-game context: one dig engine, one save writer, no
//! globals. Opening a session loads the save (or starts a fresh world),
//! replays the change log quietly and starts the writer.
//!
//! Every accepted edit enqueues a snapshot. Rejected edits and window
//! updates never touch storage. Storage failures are logged by the writer
//! and never reach gameplay; the in-memory log stays authoritative.

use burrow_world::{
    DepthReport, DigEngine, IntentOutcome, Placement, PortalPair, TileType, WindowStats,
    WorldConfig, WorldRect, WorldSeed,
};
use tracing::{debug, info, warn};

use crate::backend::SaveBackend;
use crate::error::StoreResult;
use crate::save_format::SaveData;
use crate::writer::{SaveWriter, WriterStats};

/// One running game.
#[derive(Debug)]
pub struct Session {
    engine: DigEngine,
    writer: SaveWriter,
}

impl Session {
    /// Opens a session over a backend.
    ///
    /// An existing save supplies the seed and change log. Otherwise the
    /// configured seed (or a random one) starts a fresh world, which is
    /// saved straight away so the seed survives a crash before the first
    /// edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the save cannot be read
    /// or decoded, or it was written for another grid width.
    pub fn open<B: SaveBackend>(config: &WorldConfig, mut backend: B) -> StoreResult<Self> {
        config.validate()?;

        let saved = backend
            .load()?
            .map(|bytes| SaveData::decode(&bytes))
            .transpose()?;

        let (engine, fresh) = match saved {
            Some(save) => {
                save.check_width(config.width)?;
                if config.seed.is_some_and(|seed| seed != save.seed.value()) {
                    debug!(
                        saved = save.seed.value(),
                        "configured seed ignored; the save keeps its own"
                    );
                }
                let mut engine = DigEngine::new(config, save.seed)?;
                let applied = engine.replay(save.entries)?;
                info!(
                    seed = save.seed.value(),
                    entries = applied,
                    depth = engine.depth().depth,
                    "session restored"
                );
                (engine, false)
            }
            None => {
                let seed = WorldSeed::new(config.seed.unwrap_or_else(rand::random));
                info!(seed = seed.value(), "starting fresh world");
                (DigEngine::new(config, seed)?, true)
            }
        };

        let session = Self {
            engine,
            writer: SaveWriter::spawn(backend),
        };
        if fresh {
            session.persist();
        }
        Ok(session)
    }

    /// The world engine, read-only.
    #[must_use]
    pub const fn engine(&self) -> &DigEngine {
        &self.engine
    }

    /// The world seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.engine.seed()
    }

    /// Depth after the latest edit.
    #[must_use]
    pub const fn depth(&self) -> DepthReport {
        self.engine.depth()
    }

    /// Current portal positions.
    #[must_use]
    pub const fn portals(&self) -> PortalPair {
        self.engine.portals()
    }

    /// Materializes tiles around the camera. Never persists.
    pub fn update_window(&mut self, visible: WorldRect) -> WindowStats {
        self.engine.update_window(visible)
    }

    /// Digs a cell and saves on success.
    pub fn dig(&mut self, x: u32, y: u32) -> Option<TileType> {
        let removed = self.engine.dig(x, y)?;
        self.persist();
        Some(removed)
    }

    /// Refills a cell and saves on success.
    pub fn undig(&mut self, x: u32, y: u32, tile: TileType) -> Option<Placement> {
        let placement = self.engine.undig(x, y, tile)?;
        self.persist();
        Some(placement)
    }

    /// Handles a click and saves if it changed anything.
    pub fn apply_intent(
        &mut self,
        world_x: f32,
        world_y: f32,
        shovel: Option<TileType>,
    ) -> IntentOutcome {
        let outcome = self.engine.apply_intent(world_x, world_y, shovel);
        if outcome != IntentOutcome::Rejected {
            self.persist();
        }
        outcome
    }

    /// Carves the starter funnel and saves once if anything changed.
    pub fn carve_starter_pit(&mut self) -> usize {
        let edits = self.engine.carve_starter_pit();
        if edits > 0 {
            self.persist();
        }
        edits
    }

    /// Blocks until every save enqueued so far has been attempted.
    ///
    /// # Errors
    ///
    /// Returns the failure of the latest attempt, if it failed.
    pub fn flush(&self) -> StoreResult<()> {
        self.writer.flush()
    }

    /// Writer counters.
    #[must_use]
    pub fn writer_stats(&self) -> WriterStats {
        self.writer.stats()
    }

    /// Snapshot of the current seed and change log.
    #[must_use]
    pub fn snapshot(&self) -> SaveData {
        SaveData::snapshot(&self.engine)
    }

    /// Encodes and enqueues the current state. Failures are logged only.
    fn persist(&self) {
        let result = self
            .snapshot()
            .encode()
            .and_then(|bytes| self.writer.enqueue(bytes));
        if let Err(e) = result {
            warn!(error = %e, "could not queue save");
        }
    }
}
