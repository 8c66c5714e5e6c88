//! # Session Persistence Integration Test
//!
//! Proves a world survives a restart exactly, and that storage trouble never
//! reaches gameplay.

use burrow_store::{FileBackend, MemoryBackend, SaveData, Session, StoreError};
use burrow_world::{Cell, IntentOutcome, TileType, WorldConfig, WorldRect};
use std::path::PathBuf;

fn config() -> WorldConfig {
    WorldConfig {
        width: 40,
        height: 400,
        seed: Some(2024),
        ..WorldConfig::default()
    }
}

fn temp_save_path() -> PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_burrow_session_{id}.sav"))
}

#[test]
fn test_fresh_world_persists_seed_immediately() {
    let backend = MemoryBackend::new();
    let session = Session::open(&config(), backend.clone()).unwrap();
    session.flush().unwrap();

    let save = SaveData::decode(&backend.bytes().unwrap()).unwrap();
    assert_eq!(save.seed.value(), 2024);
    assert_eq!(save.width, 40);
    assert!(save.entries.is_empty());
}

#[test]
fn test_random_seed_is_kept_across_restart() {
    let config = WorldConfig {
        seed: None,
        ..config()
    };
    let backend = MemoryBackend::new();
    let first = Session::open(&config, backend.clone()).unwrap();
    let seed = first.seed();
    drop(first);

    let second = Session::open(&config, backend).unwrap();
    assert_eq!(second.seed(), seed);
}

#[test]
fn test_restart_restores_world_exactly() {
    let backend = MemoryBackend::new();
    let mut session = Session::open(&config(), backend.clone()).unwrap();
    session.carve_starter_pit();
    session.dig(10, 4).unwrap();
    session.dig(10, 5).unwrap();
    let (wx, wy) = session.engine().geometry().cell_center(Cell::new(10, 5));
    let placed = session.apply_intent(wx, wy, Some(TileType::PortalBlue));
    assert!(matches!(placed, IntentOutcome::Placed { portals: Some(_), .. }));
    session.flush().unwrap();

    let entries = session.engine().change_log().entries();
    let depth = session.depth();
    let portals = session.portals();
    let tiles: Vec<_> = (0..12)
        .flat_map(|y| (0..40).map(move |x| (x, y)))
        .map(|(x, y)| session.engine().tile_at(x, y))
        .collect();
    drop(session);

    let restored = Session::open(&config(), backend).unwrap();
    assert_eq!(restored.engine().change_log().entries(), entries);
    assert_eq!(restored.depth(), depth);
    assert_eq!(restored.portals(), portals);
    assert!(restored.portals().is_linked());
    let restored_tiles: Vec<_> = (0..12)
        .flat_map(|y| (0..40).map(move |x| (x, y)))
        .map(|(x, y)| restored.engine().tile_at(x, y))
        .collect();
    assert_eq!(restored_tiles, tiles);
}

#[test]
fn test_rejected_edits_and_window_updates_do_not_save() {
    let backend = MemoryBackend::new();
    let mut session = Session::open(&config(), backend.clone()).unwrap();
    session.flush().unwrap();
    let baseline = session.writer_stats().enqueued;

    assert_eq!(session.dig(3, 1), None);
    assert_eq!(session.undig(3, 1, TileType::Stone), None);
    assert_eq!(session.apply_intent(-100.0, 0.0, None), IntentOutcome::Rejected);
    session.update_window(WorldRect::new(0.0, 0.0, 1280.0, 720.0));
    session.update_window(WorldRect::new(0.0, 5000.0, 1280.0, 720.0));
    session.flush().unwrap();

    assert_eq!(session.writer_stats().enqueued, baseline);
}

#[test]
fn test_storage_failure_never_blocks_play() {
    let backend = MemoryBackend::new();
    let mut session = Session::open(&config(), backend.clone()).unwrap();
    session.flush().unwrap();

    backend.set_failing(true);
    assert_eq!(session.dig(2, 4), Some(TileType::Grass));
    assert!(matches!(session.flush(), Err(StoreError::Io(_))));
    assert_eq!(session.engine().tile_at(2, 4), Some(TileType::Stone));

    backend.set_failing(false);
    session.dig(3, 4).unwrap();
    session.flush().unwrap();

    let save = SaveData::decode(&backend.bytes().unwrap()).unwrap();
    assert_eq!(save.entries.len(), 2);
    assert!(session.writer_stats().failures >= 1);
}

#[test]
fn test_width_mismatch_is_rejected() {
    let backend = MemoryBackend::new();
    drop(Session::open(&config(), backend.clone()).unwrap());

    let wider = WorldConfig {
        width: 64,
        ..config()
    };
    assert!(matches!(
        Session::open(&wider, backend),
        Err(StoreError::WidthMismatch { saved: 40, configured: 64 })
    ));
}

#[test]
fn test_corrupt_save_is_rejected() {
    let mut bytes = SaveData::snapshot(Session::open(&config(), MemoryBackend::new()).unwrap().engine())
        .encode()
        .unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    assert!(matches!(
        Session::open(&config(), MemoryBackend::with_bytes(bytes)),
        Err(StoreError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_file_backend_round_trip() {
    let path = temp_save_path();
    {
        let mut session = Session::open(&config(), FileBackend::new(&path)).unwrap();
        session.dig(7, 4).unwrap();
        session.dig(7, 5).unwrap();
    }

    let restored = Session::open(&config(), FileBackend::new(&path)).unwrap();
    assert_eq!(restored.engine().change_log().len(), 2);
    assert_eq!(restored.depth().depth, 2);
    assert_eq!(restored.engine().tile_at(7, 5), Some(TileType::Stone));
    drop(restored);
    let _ = std::fs::remove_file(&path);
}
