//! # Save Format
//!
//! One save holds the seed and the whole change log. Saves are rewritten in
//! full on every mutation, so there is no append path and no recovery scan.
//!
//! ## Format
//!
//! ```text
//! [4 bytes: magic "BRRW"]
//! [4 bytes: version]
//! [8 bytes: world seed]
//! [4 bytes: grid width]
//! [4 bytes: entry count]
//! [N bytes: LZ4 body, size-prepended]
//!     entry: [8 bytes: cell index][1 byte: tag]   (log order)
//!     tag 0 = remove, 1..=10 = placed tile wire id
//! [4 bytes: CRC32 of everything above]
//! ```
//!
//! All integers are little-endian.

use burrow_world::{ChangeAction, ChangeEntry, DigEngine, WorldSeed};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::error::{StoreError, StoreResult};

/// Magic bytes identifying a save.
pub const SAVE_MAGIC: &[u8; 4] = b"BRRW";

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 8 + 4 + 4;
const ENTRY_LEN: usize = 8 + 1;
const CRC_LEN: usize = 4;
/// LZ4 uncompressed-size prefix ahead of the body.
const SIZE_PREFIX_LEN: usize = 4;

/// Everything needed to rebuild a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveData {
    /// The world seed.
    pub seed: WorldSeed,
    /// Grid width the indices were computed with.
    pub width: u32,
    /// The change log, oldest write first.
    pub entries: Vec<ChangeEntry>,
}

impl SaveData {
    /// Creates save data.
    #[must_use]
    pub const fn new(seed: WorldSeed, width: u32, entries: Vec<ChangeEntry>) -> Self {
        Self {
            seed,
            width,
            entries,
        }
    }

    /// Snapshots an engine's seed and change log.
    #[must_use]
    pub fn snapshot(engine: &DigEngine) -> Self {
        Self::new(
            engine.seed(),
            engine.geometry().width,
            engine.change_log().entries(),
        )
    }

    /// Serializes to the binary format.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TooManyEntries` if the entry count does not fit
    /// in the header.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        let count = u32::try_from(self.entries.len())
            .map_err(|_| StoreError::TooManyEntries(self.entries.len()))?;

        let mut body = Vec::with_capacity(self.entries.len() * ENTRY_LEN);
        for entry in &self.entries {
            body.extend_from_slice(&entry.index.to_le_bytes());
            body.push(entry.action.tag());
        }
        let compressed = compress_prepend_size(&body);

        let mut data = Vec::with_capacity(HEADER_LEN + compressed.len() + CRC_LEN);
        data.extend_from_slice(SAVE_MAGIC);
        data.extend_from_slice(&SAVE_VERSION.to_le_bytes());
        data.extend_from_slice(&self.seed.value().to_le_bytes());
        data.extend_from_slice(&self.width.to_le_bytes());
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&compressed);

        let crc = crc32fast::hash(&data);
        data.extend_from_slice(&crc.to_le_bytes());
        Ok(data)
    }

    /// Parses the binary format.
    ///
    /// # Errors
    ///
    /// Returns an error for bad magic, another version, a checksum
    /// mismatch, truncated data, a corrupt body or an unknown tag.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        if data.len() < HEADER_LEN + CRC_LEN {
            return Err(StoreError::Truncated {
                needed: HEADER_LEN + CRC_LEN,
                found: data.len(),
            });
        }

        let magic = read_array::<4>(data, 0);
        if &magic != SAVE_MAGIC {
            return Err(StoreError::BadMagic(magic));
        }

        let version = u32::from_le_bytes(read_array(data, 4));
        if version != SAVE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: version,
                expected: SAVE_VERSION,
            });
        }

        let (content, trailer) = data.split_at(data.len() - CRC_LEN);
        let stored = u32::from_le_bytes(read_array(trailer, 0));
        let computed = crc32fast::hash(content);
        if stored != computed {
            return Err(StoreError::ChecksumMismatch { stored, computed });
        }

        let seed = WorldSeed::new(u64::from_le_bytes(read_array(content, 8)));
        let width = u32::from_le_bytes(read_array(content, 16));
        let count = u32::from_le_bytes(read_array(content, 20)) as usize;

        let needed = count
            .checked_mul(ENTRY_LEN)
            .ok_or(StoreError::TooManyEntries(count))?;

        // The size prefix decides the allocation, so check it against the
        // header before decompressing.
        let compressed = &content[HEADER_LEN..];
        if compressed.len() < SIZE_PREFIX_LEN {
            return Err(StoreError::Truncated {
                needed: HEADER_LEN + SIZE_PREFIX_LEN + CRC_LEN,
                found: data.len(),
            });
        }
        let declared = u32::from_le_bytes(read_array(compressed, 0)) as usize;
        if declared != needed {
            return Err(StoreError::Truncated {
                needed,
                found: declared,
            });
        }

        let body = decompress_size_prepended(compressed)
            .map_err(|e| StoreError::Decompression(e.to_string()))?;
        if body.len() != needed {
            return Err(StoreError::Truncated {
                needed,
                found: body.len(),
            });
        }

        let entries = body
            .chunks_exact(ENTRY_LEN)
            .map(|record| {
                let index = u64::from_le_bytes(read_array(record, 0));
                let action = ChangeAction::from_tag(record[8])?;
                Ok(ChangeEntry::new(index, action))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Self::new(seed, width, entries))
    }

    /// Rejects a save written for another grid width.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WidthMismatch` if the widths differ.
    pub fn check_width(&self, configured: u32) -> StoreResult<()> {
        if self.width == configured {
            Ok(())
        } else {
            Err(StoreError::WidthMismatch {
                saved: self.width,
                configured,
            })
        }
    }
}

/// Copies `N` bytes at `offset`. Callers have checked the length.
fn read_array<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_world::{TileType, WorldError};

    fn sample() -> SaveData {
        SaveData::new(
            WorldSeed::new(0x1234_5678_9ABC_DEF0),
            40,
            vec![
                ChangeEntry::new(164, ChangeAction::Remove),
                ChangeEntry::new(204, ChangeAction::PlaceAs(TileType::PortalOrange)),
                ChangeEntry::new(7_999, ChangeAction::PlaceAs(TileType::SandyDirt)),
            ],
        )
    }

    #[test]
    fn test_encode_decode() {
        let save = sample();
        let bytes = save.encode().unwrap();
        assert_eq!(&bytes[..4], SAVE_MAGIC);
        assert_eq!(SaveData::decode(&bytes).unwrap(), save);
    }

    #[test]
    fn test_empty_log() {
        let save = SaveData::new(WorldSeed::new(9), 12, Vec::new());
        let bytes = save.encode().unwrap();
        assert_eq!(SaveData::decode(&bytes).unwrap(), save);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = sample().encode().unwrap();
        bytes[0] = b'X';
        assert!(matches!(SaveData::decode(&bytes), Err(StoreError::BadMagic(_))));
    }

    #[test]
    fn test_rejects_other_version() {
        let mut bytes = sample().encode().unwrap();
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        assert_eq!(
            SaveData::decode(&bytes),
            Err(StoreError::UnsupportedVersion { found: 2, expected: 1 })
        );
    }

    #[test]
    fn test_rejects_flipped_bit() {
        let mut bytes = sample().encode().unwrap();
        bytes[10] ^= 0x01;
        assert!(matches!(
            SaveData::decode(&bytes),
            Err(StoreError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_truncation() {
        let bytes = sample().encode().unwrap();
        assert!(matches!(
            SaveData::decode(&bytes[..10]),
            Err(StoreError::Truncated { .. })
        ));
        // Cutting the tail breaks the checksum.
        assert!(SaveData::decode(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_rejects_count_mismatch() {
        let mut bytes = sample().encode().unwrap();
        bytes[20..24].copy_from_slice(&5u32.to_le_bytes());
        let end = bytes.len() - CRC_LEN;
        let crc = crc32fast::hash(&bytes[..end]);
        bytes[end..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(
            SaveData::decode(&bytes),
            Err(StoreError::Truncated { needed: 45, found: 27 })
        );
    }

    /// Builds a checksummed save around a raw (already compressed) body.
    fn sealed(count: u32, compressed: &[u8]) -> Vec<u8> {
        let save = sample();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(SAVE_MAGIC);
        bytes.extend_from_slice(&SAVE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&save.seed.value().to_le_bytes());
        bytes.extend_from_slice(&save.width.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(compressed);
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes
    }

    #[test]
    fn test_rejects_oversized_size_prefix() {
        let mut compressed = u32::MAX.to_le_bytes().to_vec();
        compressed.extend_from_slice(&[0x10, 0xAB]);
        assert_eq!(
            SaveData::decode(&sealed(1, &compressed)),
            Err(StoreError::Truncated {
                needed: ENTRY_LEN,
                found: u32::MAX as usize,
            })
        );
    }

    #[test]
    fn test_rejects_missing_size_prefix() {
        assert!(matches!(
            SaveData::decode(&sealed(0, &[0x00, 0x00])),
            Err(StoreError::Truncated { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let mut body = Vec::new();
        body.extend_from_slice(&3u64.to_le_bytes());
        body.push(99);
        let bytes = sealed(1, &compress_prepend_size(&body));

        assert_eq!(
            SaveData::decode(&bytes),
            Err(StoreError::World(WorldError::UnknownChangeTag(99)))
        );
    }

    #[test]
    fn test_width_check() {
        let save = sample();
        assert!(save.check_width(40).is_ok());
        assert_eq!(
            save.check_width(64),
            Err(StoreError::WidthMismatch { saved: 40, configured: 64 })
        );
    }
}
